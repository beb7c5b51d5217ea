use std::time::Duration;

use axum::extract::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::common::ApiError;
use crate::domains::users::{AdminUserView, PublicUser};
use crate::kernel::cache;
use crate::server::app::AppState;

const USERS_CACHE_TTL: Duration = Duration::from_secs(60);
const ADMIN_USERS_CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Serialize, Deserialize)]
pub struct AdminUsersListResponse {
    success: bool,
    count: usize,
    users: Vec<AdminUserView>,
}

/// Public user directory, cached for a minute
pub async fn list_users_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<Vec<PublicUser>>, ApiError> {
    if let Some(cached) = state.cache.get_json::<Vec<PublicUser>>(cache::USERS_ALL_KEY).await {
        return Ok(Json(cached));
    }

    let users = PublicUser::list_all(&state.db_pool).await?;
    state
        .cache
        .set_json(cache::USERS_ALL_KEY, &users, USERS_CACHE_TTL)
        .await;

    Ok(Json(users))
}

/// Authenticated listing with counts, cached for five minutes
pub async fn admin_list_users_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<AdminUsersListResponse>, ApiError> {
    if let Some(cached) = state
        .cache
        .get_json::<AdminUsersListResponse>(cache::ADMIN_USERS_KEY)
        .await
    {
        return Ok(Json(cached));
    }

    let users = AdminUserView::list_all(&state.db_pool).await?;
    let response = AdminUsersListResponse {
        success: true,
        count: users.len(),
        users,
    };
    state
        .cache
        .set_json(cache::ADMIN_USERS_KEY, &response, ADMIN_USERS_CACHE_TTL)
        .await;

    Ok(Json(response))
}
