use std::sync::Arc;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tracing::debug;

use crate::common::ApiError;
use crate::domains::auth::{JwtService, ROLE_ADMIN};

/// Authenticated user information from a verified access token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
    pub role: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// Access guard middleware
///
/// Extracts the bearer token from the Authorization header, verifies it, and
/// adds AuthUser to request extensions. A missing token rejects with 401, a
/// token that fails verification with 403.
pub async fn jwt_auth_middleware(
    jwt_service: Arc<JwtService>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let user = extract_auth_user(&request, &jwt_service)?;
    debug!("Authenticated user: {} ({})", user.username, user.role);
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Role gate for admin-only routes, layered inside `jwt_auth_middleware`
pub async fn require_admin(request: Request<Body>, next: Next) -> Result<Response, ApiError> {
    match request.extensions().get::<AuthUser>() {
        Some(user) if user.is_admin() => Ok(next.run(request).await),
        Some(_) => Err(ApiError::Forbidden("Admin access required".to_string())),
        None => Err(ApiError::Unauthorized("Access token required".to_string())),
    }
}

/// Extract and verify the access token from a request
fn extract_auth_user(
    request: &Request<Body>,
    jwt_service: &JwtService,
) -> Result<AuthUser, ApiError> {
    // Second whitespace-separated part of "Bearer <token>"
    let token = request
        .headers()
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split_whitespace().nth(1))
        .ok_or_else(|| ApiError::Unauthorized("Access token required".to_string()))?;

    let claims = jwt_service
        .verify_token(token)
        .map_err(|_| ApiError::InvalidToken)?;

    Ok(AuthUser {
        user_id: claims.user_id,
        username: claims.username,
        role: claims.role,
    })
}
