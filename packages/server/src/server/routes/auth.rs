use axum::extract::{Extension, Path};
use axum::http::{header::SET_COOKIE, HeaderMap, StatusCode};
use axum::response::{AppendHeaders, IntoResponse};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::common::cookies::{clear_refresh_cookie, cookie_value, refresh_cookie, REFRESH_COOKIE};
use crate::common::ApiError;
use crate::domains::auth::models::User;
use crate::domains::auth::{
    AdminVerifyInput, ChangePasswordInput, LoginInput, LoginSuccess, PhoneInput, RegisterInput,
    ResendOutcome, ResetPasswordInput, VerifyPhoneInput,
};
use crate::server::app::AppState;
use crate::server::middleware::AuthUser;

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    verification_id: Option<String>,
}

impl MessageResponse {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            verification_id: None,
        }
    }

    fn with_verification_id(message: &str, verification_id: Option<String>) -> Self {
        Self {
            message: message.to_string(),
            verification_id,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterResponse {
    message: String,
    user: RegisteredUserBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    verification_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisteredUserBody {
    id: i64,
    username: String,
    email: String,
    phone_number: String,
    name: String,
    is_phone_verified: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    message: String,
    token: String,
    user: SessionUserBody,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionUserBody {
    id: i64,
    username: String,
    email: String,
    name: String,
    role: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    id: i64,
    username: String,
    email: String,
    phone_number: String,
    is_phone_verified: bool,
    name: String,
    created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct TokenResponse {
    token: String,
}

#[derive(Serialize)]
pub struct VerifiedUserResponse {
    message: String,
    user: VerifiedUserBody,
}

#[derive(Serialize)]
struct VerifiedUserBody {
    id: i64,
    email: String,
    username: String,
}

#[derive(Serialize)]
pub struct AdminUsersResponse {
    users: Vec<AdminUserRecord>,
}

/// Full account row for the admin console. The bcrypt hash travels under
/// the legacy `password` field name.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AdminUserRecord {
    id: i64,
    username: String,
    email: String,
    phone_number: String,
    password: String,
    name: String,
    role: String,
    is_phone_verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<User> for AdminUserRecord {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            phone_number: user.phone_number,
            password: user.password_hash,
            name: user.name,
            role: user.role,
            is_phone_verified: user.is_phone_verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
//
// Bodies are extracted as Option so an absent or malformed payload flows
// into the service's own "field is required" validation instead of a
// framework rejection.
// ---------------------------------------------------------------------------

pub async fn register_handler(
    Extension(state): Extension<AppState>,
    input: Option<Json<RegisterInput>>,
) -> Result<impl IntoResponse, ApiError> {
    let input = input.map(|Json(i)| i).unwrap_or_default();
    let registered = state.auth.register(input).await?;
    let user = registered.user;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User created successfully. Please verify your phone to sign in.".to_string(),
            user: RegisteredUserBody {
                id: user.id,
                username: user.username,
                email: user.email,
                phone_number: user.phone_number,
                name: user.name,
                is_phone_verified: user.is_phone_verified,
            },
            verification_id: registered.verification_id,
        }),
    ))
}

pub async fn login_handler(
    Extension(state): Extension<AppState>,
    input: Option<Json<LoginInput>>,
) -> Result<impl IntoResponse, ApiError> {
    let input = input.map(|Json(i)| i).unwrap_or_default();
    let session = state.auth.login(input).await?;
    Ok(session_response("Login successful", session, &state))
}

pub async fn admin_login_handler(
    Extension(state): Extension<AppState>,
    input: Option<Json<LoginInput>>,
) -> Result<impl IntoResponse, ApiError> {
    let input = input.map(|Json(i)| i).unwrap_or_default();
    let session = state.auth.admin_login(input).await?;
    Ok(session_response("Admin login successful", session, &state))
}

/// Shared tail of both login flows: set the refresh cookie, return the
/// access token and public user fields.
fn session_response(message: &str, session: LoginSuccess, state: &AppState) -> impl IntoResponse {
    let cookie = refresh_cookie(
        &session.refresh_token,
        state.config.refresh_ttl_days,
        state.config.production,
    );
    let user = session.user;

    (
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(LoginResponse {
            message: message.to_string(),
            token: session.token,
            user: SessionUserBody {
                id: user.id,
                username: user.username,
                email: user.email,
                name: user.name,
                role: user.role,
            },
        }),
    )
}

pub async fn profile_handler(
    Extension(state): Extension<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = state.auth.profile(auth_user.user_id).await?;

    Ok(Json(ProfileResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        phone_number: user.phone_number,
        is_phone_verified: user.is_phone_verified,
        name: user.name,
        created_at: user.created_at,
    }))
}

pub async fn change_password_handler(
    Extension(state): Extension<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    input: Option<Json<ChangePasswordInput>>,
) -> Result<Json<MessageResponse>, ApiError> {
    let input = input.map(|Json(i)| i).unwrap_or_default();
    state.auth.change_password(auth_user.user_id, input).await?;
    Ok(Json(MessageResponse::new("Password changed successfully")))
}

pub async fn verify_phone_handler(
    Extension(state): Extension<AppState>,
    input: Option<Json<VerifyPhoneInput>>,
) -> Result<Json<MessageResponse>, ApiError> {
    let input = input.map(|Json(i)| i).unwrap_or_default();
    state.auth.verify_phone(input).await?;
    Ok(Json(MessageResponse::new("Phone verified successfully")))
}

pub async fn resend_phone_code_handler(
    Extension(state): Extension<AppState>,
    input: Option<Json<PhoneInput>>,
) -> Result<Json<MessageResponse>, ApiError> {
    let input = input.map(|Json(i)| i).unwrap_or_default();

    let response = match state.auth.resend_phone_code(input).await? {
        ResendOutcome::AlreadyVerified => MessageResponse::new("Phone already verified"),
        ResendOutcome::ProviderUnavailable => MessageResponse::new(
            "SMS service temporarily unavailable. Please try again later.",
        ),
        ResendOutcome::Sent { verification_id } => {
            MessageResponse::with_verification_id("Verification code sent", verification_id)
        }
    };

    Ok(Json(response))
}

pub async fn forgot_password_handler(
    Extension(state): Extension<AppState>,
    input: Option<Json<PhoneInput>>,
) -> Result<Json<MessageResponse>, ApiError> {
    let input = input.map(|Json(i)| i).unwrap_or_default();
    let outcome = state.auth.forgot_password(input).await?;

    // Same message whether or not the phone matched an account
    Ok(Json(MessageResponse::with_verification_id(
        "If the phone number exists, a code has been sent",
        outcome.verification_id,
    )))
}

pub async fn reset_password_handler(
    Extension(state): Extension<AppState>,
    input: Option<Json<ResetPasswordInput>>,
) -> Result<Json<MessageResponse>, ApiError> {
    let input = input.map(|Json(i)| i).unwrap_or_default();
    state.auth.reset_password(input).await?;
    Ok(Json(MessageResponse::new("Password updated successfully")))
}

pub async fn refresh_handler(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state
        .auth
        .refresh_access_token(cookie_value(&headers, REFRESH_COOKIE))
        .await?;
    Ok(Json(TokenResponse { token }))
}

pub async fn logout_handler(
    Extension(state): Extension<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    state
        .auth
        .logout(cookie_value(&headers, REFRESH_COOKIE))
        .await;

    (
        AppendHeaders([(SET_COOKIE, clear_refresh_cookie(state.config.production))]),
        Json(MessageResponse::new("Logged out")),
    )
}

pub async fn admin_list_users_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<AdminUsersResponse>, ApiError> {
    let users = state.auth.admin_list_users().await?;

    Ok(Json(AdminUsersResponse {
        users: users.into_iter().map(AdminUserRecord::from).collect(),
    }))
}

pub async fn admin_delete_user_handler(
    Extension(state): Extension<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let target_id: i64 = id
        .parse()
        .map_err(|_| ApiError::Validation("Invalid user id".to_string()))?;

    state
        .auth
        .admin_delete_user(auth_user.user_id, target_id)
        .await?;

    Ok(Json(MessageResponse::new("User deleted successfully")))
}

pub async fn admin_verify_user_handler(
    Extension(state): Extension<AppState>,
    input: Option<Json<AdminVerifyInput>>,
) -> Result<Json<VerifiedUserResponse>, ApiError> {
    let input = input.map(|Json(i)| i).unwrap_or_default();
    let user = state.auth.admin_verify_user(input).await?;
    Ok(Json(VerifiedUserResponse {
        message: "User verified successfully".to_string(),
        user: VerifiedUserBody {
            id: user.id,
            email: user.email,
            username: user.username,
        },
    }))
}
