use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::common::{provided, ApiError};
use crate::domains::game::PhishingEmail;
use crate::server::app::AppState;

#[derive(Serialize)]
pub struct EmailsResponse {
    emails: Vec<PhishingEmail>,
}

#[derive(Serialize)]
pub struct MessageBody {
    message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePhishingEmailInput {
    #[serde(default)]
    sender: Option<String>,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    is_phishing: Option<bool>,
    #[serde(default)]
    indicators: Option<Vec<String>>,
    #[serde(default)]
    active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePhishingEmailInput {
    #[serde(default)]
    sender: Option<String>,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    is_phishing: Option<bool>,
    #[serde(default)]
    indicators: Option<Vec<String>>,
    #[serde(default)]
    active: Option<bool>,
}

/// Inbox content for the phishing mini-game, active entries only
pub async fn list_phishing_emails_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<EmailsResponse>, ApiError> {
    let emails = PhishingEmail::list_active(&state.db_pool).await?;
    Ok(Json(EmailsResponse { emails }))
}

pub async fn admin_list_phishing_emails_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<EmailsResponse>, ApiError> {
    let emails = PhishingEmail::list_all(&state.db_pool).await?;
    Ok(Json(EmailsResponse { emails }))
}

pub async fn admin_create_phishing_email_handler(
    Extension(state): Extension<AppState>,
    input: Option<Json<CreatePhishingEmailInput>>,
) -> Result<(StatusCode, Json<PhishingEmail>), ApiError> {
    let input = input.map(|Json(i)| i).unwrap_or_default();

    let (sender, subject, content) = match (
        provided(&input.sender),
        provided(&input.subject),
        provided(&input.content),
    ) {
        (Some(se), Some(su), Some(co)) => (se, su, co),
        _ => {
            return Err(ApiError::Validation(
                "sender, subject, content required".to_string(),
            ))
        }
    };

    let created = PhishingEmail::create(
        sender,
        subject,
        content,
        input.is_phishing.unwrap_or(true),
        input.indicators.unwrap_or_default(),
        input.active.unwrap_or(true),
        &state.db_pool,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn admin_update_phishing_email_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
    input: Option<Json<UpdatePhishingEmailInput>>,
) -> Result<Json<PhishingEmail>, ApiError> {
    let id = parse_email_id(&id)?;
    let input = input.map(|Json(i)| i).unwrap_or_default();

    let updated = PhishingEmail::update(
        id,
        input.sender.as_deref(),
        input.subject.as_deref(),
        input.content.as_deref(),
        input.is_phishing,
        input.indicators,
        input.active,
        &state.db_pool,
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Not found".to_string()))?;

    Ok(Json(updated))
}

pub async fn admin_delete_phishing_email_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, ApiError> {
    let id = parse_email_id(&id)?;

    if !PhishingEmail::delete(id, &state.db_pool).await? {
        return Err(ApiError::NotFound("Not found".to_string()));
    }

    Ok(Json(MessageBody {
        message: "Deleted".to_string(),
    }))
}

/// A non-numeric id can never match a row, so it reads as missing
fn parse_email_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::NotFound("Not found".to_string()))
}
