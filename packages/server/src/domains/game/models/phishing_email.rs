use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::PgPool;

/// Phishing training email - SQL persistence layer
///
/// `indicators` lists the tells a player is supposed to spot; it rides
/// along as JSONB.
#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PhishingEmail {
    pub id: i64,
    pub sender: String,
    pub subject: String,
    pub content: String,
    pub is_phishing: bool,
    pub indicators: Json<Vec<String>>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PhishingEmail {
    /// Emails currently in rotation
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM phishing_emails WHERE active = TRUE ORDER BY id ASC",
        )
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Every email, including retired ones (admin view)
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM phishing_emails ORDER BY id ASC")
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn create(
        sender: &str,
        subject: &str,
        content: &str,
        is_phishing: bool,
        indicators: Vec<String>,
        active: bool,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO phishing_emails (sender, subject, content, is_phishing, indicators, active)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(sender)
        .bind(subject)
        .bind(content)
        .bind(is_phishing)
        .bind(Json(indicators))
        .bind(active)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Partial update; absent fields keep their stored values. Returns
    /// `None` when the email does not exist.
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        id: i64,
        sender: Option<&str>,
        subject: Option<&str>,
        content: Option<&str>,
        is_phishing: Option<bool>,
        indicators: Option<Vec<String>>,
        active: Option<bool>,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "UPDATE phishing_emails
             SET sender = COALESCE($2, sender),
                 subject = COALESCE($3, subject),
                 content = COALESCE($4, content),
                 is_phishing = COALESCE($5, is_phishing),
                 indicators = COALESCE($6, indicators),
                 active = COALESCE($7, active),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(sender)
        .bind(subject)
        .bind(content)
        .bind(is_phishing)
        .bind(indicators.map(Json))
        .bind(active)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Delete an email. Returns false when nothing matched.
    pub async fn delete(id: i64, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM phishing_emails WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
