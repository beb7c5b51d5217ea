use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Locally stored password reset code - SQL persistence layer
///
/// Resets normally ride the SMS provider's verification flow; these rows
/// back the fallback path where a code is checked against our own table.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct PasswordReset {
    pub id: i64,
    pub user_id: i64,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl PasswordReset {
    /// Record a reset code for a user
    pub async fn create(
        user_id: i64,
        code: &str,
        expires_at: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO password_resets (user_id, code, expires_at)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(user_id)
        .bind(code)
        .bind(expires_at)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Most recent record matching this user and code
    pub async fn find_latest(user_id: i64, code: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM password_resets
             WHERE user_id = $1 AND code = $2
             ORDER BY id DESC
             LIMIT 1",
        )
        .bind(user_id)
        .bind(code)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Drop every outstanding code for a user (after a successful reset)
    pub async fn purge_for_user(user_id: i64, pool: &PgPool) -> Result<u64> {
        let result = sqlx::query("DELETE FROM password_resets WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
