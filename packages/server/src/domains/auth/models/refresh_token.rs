use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use sqlx::PgPool;

/// Refresh token - SQL persistence layer
///
/// Values are opaque 96-character hex strings. They travel only in the
/// HttpOnly cookie; the row here is the sole server-side record.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct RefreshToken {
    pub id: i64,
    pub token: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl RefreshToken {
    /// Generate a fresh opaque token value (48 random bytes, hex encoded)
    pub fn generate_value() -> String {
        let mut bytes = [0u8; 48];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Issue and persist a new token for a user
    pub async fn issue(user_id: i64, ttl_days: i64, pool: &PgPool) -> Result<Self> {
        let token = Self::generate_value();
        let expires_at = Utc::now() + Duration::days(ttl_days);

        sqlx::query_as::<_, Self>(
            "INSERT INTO refresh_tokens (token, user_id, expires_at)
             VALUES ($1, $2, $3)
             RETURNING *",
        )
        .bind(&token)
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Look up a token by its value
    pub async fn find_by_token(token: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM refresh_tokens WHERE token = $1")
            .bind(token)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// A token is usable until it is revoked or past its expiry
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }

    /// Revoke a token value. Unknown or already revoked values are a no-op.
    pub async fn revoke(token: &str, pool: &PgPool) -> Result<()> {
        sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW() WHERE token = $1 AND revoked_at IS NULL",
        )
        .bind(token)
        .execute(pool)
        .await?;

        Ok(())
    }
}
