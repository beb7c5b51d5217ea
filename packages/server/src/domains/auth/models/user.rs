use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domains::auth::jwt::ROLE_ADMIN;

/// User account - SQL persistence layer
///
/// `password_hash` never leaves this layer except through the admin
/// listing, which is explicit about exposing it.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub phone_number: String,
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub is_phone_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    /// Find user by ID
    pub async fn find_by_id(id: i64, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Find user by username or email (login accepts either)
    pub async fn find_by_username_or_email(identifier: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE username = $1 OR email = $1")
            .bind(identifier)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Find an admin account by username or email
    pub async fn find_admin_by_username_or_email(
        identifier: &str,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM users WHERE (username = $1 OR email = $1) AND role = $2",
        )
        .bind(identifier)
        .bind(ROLE_ADMIN)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Find user by phone number (stored form, not re-normalized)
    pub async fn find_by_phone(phone_number: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE phone_number = $1")
            .bind(phone_number)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Find user by email
    pub async fn find_by_email(email: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn username_exists(username: &str, pool: &PgPool) -> Result<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn email_exists(email: &str, pool: &PgPool) -> Result<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn phone_exists(phone_number: &str, pool: &PgPool) -> Result<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE phone_number = $1)")
            .bind(phone_number)
            .fetch_one(pool)
            .await
            .map_err(Into::into)
    }

    /// All accounts, newest first
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    /// Insert new user account
    pub async fn create(
        username: &str,
        email: &str,
        phone_number: &str,
        password_hash: &str,
        name: &str,
        role: &str,
        is_phone_verified: bool,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO users (
                username,
                email,
                phone_number,
                password_hash,
                name,
                role,
                is_phone_verified
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(username)
        .bind(email)
        .bind(phone_number)
        .bind(password_hash)
        .bind(name)
        .bind(role)
        .bind(is_phone_verified)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Mark the account's phone as verified
    pub async fn mark_phone_verified(id: i64, pool: &PgPool) -> Result<()> {
        sqlx::query("UPDATE users SET is_phone_verified = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Replace the stored password hash
    pub async fn update_password(id: i64, password_hash: &str, pool: &PgPool) -> Result<()> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Delete an account together with everything hanging off it.
    ///
    /// Runs in one transaction so a failure part-way leaves the account
    /// intact rather than stripped of history.
    pub async fn delete_with_dependents(id: i64, pool: &PgPool) -> Result<()> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM password_resets WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM quiz_attempts WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM scenario_completions WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM user_progress WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Remove all admin accounts (used when reseeding the admin login)
    pub async fn delete_admins_with_dependents(pool: &PgPool) -> Result<u64> {
        let mut tx = pool.begin().await?;

        for dependent in [
            "DELETE FROM refresh_tokens WHERE user_id IN (SELECT id FROM users WHERE role = $1)",
            "DELETE FROM password_resets WHERE user_id IN (SELECT id FROM users WHERE role = $1)",
            "DELETE FROM quiz_attempts WHERE user_id IN (SELECT id FROM users WHERE role = $1)",
            "DELETE FROM scenario_completions WHERE user_id IN (SELECT id FROM users WHERE role = $1)",
            "DELETE FROM user_progress WHERE user_id IN (SELECT id FROM users WHERE role = $1)",
        ] {
            sqlx::query(dependent)
                .bind(ROLE_ADMIN)
                .execute(&mut *tx)
                .await?;
        }

        let result = sqlx::query("DELETE FROM users WHERE role = $1")
            .bind(ROLE_ADMIN)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }
}
