use anyhow::Result;
use serde::Serialize;
use sqlx::PgPool;

/// Quiz category - SQL persistence layer
#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct QuizCategory {
    pub id: i64,
    pub key: String,
    pub title: String,
    pub description: Option<String>,
}

impl QuizCategory {
    /// All categories in creation order
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM quiz_categories ORDER BY id ASC")
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_key(key: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM quiz_categories WHERE key = $1")
            .bind(key)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_id(id: i64, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM quiz_categories WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Create a category, or refresh its title and description if the
    /// key already exists
    pub async fn upsert(
        key: &str,
        title: &str,
        description: Option<&str>,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO quiz_categories (key, title, description)
             VALUES ($1, $2, $3)
             ON CONFLICT (key) DO UPDATE
                SET title = EXCLUDED.title,
                    description = EXCLUDED.description
             RETURNING *",
        )
        .bind(key)
        .bind(title)
        .bind(description)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}
