use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

/// A single recorded quiz run - SQL persistence layer
#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub id: i64,
    #[serde(skip_serializing)]
    pub user_id: i64,
    pub category_key: String,
    pub score: i32,
    pub total_questions: i32,
    pub passed: bool,
    pub time_spent: Option<i32>,
    pub answers: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl QuizAttempt {
    pub async fn create(
        user_id: i64,
        category_key: &str,
        score: i32,
        total_questions: i32,
        passed: bool,
        time_spent: Option<i32>,
        answers: Option<&serde_json::Value>,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO quiz_attempts
                 (user_id, category_key, score, total_questions, passed, time_spent, answers)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(user_id)
        .bind(category_key)
        .bind(score)
        .bind(total_questions)
        .bind(passed)
        .bind(time_spent)
        .bind(answers)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Most recent attempts for a user, optionally scoped to one category
    pub async fn list_recent(
        user_id: i64,
        category_key: Option<&str>,
        limit: i64,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM quiz_attempts
             WHERE user_id = $1 AND ($2::TEXT IS NULL OR category_key = $2)
             ORDER BY created_at DESC
             LIMIT $3",
        )
        .bind(user_id)
        .bind(category_key)
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Latest `per_user` attempts for every user in one query
    /// (admin progress overview)
    pub async fn recent_per_user(per_user: i64, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM (
                 SELECT qa.*,
                        ROW_NUMBER() OVER (
                            PARTITION BY user_id ORDER BY created_at DESC
                        ) AS rn
                 FROM quiz_attempts qa
             ) ranked
             WHERE rn <= $1
             ORDER BY user_id, created_at DESC",
        )
        .bind(per_user)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}
