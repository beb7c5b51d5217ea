use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

/// Completion record for one AR training scenario - SQL persistence layer
///
/// One row per (user, scenario); repeated completions update it in place.
#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioCompletion {
    pub id: i64,
    #[serde(skip_serializing)]
    pub user_id: i64,
    pub scenario_key: String,
    pub completed: bool,
    pub score: Option<i32>,
    pub time_spent: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScenarioCompletion {
    /// Record a completion, keeping the previous score and time when the
    /// new report omits them
    pub async fn upsert(
        user_id: i64,
        scenario_key: &str,
        score: Option<i32>,
        time_spent: Option<i32>,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO scenario_completions
                 (user_id, scenario_key, completed, score, time_spent)
             VALUES ($1, $2, TRUE, $3, $4)
             ON CONFLICT (user_id, scenario_key) DO UPDATE SET
                 completed = TRUE,
                 score = COALESCE(EXCLUDED.score, scenario_completions.score),
                 time_spent = COALESCE(EXCLUDED.time_spent, scenario_completions.time_spent),
                 updated_at = NOW()
             RETURNING *",
        )
        .bind(user_id)
        .bind(scenario_key)
        .bind(score)
        .bind(time_spent)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn list_for_user(user_id: i64, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM scenario_completions
             WHERE user_id = $1
             ORDER BY updated_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    /// Completed scenarios across all users (admin progress overview)
    pub async fn list_completed(pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM scenario_completions
             WHERE completed = TRUE
             ORDER BY user_id, updated_at DESC",
        )
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}
