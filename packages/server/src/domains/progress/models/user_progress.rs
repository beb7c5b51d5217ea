use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

/// Fraction of questions that must be answered correctly to pass a quiz
pub const QUIZ_PASS_THRESHOLD: f64 = 0.8;

/// Pass/fail verdict for a finished quiz
pub fn quiz_passed(score: i32, total_questions: i32) -> bool {
    total_questions > 0 && f64::from(score) / f64::from(total_questions) >= QUIZ_PASS_THRESHOLD
}

/// Per-user progress counters - SQL persistence layer
///
/// Counters are denormalized from `scenario_completions` and
/// `quiz_attempts`; reads reconcile them when they drift.
#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub id: i64,
    #[serde(skip_serializing)]
    pub user_id: i64,
    pub scenarios_completed: i32,
    pub quizzes_passed: i32,
    pub total_score: i32,
    pub last_updated: DateTime<Utc>,
}

impl UserProgress {
    pub async fn find_for_user(user_id: i64, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM user_progress WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Fetch the row for a user, creating an empty one on first access
    pub async fn get_or_create(user_id: i64, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO user_progress (user_id)
             VALUES ($1)
             ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
             RETURNING *",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// All progress rows keyed by user (admin aggregation)
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM user_progress")
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    /// Reconcile the completion counters against the source tables.
    /// Only writes (and bumps `last_updated`) when they actually drifted.
    pub async fn sync_counts(user_id: i64, pool: &PgPool) -> Result<Self> {
        let current = Self::get_or_create(user_id, pool).await?;

        let updated = sqlx::query_as::<_, Self>(
            "UPDATE user_progress
             SET scenarios_completed = counts.scenarios,
                 quizzes_passed = counts.quizzes,
                 last_updated = NOW()
             FROM (
                 SELECT
                     (SELECT COUNT(*) FROM scenario_completions
                       WHERE user_id = $1 AND completed = TRUE) AS scenarios,
                     (SELECT COUNT(*) FROM quiz_attempts
                       WHERE user_id = $1 AND passed = TRUE) AS quizzes
             ) AS counts
             WHERE user_progress.user_id = $1
               AND (user_progress.scenarios_completed <> counts.scenarios
                    OR user_progress.quizzes_passed <> counts.quizzes)
             RETURNING user_progress.*",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(updated.unwrap_or(current))
    }

    /// Recompute every counter, including the score total, after a new
    /// attempt or completion lands
    pub async fn recompute_totals(user_id: i64, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            "INSERT INTO user_progress
                 (user_id, scenarios_completed, quizzes_passed, total_score, last_updated)
             VALUES (
                 $1,
                 (SELECT COUNT(*) FROM scenario_completions
                   WHERE user_id = $1 AND completed = TRUE),
                 (SELECT COUNT(*) FROM quiz_attempts
                   WHERE user_id = $1 AND passed = TRUE),
                 (SELECT COALESCE(SUM(score), 0) FROM quiz_attempts WHERE user_id = $1),
                 NOW()
             )
             ON CONFLICT (user_id) DO UPDATE SET
                 scenarios_completed = EXCLUDED.scenarios_completed,
                 quizzes_passed = EXCLUDED.quizzes_passed,
                 total_score = EXCLUDED.total_score,
                 last_updated = NOW()
             RETURNING *",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}
