use std::collections::HashMap;
use std::time::Duration;

use axum::extract::{Extension, Query};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::{provided, ApiError};
use crate::domains::auth::User;
use crate::domains::progress::{quiz_passed, QuizAttempt, ScenarioCompletion, UserProgress};
use crate::kernel::cache;
use crate::server::app::AppState;
use crate::server::middleware::AuthUser;

const PROGRESS_CACHE_TTL: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    scenarios_completed: i32,
    quizzes_passed: i32,
    total_score: i32,
    last_updated: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttemptResponse {
    message: String,
    attempt: AttemptSummary,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AttemptSummary {
    id: i64,
    passed: bool,
    score: i32,
    total_questions: i32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioCompletionResponse {
    message: String,
    completion: CompletionSummary,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompletionSummary {
    id: i64,
    scenario_key: String,
    completed: bool,
    score: Option<i32>,
}

#[derive(Serialize)]
pub struct AttemptsResponse {
    attempts: Vec<QuizAttempt>,
}

#[derive(Serialize)]
pub struct CompletionsResponse {
    completions: Vec<ScenarioCompletion>,
}

/// One row per user in the admin progress overview
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgressOverview {
    user_id: i64,
    username: String,
    email: String,
    scenarios_completed: i32,
    quizzes_passed: i32,
    total_score: i32,
    last_activity: DateTime<Utc>,
    completed_scenarios: Vec<String>,
    recent_quiz_attempts: Vec<RecentAttempt>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecentAttempt {
    category_key: String,
    score: i32,
    total_questions: i32,
    passed: bool,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttemptInput {
    #[serde(default)]
    category_key: Option<String>,
    #[serde(default)]
    score: Option<i32>,
    #[serde(default)]
    total_questions: Option<i32>,
    #[serde(default)]
    time_spent: Option<i32>,
    #[serde(default)]
    answers: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioCompletionInput {
    #[serde(default)]
    scenario_key: Option<String>,
    #[serde(default)]
    score: Option<i32>,
    #[serde(default)]
    time_spent: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttemptsQuery {
    #[serde(default)]
    category_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// The per-user aggregate. Counters are reconciled against the source
/// tables on read, so the response survives direct data fixes.
pub async fn get_progress_handler(
    Extension(state): Extension<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<ProgressResponse>, ApiError> {
    let key = cache::progress_key(auth_user.user_id);
    if let Some(cached) = state.cache.get_json::<ProgressResponse>(&key).await {
        return Ok(Json(cached));
    }

    let progress = UserProgress::sync_counts(auth_user.user_id, &state.db_pool).await?;
    let response = ProgressResponse {
        scenarios_completed: progress.scenarios_completed,
        quizzes_passed: progress.quizzes_passed,
        total_score: progress.total_score,
        last_updated: progress.last_updated,
    };
    state.cache.set_json(&key, &response, PROGRESS_CACHE_TTL).await;

    Ok(Json(response))
}

pub async fn record_quiz_attempt_handler(
    Extension(state): Extension<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    input: Option<Json<QuizAttemptInput>>,
) -> Result<Json<QuizAttemptResponse>, ApiError> {
    let input = input.map(|Json(i)| i).unwrap_or_default();

    let (category_key, score, total_questions) = match (
        provided(&input.category_key),
        input.score,
        input.total_questions.filter(|t| *t != 0),
    ) {
        (Some(key), Some(score), Some(total)) => (key, score, total),
        _ => return Err(ApiError::Validation("Missing required fields".to_string())),
    };

    let passed = quiz_passed(score, total_questions);
    let attempt = QuizAttempt::create(
        auth_user.user_id,
        category_key,
        score,
        total_questions,
        passed,
        input.time_spent,
        input.answers.as_ref(),
        &state.db_pool,
    )
    .await?;

    refresh_progress(&state, auth_user.user_id).await;

    Ok(Json(QuizAttemptResponse {
        message: "Quiz attempt recorded".to_string(),
        attempt: AttemptSummary {
            id: attempt.id,
            passed: attempt.passed,
            score: attempt.score,
            total_questions: attempt.total_questions,
        },
    }))
}

pub async fn record_scenario_completion_handler(
    Extension(state): Extension<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    input: Option<Json<ScenarioCompletionInput>>,
) -> Result<Json<ScenarioCompletionResponse>, ApiError> {
    let input = input.map(|Json(i)| i).unwrap_or_default();

    let scenario_key = provided(&input.scenario_key)
        .ok_or_else(|| ApiError::Validation("Missing scenario key".to_string()))?;

    let completion = ScenarioCompletion::upsert(
        auth_user.user_id,
        scenario_key,
        input.score,
        input.time_spent,
        &state.db_pool,
    )
    .await?;

    refresh_progress(&state, auth_user.user_id).await;

    Ok(Json(ScenarioCompletionResponse {
        message: "Scenario completion recorded".to_string(),
        completion: CompletionSummary {
            id: completion.id,
            scenario_key: completion.scenario_key,
            completed: completion.completed,
            score: completion.score,
        },
    }))
}

pub async fn list_quiz_attempts_handler(
    Extension(state): Extension<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<QuizAttemptsQuery>,
) -> Result<Json<AttemptsResponse>, ApiError> {
    let attempts = QuizAttempt::list_recent(
        auth_user.user_id,
        provided(&query.category_key),
        50,
        &state.db_pool,
    )
    .await?;

    Ok(Json(AttemptsResponse { attempts }))
}

pub async fn list_scenario_completions_handler(
    Extension(state): Extension<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<CompletionsResponse>, ApiError> {
    let completions = ScenarioCompletion::list_for_user(auth_user.user_id, &state.db_pool).await?;
    Ok(Json(CompletionsResponse { completions }))
}

/// Cross-user progress table for the admin dashboard
pub async fn admin_all_progress_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<Vec<UserProgressOverview>>, ApiError> {
    let users = User::list_all(&state.db_pool).await?;
    let progress_by_user: HashMap<i64, UserProgress> = UserProgress::list_all(&state.db_pool)
        .await?
        .into_iter()
        .map(|p| (p.user_id, p))
        .collect();

    let mut scenarios_by_user: HashMap<i64, Vec<String>> = HashMap::new();
    for completion in ScenarioCompletion::list_completed(&state.db_pool).await? {
        scenarios_by_user
            .entry(completion.user_id)
            .or_default()
            .push(completion.scenario_key);
    }

    let mut attempts_by_user: HashMap<i64, Vec<RecentAttempt>> = HashMap::new();
    for attempt in QuizAttempt::recent_per_user(5, &state.db_pool).await? {
        attempts_by_user
            .entry(attempt.user_id)
            .or_default()
            .push(RecentAttempt {
                category_key: attempt.category_key,
                score: attempt.score,
                total_questions: attempt.total_questions,
                passed: attempt.passed,
                created_at: attempt.created_at,
            });
    }

    let overview = users
        .into_iter()
        .map(|user| {
            let progress = progress_by_user.get(&user.id);
            UserProgressOverview {
                user_id: user.id,
                username: user.username,
                email: user.email,
                scenarios_completed: progress.map(|p| p.scenarios_completed).unwrap_or(0),
                quizzes_passed: progress.map(|p| p.quizzes_passed).unwrap_or(0),
                total_score: progress.map(|p| p.total_score).unwrap_or(0),
                last_activity: progress.map(|p| p.last_updated).unwrap_or(user.created_at),
                completed_scenarios: scenarios_by_user.remove(&user.id).unwrap_or_default(),
                recent_quiz_attempts: attempts_by_user.remove(&user.id).unwrap_or_default(),
            }
        })
        .collect();

    Ok(Json(overview))
}

/// Recompute the persisted aggregate after a write. Best effort: the
/// recorded attempt is the source of truth, the aggregate is derived.
async fn refresh_progress(state: &AppState, user_id: i64) {
    if let Err(err) = UserProgress::recompute_totals(user_id, &state.db_pool).await {
        tracing::warn!(error = %err, user_id, "progress aggregate update failed");
    }
    state.cache.delete(&cache::progress_key(user_id)).await;
}
