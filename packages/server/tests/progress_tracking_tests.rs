//! Integration tests for progress tracking.
//!
//! Quiz attempts and scenario completions feed the per-user counters;
//! the admin overview aggregates them across accounts.

mod common;

use common::{create_admin, create_user, token_for, TestApp, TestHarness};
use serde_json::json;
use server_core::kernel::{Cache, MockOtpService};
use test_context::test_context;

// ============================================================================
// The per-user aggregate
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn test_progress_bootstraps_to_zero(ctx: &TestHarness) {
    let app = TestApp::new(ctx.db_pool.clone());
    let user = create_user(&ctx.db_pool, "pr_zero", true).await.unwrap();

    let resp = app.get_auth("/api/progress/progress", &token_for(&user)).await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body["scenariosCompleted"], 0);
    assert_eq!(resp.body["quizzesPassed"], 0);
    assert_eq!(resp.body["totalScore"], 0);
    assert!(resp.body.get("lastUpdated").is_some());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_progress_requires_authentication(ctx: &TestHarness) {
    let app = TestApp::new(ctx.db_pool.clone());

    let resp = app.get("/api/progress/progress").await;
    assert_eq!(resp.status, 401);
    assert_eq!(resp.body["error"], "Access token required");
}

// ============================================================================
// Quiz attempts
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn test_quiz_attempts_update_the_counters(ctx: &TestHarness) {
    let app = TestApp::new(ctx.db_pool.clone());
    let user = create_user(&ctx.db_pool, "pr_counts", true).await.unwrap();
    let token = token_for(&user);

    let resp = app
        .post_auth(
            "/api/progress/quiz-attempt",
            &token,
            json!({
                "categoryKey": "pr-phishing",
                "score": 9,
                "totalQuestions": 10,
                "timeSpent": 120,
                "answers": [1, 0, 2, 1, 1, 0, 3, 2, 1, 0]
            }),
        )
        .await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body["message"], "Quiz attempt recorded");
    assert_eq!(resp.body["attempt"]["passed"], true);
    assert_eq!(resp.body["attempt"]["score"], 9);
    assert_eq!(resp.body["attempt"]["totalQuestions"], 10);

    let resp = app
        .post_auth(
            "/api/progress/quiz-attempt",
            &token,
            json!({ "categoryKey": "pr-phishing", "score": 5, "totalQuestions": 10 }),
        )
        .await;
    assert_eq!(resp.body["attempt"]["passed"], false);

    // One pass, and the score total sums every attempt
    let resp = app.get_auth("/api/progress/progress", &token).await;
    assert_eq!(resp.body["quizzesPassed"], 1);
    assert_eq!(resp.body["totalScore"], 14);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_quiz_pass_threshold_is_eighty_percent(ctx: &TestHarness) {
    let app = TestApp::new(ctx.db_pool.clone());
    let user = create_user(&ctx.db_pool, "pr_edge", true).await.unwrap();
    let token = token_for(&user);

    let resp = app
        .post_auth(
            "/api/progress/quiz-attempt",
            &token,
            json!({ "categoryKey": "pr-edge", "score": 8, "totalQuestions": 10 }),
        )
        .await;
    assert_eq!(resp.body["attempt"]["passed"], true, "exactly 80% passes");

    let resp = app
        .post_auth(
            "/api/progress/quiz-attempt",
            &token,
            json!({ "categoryKey": "pr-edge", "score": 7, "totalQuestions": 10 }),
        )
        .await;
    assert_eq!(resp.body["attempt"]["passed"], false, "79% does not");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_quiz_attempt_requires_its_fields(ctx: &TestHarness) {
    let app = TestApp::new(ctx.db_pool.clone());
    let user = create_user(&ctx.db_pool, "pr_fields", true).await.unwrap();
    let token = token_for(&user);

    let resp = app
        .post_auth("/api/progress/quiz-attempt", &token, json!({}))
        .await;
    assert_eq!(resp.status, 400);
    assert_eq!(resp.body["error"], "Missing required fields");

    // A zero-question quiz cannot be scored
    let resp = app
        .post_auth(
            "/api/progress/quiz-attempt",
            &token,
            json!({ "categoryKey": "pr-fields", "score": 0, "totalQuestions": 0 }),
        )
        .await;
    assert_eq!(resp.status, 400);
    assert_eq!(resp.body["error"], "Missing required fields");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_quiz_attempt_listing_filters_by_category(ctx: &TestHarness) {
    let app = TestApp::new(ctx.db_pool.clone());
    let user = create_user(&ctx.db_pool, "pr_filter", true).await.unwrap();
    let token = token_for(&user);

    for (key, score) in [("pr-cat-a", 8), ("pr-cat-b", 6), ("pr-cat-a", 9)] {
        app.post_auth(
            "/api/progress/quiz-attempt",
            &token,
            json!({ "categoryKey": key, "score": score, "totalQuestions": 10 }),
        )
        .await;
    }

    let resp = app.get_auth("/api/progress/quiz-attempts", &token).await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body["attempts"].as_array().unwrap().len(), 3);

    let resp = app
        .get_auth("/api/progress/quiz-attempts?categoryKey=pr-cat-a", &token)
        .await;
    let attempts = resp.body["attempts"].as_array().unwrap();
    assert_eq!(attempts.len(), 2);
    assert!(attempts.iter().all(|a| a["categoryKey"] == "pr-cat-a"));
    // Rows belong to the caller implicitly; the id never leaves the server
    assert!(attempts.iter().all(|a| a.get("userId").is_none()));
}

// ============================================================================
// Scenario completions
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn test_scenario_completion_upserts_by_key(ctx: &TestHarness) {
    let app = TestApp::new(ctx.db_pool.clone());
    let user = create_user(&ctx.db_pool, "pr_scen", true).await.unwrap();
    let token = token_for(&user);

    let resp = app
        .post_auth(
            "/api/progress/scenario-completion",
            &token,
            json!({ "scenarioKey": "pr-lab-1", "score": 90, "timeSpent": 300 }),
        )
        .await;
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body["message"], "Scenario completion recorded");
    assert_eq!(resp.body["completion"]["completed"], true);
    assert_eq!(resp.body["completion"]["score"], 90);
    let first_id = resp.body["completion"]["id"].as_i64().unwrap();

    // Same scenario again updates the row instead of adding one
    let resp = app
        .post_auth(
            "/api/progress/scenario-completion",
            &token,
            json!({ "scenarioKey": "pr-lab-1", "score": 95 }),
        )
        .await;
    assert_eq!(resp.body["completion"]["id"], first_id);
    assert_eq!(resp.body["completion"]["score"], 95);

    let resp = app.get_auth("/api/progress/progress", &token).await;
    assert_eq!(resp.body["scenariosCompleted"], 1);

    let resp = app
        .get_auth("/api/progress/scenario-completions", &token)
        .await;
    let completions = resp.body["completions"].as_array().unwrap();
    assert_eq!(completions.len(), 1);
    assert_eq!(completions[0]["scenarioKey"], "pr-lab-1");
    assert_eq!(completions[0]["timeSpent"], 300, "omitted field kept its value");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_scenario_completion_requires_a_key(ctx: &TestHarness) {
    let app = TestApp::new(ctx.db_pool.clone());
    let user = create_user(&ctx.db_pool, "pr_scen_req", true).await.unwrap();

    let resp = app
        .post_auth("/api/progress/scenario-completion", &token_for(&user), json!({}))
        .await;
    assert_eq!(resp.status, 400);
    assert_eq!(resp.body["error"], "Missing scenario key");
}

// ============================================================================
// Isolation and the admin overview
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn test_progress_is_isolated_per_user(ctx: &TestHarness) {
    let app = TestApp::new(ctx.db_pool.clone());
    let active = create_user(&ctx.db_pool, "pr_iso_a", true).await.unwrap();
    let idle = create_user(&ctx.db_pool, "pr_iso_b", true).await.unwrap();

    app.post_auth(
        "/api/progress/quiz-attempt",
        &token_for(&active),
        json!({ "categoryKey": "pr-iso", "score": 10, "totalQuestions": 10 }),
    )
    .await;

    let resp = app
        .get_auth("/api/progress/progress", &token_for(&idle))
        .await;
    assert_eq!(resp.body["quizzesPassed"], 0);
    assert_eq!(resp.body["totalScore"], 0);

    let resp = app
        .get_auth("/api/progress/quiz-attempts", &token_for(&idle))
        .await;
    assert_eq!(resp.body["attempts"].as_array().unwrap().len(), 0);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn test_admin_overview_aggregates_per_account(ctx: &TestHarness) {
    let app = TestApp::new(ctx.db_pool.clone());
    let admin = create_admin(&ctx.db_pool, "pr_admin").await.unwrap();
    let player = create_user(&ctx.db_pool, "pr_admin_player", true)
        .await
        .unwrap();
    let idle = create_user(&ctx.db_pool, "pr_admin_idle", true)
        .await
        .unwrap();
    let player_token = token_for(&player);

    app.post_auth(
        "/api/progress/scenario-completion",
        &player_token,
        json!({ "scenarioKey": "pr-admin-lab" }),
    )
    .await;
    app.post_auth(
        "/api/progress/quiz-attempt",
        &player_token,
        json!({ "categoryKey": "pr-admin-quiz", "score": 9, "totalQuestions": 10 }),
    )
    .await;

    let resp = app
        .get_auth("/api/progress/admin/all-progress", &token_for(&admin))
        .await;
    assert_eq!(resp.status, 200);
    let rows = resp.body.as_array().unwrap();

    let row = rows
        .iter()
        .find(|r| r["username"] == "pr_admin_player")
        .expect("player row exists");
    assert_eq!(row["scenariosCompleted"], 1);
    assert_eq!(row["quizzesPassed"], 1);
    assert_eq!(row["totalScore"], 9);
    assert_eq!(row["completedScenarios"], json!(["pr-admin-lab"]));
    assert_eq!(row["recentQuizAttempts"][0]["categoryKey"], "pr-admin-quiz");

    // An account with no recorded progress still appears, dated by its
    // creation time
    let row = rows
        .iter()
        .find(|r| r["username"] == "pr_admin_idle")
        .expect("idle row exists");
    assert_eq!(row["scenariosCompleted"], 0);
    assert_eq!(row["completedScenarios"], json!([]));
    assert_eq!(
        row["lastActivity"],
        serde_json::to_value(idle.created_at).unwrap()
    );
}

// ============================================================================
// Cache behavior
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn test_progress_cache_is_invalidated_by_writes(ctx: &TestHarness) {
    let app = TestApp::with_parts(
        ctx.db_pool.clone(),
        Cache::connect(&ctx.redis_url).await,
        MockOtpService::new(),
    );
    let user = create_user(&ctx.db_pool, "pr_cache", true).await.unwrap();
    let token = token_for(&user);

    // Prime the cache
    let resp = app.get_auth("/api/progress/progress", &token).await;
    assert_eq!(resp.body["totalScore"], 0);

    app.post_auth(
        "/api/progress/quiz-attempt",
        &token,
        json!({ "categoryKey": "pr-cache", "score": 8, "totalQuestions": 10 }),
    )
    .await;

    // The write evicted the cached zeros
    let resp = app.get_auth("/api/progress/progress", &token).await;
    assert_eq!(resp.body["totalScore"], 8);
    assert_eq!(resp.body["quizzesPassed"], 1);
}
