//! Test fixtures for creating test data.
//!
//! Fixtures go through the model layer directly so tests can stage
//! accounts and content without walking the HTTP flows.

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

use server_core::domains::auth::password::hash_password;
use server_core::domains::auth::{User, ROLE_ADMIN, ROLE_USER};
use server_core::domains::game::PhishingEmail;
use server_core::domains::quiz::{QuizCategory, QuizOption, QuizQuestion};

/// Every fixture account uses this password.
pub const TEST_PASSWORD: &str = "password123";

/// Ten digits, unique per call; phone numbers carry a UNIQUE constraint.
pub fn unique_phone() -> String {
    format!("9{:09}", Uuid::new_v4().as_u128() % 1_000_000_000)
}

pub async fn create_user(pool: &PgPool, username: &str, verified: bool) -> Result<User> {
    let hash = hash_password(TEST_PASSWORD)?;
    User::create(
        username,
        &format!("{username}@test.example"),
        &unique_phone(),
        &hash,
        username,
        ROLE_USER,
        verified,
        pool,
    )
    .await
}

pub async fn create_admin(pool: &PgPool, username: &str) -> Result<User> {
    let hash = hash_password(TEST_PASSWORD)?;
    User::create(
        username,
        &format!("{username}@test.example"),
        &unique_phone(),
        &hash,
        username,
        ROLE_ADMIN,
        true,
        pool,
    )
    .await
}

pub async fn create_category(pool: &PgPool, key: &str, title: &str) -> Result<QuizCategory> {
    QuizCategory::upsert(key, title, Some("Fixture category"), pool).await
}

pub async fn create_question(
    pool: &PgPool,
    category_id: i64,
    question: &str,
    options: &[(&str, bool)],
) -> Result<(QuizQuestion, Vec<QuizOption>)> {
    let owned: Vec<(String, bool)> = options
        .iter()
        .map(|(text, is_correct)| (text.to_string(), *is_correct))
        .collect();
    QuizQuestion::create_with_options(category_id, question, None, &owned, pool).await
}

pub async fn create_phishing_email(
    pool: &PgPool,
    sender: &str,
    subject: &str,
    active: bool,
) -> Result<PhishingEmail> {
    PhishingEmail::create(
        sender,
        subject,
        "Your account will be suspended unless you act now.",
        true,
        vec!["urgency".to_string(), "suspicious link".to_string()],
        active,
        pool,
    )
    .await
}
