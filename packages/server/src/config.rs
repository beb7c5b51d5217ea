use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_ttl_seconds: i64,
    pub refresh_ttl_days: i64,
    pub msgcentral_base_url: String,
    pub msgcentral_customer_id: String,
    pub msgcentral_sender_id: Option<String>,
    pub msgcentral_auth_token: String,
    pub msgcentral_country_code: String,
    pub msgcentral_flow_type: String,
    pub msgcentral_otp_length: Option<u8>,
    pub allowed_origins: Vec<String>,
    pub production: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "5001".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            jwt_secret: env::var("JWT_SECRET")
                .context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER")
                .unwrap_or_else(|_| "cyberguard-api".to_string()),
            jwt_ttl_seconds: parse_duration_seconds(
                &env::var("JWT_EXPIRES_IN").unwrap_or_else(|_| "7d".to_string()),
            )
            .context("JWT_EXPIRES_IN must be a duration like 7d, 12h, 30m or 900")?,
            refresh_ttl_days: env::var("REFRESH_TTL_DAYS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .context("REFRESH_TTL_DAYS must be a valid number of days")?,
            msgcentral_base_url: env::var("MESSAGECENTRAL_BASE_URL")
                .unwrap_or_else(|_| msgcentral::DEFAULT_BASE_URL.to_string()),
            msgcentral_customer_id: env::var("MESSAGECENTRAL_CUSTOMER_ID")
                .context("MESSAGECENTRAL_CUSTOMER_ID must be set")?,
            msgcentral_sender_id: env::var("MESSAGECENTRAL_SENDER_ID").ok(),
            msgcentral_auth_token: env::var("MESSAGECENTRAL_AUTH_TOKEN")
                .context("MESSAGECENTRAL_AUTH_TOKEN must be set")?,
            msgcentral_country_code: env::var("MESSAGECENTRAL_COUNTRY_CODE")
                .unwrap_or_else(|_| "91".to_string()),
            msgcentral_flow_type: env::var("MESSAGECENTRAL_FLOW_TYPE")
                .unwrap_or_else(|_| "SMS".to_string()),
            msgcentral_otp_length: parse_otp_length(env::var("MESSAGECENTRAL_OTP_LENGTH").ok()),
            allowed_origins: parse_origins(env::var("ALLOWED_ORIGINS").ok()),
            production: env::var("APP_ENV")
                .map(|v| v == "production")
                .unwrap_or(false),
        })
    }
}

/// Parses durations the way deploy environments write them: a bare number
/// of seconds, or a number suffixed with `s`, `m`, `h` or `d`.
fn parse_duration_seconds(raw: &str) -> Result<i64> {
    let trimmed = raw.trim();
    let (digits, multiplier) = match trimmed.chars().last() {
        Some('s') => (&trimmed[..trimmed.len() - 1], 1),
        Some('m') => (&trimmed[..trimmed.len() - 1], 60),
        Some('h') => (&trimmed[..trimmed.len() - 1], 3_600),
        Some('d') => (&trimmed[..trimmed.len() - 1], 86_400),
        _ => (trimmed, 1),
    };
    let value: i64 = digits
        .trim()
        .parse()
        .with_context(|| format!("invalid duration: {raw}"))?;
    Ok(value * multiplier)
}

/// The provider only accepts OTP lengths between 4 and 8; anything else
/// falls back to the provider default.
fn parse_otp_length(raw: Option<String>) -> Option<u8> {
    let value: u8 = raw?.trim().parse().ok()?;
    (4..=8).contains(&value).then_some(value)
}

fn parse_origins(raw: Option<String>) -> Vec<String> {
    match raw {
        Some(list) => list
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect(),
        None => vec![
            "http://localhost:5173".to_string(),
            "http://127.0.0.1:5173".to_string(),
            "http://localhost:3000".to_string(),
        ],
    }
}
