//! In-process HTTP client that drives the assembled router.
//!
//! Requests go through the real middleware stack (auth guards, request
//! logging, CORS) via `tower::ServiceExt::oneshot`, so tests observe
//! exactly what a network client would.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use server_core::domains::auth::{JwtService, User};
use server_core::kernel::{Cache, MockOtpService};
use server_core::server::build_app;
use server_core::Config;

pub const TEST_JWT_SECRET: &str = "test_secret_key";
pub const TEST_JWT_ISSUER: &str = "test_issuer";

/// Configuration for tests. Provider fields point at nothing; every test
/// runs against the injected mock OTP service.
pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        redis_url: "redis://unused".to_string(),
        port: 0,
        jwt_secret: TEST_JWT_SECRET.to_string(),
        jwt_issuer: TEST_JWT_ISSUER.to_string(),
        jwt_ttl_seconds: 3_600,
        refresh_ttl_days: 30,
        msgcentral_base_url: "http://127.0.0.1:9".to_string(),
        msgcentral_customer_id: "C-TEST".to_string(),
        msgcentral_sender_id: None,
        msgcentral_auth_token: "test-token".to_string(),
        msgcentral_country_code: "91".to_string(),
        msgcentral_flow_type: "SMS".to_string(),
        msgcentral_otp_length: None,
        allowed_origins: vec!["http://localhost:3000".to_string()],
        production: false,
    }
}

/// Mint an access token for a fixture user, signed with the test secret.
pub fn token_for(user: &User) -> String {
    JwtService::new(TEST_JWT_SECRET, TEST_JWT_ISSUER.to_string(), 3_600)
        .create_token(user.id, &user.username, &user.role)
        .expect("token creation cannot fail with a static secret")
}

pub struct TestApp {
    router: Router,
    pub otp: Arc<MockOtpService>,
}

impl TestApp {
    /// Router over the given pool, cache disabled, default mock OTP
    /// (every send succeeds with `mock-verification-id`).
    pub fn new(pool: PgPool) -> Self {
        Self::with_parts(pool, Cache::disabled(), MockOtpService::new())
    }

    /// Router with scripted OTP provider responses.
    pub fn with_otp(pool: PgPool, otp: MockOtpService) -> Self {
        Self::with_parts(pool, Cache::disabled(), otp)
    }

    pub fn with_parts(pool: PgPool, cache: Cache, otp: MockOtpService) -> Self {
        let otp = Arc::new(otp);
        let router = build_app(pool, cache, test_config(), otp.clone());
        Self { router, otp }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.send(Method::GET, path, None, None, None).await
    }

    pub async fn get_auth(&self, path: &str, token: &str) -> TestResponse {
        self.send(Method::GET, path, Some(token), None, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.send(Method::POST, path, None, None, Some(body)).await
    }

    pub async fn post_auth(&self, path: &str, token: &str, body: Value) -> TestResponse {
        self.send(Method::POST, path, Some(token), None, Some(body))
            .await
    }

    /// POST with no body at all; exercises the handlers' missing-payload path.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.send(Method::POST, path, None, None, None).await
    }

    /// POST carrying a `Cookie` header (refresh and logout flows).
    pub async fn post_with_cookie(&self, path: &str, cookie: &str) -> TestResponse {
        self.send(Method::POST, path, None, Some(cookie), None).await
    }

    pub async fn put_auth(&self, path: &str, token: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, path, Some(token), None, Some(body))
            .await
    }

    pub async fn patch_auth(&self, path: &str, token: &str, body: Value) -> TestResponse {
        self.send(Method::PATCH, path, Some(token), None, Some(body))
            .await
    }

    pub async fn delete_auth(&self, path: &str, token: &str) -> TestResponse {
        self.send(Method::DELETE, path, Some(token), None, None).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .expect("request construction"),
            None => builder.body(Body::empty()).expect("request construction"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body collection");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn set_cookie(&self) -> Option<String> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    }

    /// The `refresh_token=<value>` pair from Set-Cookie, ready to send
    /// back as a `Cookie` header.
    pub fn refresh_cookie_pair(&self) -> Option<String> {
        self.set_cookie()?
            .split(';')
            .next()
            .map(|pair| pair.trim().to_string())
    }
}
