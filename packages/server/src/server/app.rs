//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::domains::auth::{AuthService, JwtService};
use crate::kernel::{BaseOtpService, Cache, ServerDeps};
use crate::server::middleware::{jwt_auth_middleware, request_log_middleware, require_admin};
use crate::server::routes::{self, health_handler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub cache: Cache,
    pub auth: Arc<AuthService>,
    pub jwt_service: Arc<JwtService>,
    pub config: Arc<Config>,
}

/// Build the Axum application router
///
/// The OTP service is injected so tests can run the full router against a
/// mock provider instead of MessageCentral.
pub fn build_app(
    pool: PgPool,
    cache: Cache,
    config: Config,
    otp: Arc<dyn BaseOtpService>,
) -> Router {
    let jwt_service = Arc::new(JwtService::new(
        &config.jwt_secret,
        config.jwt_issuer.clone(),
        config.jwt_ttl_seconds,
    ));

    let deps = ServerDeps::new(pool.clone(), otp, jwt_service.clone(), cache.clone());
    let auth = Arc::new(AuthService::new(deps, config.refresh_ttl_days));

    let cors = cors_layer(&config.allowed_origins);

    let app_state = AppState {
        db_pool: pool,
        cache,
        auth,
        jwt_service: jwt_service.clone(),
        config: Arc::new(config),
    };

    // Clone jwt_service for middleware closure
    let authenticate = middleware::from_fn(move |req, next| {
        jwt_auth_middleware(jwt_service.clone(), req, next)
    });

    // Auth: public endpoints plus token-gated profile/password and
    // admin-gated user management
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register_handler))
        .route("/login", post(routes::auth::login_handler))
        .route("/admin/login", post(routes::auth::admin_login_handler))
        .route("/verify-phone", post(routes::auth::verify_phone_handler))
        .route(
            "/resend-phone-code",
            post(routes::auth::resend_phone_code_handler),
        )
        .route(
            "/forgot-password",
            post(routes::auth::forgot_password_handler),
        )
        .route("/reset-password", post(routes::auth::reset_password_handler))
        .route("/refresh", post(routes::auth::refresh_handler))
        .route("/logout", post(routes::auth::logout_handler))
        .merge(
            Router::new()
                .route("/profile", get(routes::auth::profile_handler))
                .route(
                    "/change-password",
                    post(routes::auth::change_password_handler),
                )
                .route_layer(authenticate.clone()),
        )
        .merge(
            Router::new()
                .route("/admin/users", get(routes::auth::admin_list_users_handler))
                .route(
                    "/admin/user/:id",
                    delete(routes::auth::admin_delete_user_handler),
                )
                .route(
                    "/admin/verify-user",
                    post(routes::auth::admin_verify_user_handler),
                )
                .route_layer(middleware::from_fn(require_admin))
                .route_layer(authenticate.clone()),
        );

    let users_routes = Router::new()
        .route("/", get(routes::users::list_users_handler))
        .merge(
            Router::new()
                .route("/admin/all", get(routes::users::admin_list_users_handler))
                .route_layer(authenticate.clone()),
        );

    let quiz_routes = Router::new()
        .route("/categories", get(routes::quiz::list_categories_handler))
        .route(
            "/category/:key",
            get(routes::quiz::category_questions_handler),
        )
        .merge(
            Router::new()
                .route(
                    "/admin/category",
                    post(routes::quiz::admin_upsert_category_handler),
                )
                .route(
                    "/admin/question",
                    post(routes::quiz::admin_create_question_handler),
                )
                .route(
                    "/admin/questions",
                    get(routes::quiz::admin_list_questions_handler),
                )
                .route(
                    "/admin/question/:id",
                    put(routes::quiz::admin_update_question_handler)
                        .delete(routes::quiz::admin_delete_question_handler),
                )
                .route_layer(middleware::from_fn(require_admin))
                .route_layer(authenticate.clone()),
        );

    let game_routes = Router::new()
        .route(
            "/phishing-emails",
            get(routes::game::list_phishing_emails_handler),
        )
        .merge(
            Router::new()
                .route(
                    "/admin/phishing-emails",
                    get(routes::game::admin_list_phishing_emails_handler),
                )
                .route(
                    "/admin/phishing-email",
                    post(routes::game::admin_create_phishing_email_handler),
                )
                .route(
                    "/admin/phishing-email/:id",
                    patch(routes::game::admin_update_phishing_email_handler)
                        .delete(routes::game::admin_delete_phishing_email_handler),
                )
                .route_layer(middleware::from_fn(require_admin))
                .route_layer(authenticate.clone()),
        );

    let progress_routes = Router::new()
        .route("/progress", get(routes::progress::get_progress_handler))
        .route(
            "/quiz-attempt",
            post(routes::progress::record_quiz_attempt_handler),
        )
        .route(
            "/scenario-completion",
            post(routes::progress::record_scenario_completion_handler),
        )
        .route(
            "/quiz-attempts",
            get(routes::progress::list_quiz_attempts_handler),
        )
        .route(
            "/scenario-completions",
            get(routes::progress::list_scenario_completions_handler),
        )
        .route_layer(authenticate.clone())
        .merge(
            Router::new()
                .route(
                    "/admin/all-progress",
                    get(routes::progress::admin_all_progress_handler),
                )
                .route_layer(middleware::from_fn(require_admin))
                .route_layer(authenticate.clone()),
        );

    Router::new()
        .route("/", get(health_handler))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", users_routes)
        .nest("/api/quiz", quiz_routes)
        .nest("/api/game", game_routes)
        .nest("/api/progress", progress_routes)
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(request_log_middleware))
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(origin = %origin, error = %err, "ignoring malformed CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
}
