// Main entry point for API server

use std::sync::Arc;

use anyhow::{Context, Result};
use msgcentral::{MsgCentralOptions, MsgCentralService};
use server_core::kernel::{Cache, MsgCentralAdapter};
use server_core::server::build_app;
use server_core::Config;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting AR CyberGuard API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    // Connect to Redis; the server stays up without it
    let cache = Cache::connect(&config.redis_url).await;

    // OTP provider client
    let msgcentral = Arc::new(MsgCentralService::new(MsgCentralOptions {
        base_url: config.msgcentral_base_url.clone(),
        customer_id: config.msgcentral_customer_id.clone(),
        sender_id: config.msgcentral_sender_id.clone(),
        auth_token: config.msgcentral_auth_token.clone(),
        country_code: config.msgcentral_country_code.clone(),
        flow_type: config.msgcentral_flow_type.clone(),
        otp_length: config.msgcentral_otp_length,
    }));
    let otp = Arc::new(MsgCentralAdapter::new(msgcentral));

    // Build application
    let port = config.port;
    let app = build_app(pool, cache, config, otp);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/", port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received, draining connections");
}
