//! Server dependencies for the HTTP layer (using traits for testability)
//!
//! This module provides the central dependency container handed to every
//! domain service. External services sit behind trait abstractions so
//! tests can swap them out.

use async_trait::async_trait;
use msgcentral::{MsgCentralService, SendOutcome, ValidateOutcome};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domains::auth::JwtService;
use crate::kernel::{Cache, BaseOtpService};

// =============================================================================
// MsgCentralService Adapter (implements BaseOtpService trait)
// =============================================================================

/// Wrapper around MsgCentralService that implements BaseOtpService trait
pub struct MsgCentralAdapter(pub Arc<MsgCentralService>);

impl MsgCentralAdapter {
    pub fn new(service: Arc<MsgCentralService>) -> Self {
        Self(service)
    }
}

#[async_trait]
impl BaseOtpService for MsgCentralAdapter {
    async fn send_code(&self, phone_number: &str) -> SendOutcome {
        self.0.send_otp(phone_number).await
    }

    async fn validate_code(&self, verification_id: &str, code: &str) -> ValidateOutcome {
        self.0.validate_otp(verification_id, code).await
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to domain services
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    pub otp: Arc<dyn BaseOtpService>,
    /// JWT service for token creation and verification
    pub jwt_service: Arc<JwtService>,
    /// Advisory response cache; disabled when Redis is unreachable
    pub cache: Cache,
}

impl ServerDeps {
    /// Create new ServerDeps with the given dependencies
    pub fn new(
        db_pool: PgPool,
        otp: Arc<dyn BaseOtpService>,
        jwt_service: Arc<JwtService>,
        cache: Cache,
    ) -> Self {
        Self {
            db_pool,
            otp,
            jwt_service,
            cache,
        }
    }
}
