// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
//
// Naming convention: Base* for trait names (e.g., BaseOtpService)

use async_trait::async_trait;
use msgcentral::{SendOutcome, ValidateOutcome};

// =============================================================================
// OTP Provider Trait (Infrastructure - SMS verification)
// =============================================================================

#[async_trait]
pub trait BaseOtpService: Send + Sync {
    /// Send a verification code via SMS to a phone number
    async fn send_code(&self, phone_number: &str) -> SendOutcome;

    /// Check a code against a previously issued verification
    async fn validate_code(&self, verification_id: &str, code: &str) -> ValidateOutcome;
}
