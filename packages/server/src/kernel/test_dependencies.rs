// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into ServerDeps for tests.

use async_trait::async_trait;
use msgcentral::{SendOutcome, ValidateOutcome};
use std::sync::{Arc, Mutex};

use super::BaseOtpService;

// =============================================================================
// Mock OTP Service
// =============================================================================

/// Mock SMS verification provider. Queued responses are consumed in
/// order; once the queue is empty every call succeeds.
pub struct MockOtpService {
    send_responses: Arc<Mutex<Vec<SendOutcome>>>,
    validate_responses: Arc<Mutex<Vec<ValidateOutcome>>>,
    send_calls: Arc<Mutex<Vec<String>>>,
    validate_calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockOtpService {
    pub fn new() -> Self {
        Self {
            send_responses: Arc::new(Mutex::new(Vec::new())),
            validate_responses: Arc::new(Mutex::new(Vec::new())),
            send_calls: Arc::new(Mutex::new(Vec::new())),
            validate_calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_send_response(self, response: SendOutcome) -> Self {
        self.send_responses.lock().unwrap().push(response);
        self
    }

    pub fn with_validate_response(self, response: ValidateOutcome) -> Self {
        self.validate_responses.lock().unwrap().push(response);
        self
    }

    /// Get all phone numbers a code was sent to
    pub fn send_calls(&self) -> Vec<String> {
        self.send_calls.lock().unwrap().clone()
    }

    /// Get all (verification_id, code) pairs that were validated
    pub fn validate_calls(&self) -> Vec<(String, String)> {
        self.validate_calls.lock().unwrap().clone()
    }

    /// Check if a code was sent to a phone number
    pub fn sent_to(&self, phone_number: &str) -> bool {
        self.send_calls
            .lock()
            .unwrap()
            .iter()
            .any(|p| p == phone_number)
    }
}

impl Default for MockOtpService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseOtpService for MockOtpService {
    async fn send_code(&self, phone_number: &str) -> SendOutcome {
        // Record the call
        self.send_calls.lock().unwrap().push(phone_number.to_string());

        let mut responses = self.send_responses.lock().unwrap();
        if !responses.is_empty() {
            responses.remove(0)
        } else {
            SendOutcome::Sent {
                verification_id: Some("mock-verification-id".to_string()),
            }
        }
    }

    async fn validate_code(&self, verification_id: &str, code: &str) -> ValidateOutcome {
        self.validate_calls
            .lock()
            .unwrap()
            .push((verification_id.to_string(), code.to_string()));

        let mut responses = self.validate_responses.lock().unwrap();
        if !responses.is_empty() {
            responses.remove(0)
        } else {
            ValidateOutcome::Valid
        }
    }
}
