//! Client for the MessageCentral VerifyNow phone verification API.
//!
//! VerifyNow generates and delivers the OTP itself; this client only asks it
//! to send a code to a phone number and later to validate what the user typed
//! against the returned verification id. Provider failures are reported as
//! tagged outcomes, never as errors, so callers can treat an outage as a
//! recoverable condition.

use std::time::Duration;

pub mod models;

use reqwest::{header, Client};
use tracing::{debug, warn};

pub use crate::models::{ProviderResponse, SendOutcome, ValidateOutcome};

pub const DEFAULT_BASE_URL: &str = "https://cpaas.messagecentral.com";

/// The fallback delivery channel the provider always accepts.
const FALLBACK_FLOW_TYPE: &str = "SMS";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct MsgCentralOptions {
    pub base_url: String,
    pub customer_id: String,
    pub sender_id: Option<String>,
    pub auth_token: String,
    pub country_code: String,
    pub flow_type: String,
    /// Requested OTP length, 4..=8 when present. Omitted otherwise and the
    /// provider falls back to its account default.
    pub otp_length: Option<u8>,
}

#[derive(Debug, Clone)]
pub struct MsgCentralService {
    options: MsgCentralOptions,
    client: Client,
}

/// Reduce a user-supplied phone number to the national digits the provider
/// expects: drop every non-digit, then either a duplicated leading country
/// code or any leading zeros (not both).
pub fn normalize_phone_number(raw: &str, country_code: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return digits;
    }
    if digits.starts_with(country_code) {
        return digits[country_code.len()..].to_string();
    }
    digits.trim_start_matches('0').to_string()
}

impl MsgCentralService {
    pub fn new(options: MsgCentralOptions) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { options, client }
    }

    /// Ask the provider to deliver a verification code to `phone_number`.
    ///
    /// If the configured flow type is rejected with the provider's
    /// "Invalid FlowType selected" quirk, the request is retried exactly once
    /// with the fallback channel and the retry's verdict is final.
    pub async fn send_otp(&self, phone_number: &str) -> SendOutcome {
        let mobile = normalize_phone_number(phone_number, &self.options.country_code);
        if mobile.is_empty() {
            return SendOutcome::failed("Phone number contains no digits");
        }

        let first = match self.send_once(&mobile, &self.options.flow_type).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "verification send request failed");
                return SendOutcome::failed("No response from SMS service");
            }
        };

        let (status, body) = first;
        if body.invalid_flow_type() {
            warn!(
                flow_type = %self.options.flow_type,
                "provider rejected flow type, retrying with fallback"
            );
            return match self.send_once(&mobile, FALLBACK_FLOW_TYPE).await {
                Ok((retry_status, retry_body)) => retry_body.into_send_outcome(retry_status),
                Err(e) => {
                    warn!(error = %e, "verification send retry failed");
                    SendOutcome::failed("No response from SMS service")
                }
            };
        }

        body.into_send_outcome(status)
    }

    /// Check a user-supplied code against a verification id from `send_otp`.
    pub async fn validate_otp(&self, verification_id: &str, code: &str) -> ValidateOutcome {
        let url = format!("{}/verification/v3/validateOtp", self.base_url());
        let result = self
            .client
            .get(&url)
            .query(&[
                ("verificationId", verification_id),
                ("code", code),
                ("langId", "en"),
            ])
            .header("authToken", &self.options.auth_token)
            .send()
            .await;

        match result {
            Ok(response) => {
                let status = response.status().as_u16();
                let body = response.json::<ProviderResponse>().await.unwrap_or_default();
                debug!(status, "otp validate response");
                body.into_validate_outcome(status)
            }
            Err(e) => {
                warn!(error = %e, "otp validate request failed");
                ValidateOutcome::invalid(format!("Failed to validate OTP: {e}"))
            }
        }
    }

    async fn send_once(
        &self,
        mobile_number: &str,
        flow_type: &str,
    ) -> Result<(u16, ProviderResponse), reqwest::Error> {
        let url = format!("{}/verification/v3/send", self.base_url());
        let mut query: Vec<(&str, String)> = vec![
            ("countryCode", self.options.country_code.clone()),
            ("flowType", flow_type.to_string()),
            ("mobileNumber", mobile_number.to_string()),
        ];
        if let Some(len) = self.options.otp_length {
            query.push(("otpLength", len.to_string()));
        }

        let response = self
            .client
            .post(&url)
            .query(&query)
            .header("authToken", &self.options.auth_token)
            .header(header::CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.json::<ProviderResponse>().await.unwrap_or_default();
        debug!(status, flow_type, "verification send response");
        Ok((status, body))
    }

    fn base_url(&self) -> &str {
        self.options.base_url.trim_end_matches('/')
    }
}
