//! Response shapes for the MessageCentral VerifyNow API.
//!
//! The provider is inconsistent about where it reports success: depending on
//! the endpoint and error class, the interesting fields show up at the top
//! level, under `data`, as numbers or as strings. Everything here funnels
//! into two tagged outcomes so callers never have to look at the raw shape.

use serde::Deserialize;
use serde_json::Value;

/// Result of requesting an OTP send.
///
/// A successful send usually carries the provider's verification handle, but
/// the provider has been observed to omit it; callers treat that as "sent,
/// no handle to return".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Sent { verification_id: Option<String> },
    Failed { reason: String },
}

impl SendOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent { .. })
    }

    pub fn verification_id(&self) -> Option<&str> {
        match self {
            Self::Sent { verification_id } => verification_id.as_deref(),
            Self::Failed { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Sent { .. } => None,
            Self::Failed { reason } => Some(reason),
        }
    }
}

/// Result of validating a previously sent OTP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidateOutcome {
    Valid,
    Invalid { reason: String },
}

impl ValidateOutcome {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid {
            reason: reason.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid { reason } => Some(reason),
        }
    }
}

/// Loose envelope covering every VerifyNow response variant seen in the wild.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderResponse {
    pub response_code: Option<Value>,
    pub message: Option<String>,
    pub status: Option<String>,
    pub error: Option<String>,
    pub verification_id: Option<Value>,
    pub data: Option<ProviderData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderData {
    pub verification_id: Option<Value>,
    pub response_code: Option<Value>,
    pub status: Option<String>,
    pub verification_status: Option<String>,
    pub error_message: Option<String>,
    pub message: Option<String>,
}

fn code_is_200(code: Option<&Value>) -> bool {
    match code {
        Some(Value::Number(n)) => n.as_i64() == Some(200),
        Some(Value::String(s)) => s == "200",
        _ => false,
    }
}

fn value_to_id(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

impl ProviderResponse {
    /// The provider sometimes rejects the configured delivery channel with an
    /// "Invalid FlowType selected" message. Detecting it here lets the client
    /// retry once with the known-good value.
    pub fn invalid_flow_type(&self) -> bool {
        match &self.message {
            Some(m) => m == "Invalid FlowType selected" || m.to_lowercase().contains("invalid flowtype"),
            None => false,
        }
    }

    /// Normalize a send response into a tagged outcome.
    ///
    /// Success requires a 2xx transport status plus any of the provider's
    /// known success markers; anything else is a failure with the most
    /// specific reason the payload offers.
    pub fn into_send_outcome(self, http_status: u16) -> SendOutcome {
        let transport_ok = (200..300).contains(&http_status);
        let body_ok = self.message.as_deref() == Some("SUCCESS")
            || self.status.as_deref() == Some("success")
            || code_is_200(self.response_code.as_ref());
        let data_ok = self
            .data
            .as_ref()
            .map(|d| code_is_200(d.response_code.as_ref()) || d.status.as_deref() == Some("success"))
            .unwrap_or(false);

        if transport_ok && (body_ok || data_ok) {
            let verification_id = self
                .data
                .as_ref()
                .and_then(|d| value_to_id(d.verification_id.as_ref()))
                .or_else(|| value_to_id(self.verification_id.as_ref()));
            SendOutcome::Sent { verification_id }
        } else {
            let reason = self
                .message
                .or(self.error)
                .or(self.data.and_then(|d| d.message))
                .unwrap_or_else(|| format!("HTTP {http_status}"));
            SendOutcome::Failed { reason }
        }
    }

    /// Normalize a validateOtp response into a tagged outcome.
    ///
    /// The validate endpoint is stricter than send: it must say SUCCESS and
    /// the data payload must confirm completion. Ambiguity is failure.
    pub fn into_validate_outcome(self, http_status: u16) -> ValidateOutcome {
        let transport_ok = (200..300).contains(&http_status);
        let data_ok = self
            .data
            .as_ref()
            .map(|d| {
                d.verification_status.as_deref() == Some("VERIFICATION_COMPLETED")
                    || code_is_200(d.response_code.as_ref())
            })
            .unwrap_or(false);

        if transport_ok && self.message.as_deref() == Some("SUCCESS") && data_ok {
            ValidateOutcome::Valid
        } else {
            let reason = self
                .data
                .and_then(|d| d.error_message)
                .or(self.message)
                .unwrap_or_else(|| format!("HTTP {http_status}"));
            ValidateOutcome::Invalid { reason }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(v: Value) -> ProviderResponse {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn send_success_via_data_response_code() {
        let resp = parse(json!({
            "responseCode": 200,
            "message": "SUCCESS",
            "data": { "verificationId": "12345", "responseCode": "200" }
        }));
        assert_eq!(
            resp.into_send_outcome(200),
            SendOutcome::Sent {
                verification_id: Some("12345".to_string())
            }
        );
    }

    #[test]
    fn send_success_via_top_level_status() {
        let resp = parse(json!({
            "status": "success",
            "verificationId": "v-77"
        }));
        assert_eq!(
            resp.into_send_outcome(200),
            SendOutcome::Sent {
                verification_id: Some("v-77".to_string())
            }
        );
    }

    #[test]
    fn send_success_with_numeric_verification_id() {
        let resp = parse(json!({
            "message": "SUCCESS",
            "data": { "verificationId": 990011, "status": "success" }
        }));
        assert_eq!(
            resp.into_send_outcome(200),
            SendOutcome::Sent {
                verification_id: Some("990011".to_string())
            }
        );
    }

    #[test]
    fn send_success_without_id_is_still_sent() {
        let resp = parse(json!({ "message": "SUCCESS" }));
        let outcome = resp.into_send_outcome(200);
        assert!(outcome.is_sent());
        assert_eq!(outcome.verification_id(), None);
    }

    #[test]
    fn send_2xx_with_error_body_is_failure() {
        let resp = parse(json!({ "message": "Insufficient balance" }));
        assert_eq!(
            resp.into_send_outcome(200),
            SendOutcome::failed("Insufficient balance")
        );
    }

    #[test]
    fn send_non_2xx_ignores_success_markers() {
        let resp = parse(json!({ "message": "SUCCESS", "data": { "verificationId": "x" } }));
        assert_eq!(resp.into_send_outcome(500), SendOutcome::failed("SUCCESS"));
    }

    #[test]
    fn send_empty_body_reports_http_status() {
        let resp = ProviderResponse::default();
        assert_eq!(resp.into_send_outcome(503), SendOutcome::failed("HTTP 503"));
    }

    #[test]
    fn send_failure_prefers_message_then_error_then_data_message() {
        let resp = parse(json!({ "error": "boom" }));
        assert_eq!(resp.into_send_outcome(400), SendOutcome::failed("boom"));

        let resp = parse(json!({ "data": { "message": "nested boom" } }));
        assert_eq!(resp.into_send_outcome(400), SendOutcome::failed("nested boom"));
    }

    #[test]
    fn invalid_flow_type_detection() {
        assert!(parse(json!({ "message": "Invalid FlowType selected" })).invalid_flow_type());
        assert!(parse(json!({ "message": "INVALID FLOWTYPE value" })).invalid_flow_type());
        assert!(!parse(json!({ "message": "SUCCESS" })).invalid_flow_type());
        assert!(!ProviderResponse::default().invalid_flow_type());
    }

    #[test]
    fn validate_success_requires_completed_status() {
        let resp = parse(json!({
            "message": "SUCCESS",
            "data": { "verificationStatus": "VERIFICATION_COMPLETED" }
        }));
        assert_eq!(resp.into_validate_outcome(200), ValidateOutcome::Valid);

        let resp = parse(json!({
            "message": "SUCCESS",
            "data": { "responseCode": "200" }
        }));
        assert_eq!(resp.into_validate_outcome(200), ValidateOutcome::Valid);
    }

    #[test]
    fn validate_success_marker_alone_is_not_enough() {
        let resp = parse(json!({ "message": "SUCCESS" }));
        assert!(!resp.into_validate_outcome(200).is_valid());
    }

    #[test]
    fn validate_wrong_code_surfaces_provider_reason() {
        let resp = parse(json!({
            "message": "FAILURE",
            "data": { "errorMessage": "Wrong OTP provided", "verificationStatus": "VERIFICATION_FAILED" }
        }));
        assert_eq!(
            resp.into_validate_outcome(200),
            ValidateOutcome::invalid("Wrong OTP provided")
        );
    }

    #[test]
    fn validate_expired_session_maps_http_status() {
        let resp = ProviderResponse::default();
        assert_eq!(
            resp.into_validate_outcome(400),
            ValidateOutcome::invalid("HTTP 400")
        );
    }
}
