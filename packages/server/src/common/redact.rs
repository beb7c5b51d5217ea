use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

lazy_static! {
    // Field names whose values never reach the logs
    static ref SENSITIVE_KEY_REGEX: Regex =
        Regex::new(r"(?i)(password|token|secret|otp|\bcode\b)").unwrap();
}

pub const REDACTED: &str = "[redacted]";

/// Returns a loggable rendering of a JSON request body with credential
/// fields masked. Non-JSON bodies yield `None`.
pub fn redact_json_body(body: &[u8]) -> Option<String> {
    let mut value: Value = serde_json::from_slice(body).ok()?;
    redact_value(&mut value);
    Some(value.to_string())
}

fn redact_value(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, entry) in map.iter_mut() {
                if SENSITIVE_KEY_REGEX.is_match(key) {
                    *entry = Value::String(REDACTED.to_string());
                } else {
                    redact_value(entry);
                }
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                redact_value(item);
            }
        }
        _ => {}
    }
}
