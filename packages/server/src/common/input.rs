/// Treats absent and empty-string request fields the same way.
///
/// Wire inputs deserialize every field as `Option<String>` so a missing
/// field produces our 400 message instead of a deserialization error;
/// this is the single place that decides what counts as "present".
pub fn provided(value: &Option<String>) -> Option<&str> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Some(v),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_and_empty_are_both_missing() {
        assert_eq!(provided(&None), None);
        assert_eq!(provided(&Some(String::new())), None);
        assert_eq!(provided(&Some("x".to_string())), Some("x"));
    }
}
