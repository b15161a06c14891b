//! Optional status-change payload embedded in interaction requests.
//!
//! The payload is a JSON object string with a `newStatus` field holding an
//! integer string, e.g. `{"newStatus": "2"}`. A payload that fails to parse
//! is skipped with a warning and never fails the parent operation.

use serde_json::Value;

/// Parses the raw payload string into JSON. `None` means malformed.
pub fn parse_payload(raw: &str) -> Option<Value> {
    serde_json::from_str::<Value>(raw).ok().filter(Value::is_object)
}

/// Extracts the target status id from a parsed payload. Accepts an integer
/// string (the wire convention) or a bare integer.
pub fn new_status(payload: &Value) -> Option<i32> {
    match payload.get("newStatus")? {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_string_payload() {
        let payload = parse_payload(r#"{"newStatus": "2"}"#).unwrap();
        assert_eq!(new_status(&payload), Some(2));
    }

    #[test]
    fn test_bare_integer_payload() {
        let payload = parse_payload(r#"{"newStatus": 3}"#).unwrap();
        assert_eq!(new_status(&payload), Some(3));
    }

    #[test]
    fn test_malformed_json_is_skipped() {
        assert!(parse_payload("{newStatus: 2").is_none());
        assert!(parse_payload("").is_none());
        assert!(parse_payload("\"just a string\"").is_none());
    }

    #[test]
    fn test_missing_or_invalid_field_is_skipped() {
        let no_field = parse_payload(r#"{"status": "2"}"#).unwrap();
        assert_eq!(new_status(&no_field), None);

        let not_a_number = parse_payload(r#"{"newStatus": "soon"}"#).unwrap();
        assert_eq!(new_status(&not_a_number), None);

        let null_field = parse_payload(r#"{"newStatus": null}"#).unwrap();
        assert_eq!(new_status(&null_field), None);
    }
}
