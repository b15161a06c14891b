//! Influence-status transition rollups derived from the history table.

use serde::Serialize;

/// One ranked transition, keyed `"{previous}→{new}"` with the `"null"`
/// sentinel kept as-is (e.g. `"null→2"` for first-time assignments).
#[derive(Debug, Clone, Serialize)]
pub struct TransitionCount {
    pub key: String,
    pub count: i64,
}

pub fn transition_key(previous: &str, new: &str) -> String {
    format!("{previous}→{new}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_key_format() {
        assert_eq!(transition_key("1", "2"), "1→2");
        assert_eq!(transition_key("null", "2"), "null→2");
    }
}
