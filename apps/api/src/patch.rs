//! Three-state optional field for update payloads.
//!
//! Update endpoints must distinguish "field omitted from the request" (keep
//! the stored value) from "field explicitly set to null" (clear it). A plain
//! `Option<T>` collapses the two, so update request structs use `Patch<T>`
//! with `#[serde(default)]`.

use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Patch<T> {
    /// Field was not present in the payload.
    #[default]
    Absent,
    /// Field was present with an explicit `null`.
    Null,
    /// Field was present with a value.
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    /// "If provided, overwrite": resolves this patch against the stored value.
    pub fn resolve(self, current: Option<T>) -> Option<T> {
        match self {
            Patch::Absent => current,
            Patch::Null => None,
            Patch::Value(v) => Some(v),
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Only reached when the key is present; serde(default) covers Absent.
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Payload {
        #[serde(default)]
        position: Patch<String>,
        #[serde(default)]
        next_touch: Patch<i64>,
    }

    #[test]
    fn test_absent_field_stays_absent() {
        let p: Payload = serde_json::from_str("{}").unwrap();
        assert_eq!(p.position, Patch::Absent);
        assert_eq!(p.next_touch, Patch::Absent);
    }

    #[test]
    fn test_explicit_null_is_not_absent() {
        let p: Payload = serde_json::from_str(r#"{"position": null}"#).unwrap();
        assert_eq!(p.position, Patch::Null);
        assert_eq!(p.next_touch, Patch::Absent);
    }

    #[test]
    fn test_value_is_carried() {
        let p: Payload = serde_json::from_str(r#"{"position": "Advisor"}"#).unwrap();
        assert_eq!(p.position, Patch::Value("Advisor".to_string()));
    }

    #[test]
    fn test_resolve_semantics() {
        let current = Some(7);
        assert_eq!(Patch::Absent.resolve(current), Some(7));
        assert_eq!(Patch::<i32>::Null.resolve(current), None);
        assert_eq!(Patch::Value(9).resolve(current), Some(9));
    }
}
