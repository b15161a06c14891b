//! Per-block contact id allocation.
//!
//! External contact ids are `{BLOCK_CODE}-{NNN}`: the block's unique code,
//! a dash, and a monotonically increasing number zero-padded to three digits.
//! The highest existing suffix is resolved by numeric ordering, so blocks
//! past 999 contacts keep allocating correctly ("GOV-999" → "GOV-1000").

/// Parses the numeric suffix of a contact id. Returns `None` if the id does
/// not end in `-<digits>`.
pub fn numeric_suffix(contact_id: &str) -> Option<u32> {
    contact_id.rsplit_once('-')?.1.parse().ok()
}

/// Formats the next contact id for a block given the current highest id.
pub fn next_contact_id(block_code: &str, highest: Option<&str>) -> String {
    let next = highest
        .and_then(numeric_suffix)
        .map(|n| n + 1)
        .unwrap_or(1);
    format!("{block_code}-{next:03}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_id_in_block() {
        assert_eq!(next_contact_id("GOV", None), "GOV-001");
    }

    #[test]
    fn test_increments_from_highest() {
        assert_eq!(next_contact_id("GOV", Some("GOV-001")), "GOV-002");
        assert_eq!(next_contact_id("GOV", Some("GOV-041")), "GOV-042");
    }

    #[test]
    fn test_zero_padding_drops_past_three_digits() {
        assert_eq!(next_contact_id("GOV", Some("GOV-999")), "GOV-1000");
        assert_eq!(next_contact_id("GOV", Some("GOV-1000")), "GOV-1001");
    }

    #[test]
    fn test_suffix_parsing() {
        assert_eq!(numeric_suffix("GOV-007"), Some(7));
        assert_eq!(numeric_suffix("A1-123"), Some(123));
        assert_eq!(numeric_suffix("GOV-1000"), Some(1000));
        assert_eq!(numeric_suffix("GOV"), None);
        assert_eq!(numeric_suffix("GOV-xyz"), None);
    }

    #[test]
    fn test_sequential_allocation_never_repeats() {
        let mut last: Option<String> = None;
        for expected in ["B2-001", "B2-002", "B2-003"] {
            let id = next_contact_id("B2", last.as_deref());
            assert_eq!(id, expected);
            last = Some(id);
        }
    }

    #[test]
    fn test_codes_with_digits() {
        assert_eq!(next_contact_id("A1", Some("A1-009")), "A1-010");
    }
}
