//! Aggregate statistics over active watchlist entries.

use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct WatchlistStatistics {
    pub total: i64,
    pub requires_check: i64,
    pub by_risk_level: BTreeMap<String, i64>,
    pub by_risk_sphere: BTreeMap<String, i64>,
    pub by_monitoring_frequency: BTreeMap<String, i64>,
}

/// Folds `(key, count)` rows into an ordered map. NULL group keys arrive as
/// `None` and are reported under "unspecified".
pub fn fold_counts(rows: Vec<(Option<String>, i64)>) -> BTreeMap<String, i64> {
    let mut map = BTreeMap::new();
    for (key, count) in rows {
        let key = key.unwrap_or_else(|| "unspecified".to_string());
        *map.entry(key).or_insert(0) += count;
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::watchlist::RiskLevel;

    #[test]
    fn test_fold_counts_groups_and_sums() {
        let rows = vec![
            (Some("high".to_string()), 3),
            (Some("low".to_string()), 1),
            (Some("high".to_string()), 2),
        ];
        let map = fold_counts(rows);
        assert_eq!(map.get("high"), Some(&5));
        assert_eq!(map.get("low"), Some(&1));
    }

    #[test]
    fn test_fold_counts_null_key_bucket() {
        let map = fold_counts(vec![(None, 4)]);
        assert_eq!(map.get("unspecified"), Some(&4));
    }

    #[test]
    fn test_risk_level_ordering_highest_last_in_declaration() {
        // SQL `risk_level DESC` relies on declaration order matching severity.
        assert!(RiskLevel::Critical > RiskLevel::High);
        assert!(RiskLevel::High > RiskLevel::Medium);
        assert!(RiskLevel::Medium > RiskLevel::Low);
    }
}
