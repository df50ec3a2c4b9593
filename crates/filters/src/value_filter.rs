//! Value threshold filtering

use propdedup_formats::PropertyRecord;

/// Records must be valued strictly above this amount
pub const VALUE_THRESHOLD: i64 = 400_000;

/// Threshold used by an earlier revision of the valuation policy.
/// Kept only to document the discrepancy; [`VALUE_THRESHOLD`] is the one in force.
pub const LEGACY_VALUE_THRESHOLD: i64 = 40_000;

/// Check if a record's value parses as an integer above `threshold`
///
/// A value that does not parse fails the filter.
pub fn passes_value_threshold(record: &PropertyRecord, threshold: i64) -> bool {
    matches!(record.parsed_value(), Some(value) if value > threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use propdedup_formats::RecordKey;

    fn with_value(value: &str) -> PropertyRecord {
        PropertyRecord::new(RecordKey::new(1, "2020"), "1 MAIN ST", "X", value)
    }

    #[test]
    fn test_strictly_greater() {
        assert!(passes_value_threshold(&with_value("400001"), VALUE_THRESHOLD));
        assert!(!passes_value_threshold(&with_value("400000"), VALUE_THRESHOLD));
        assert!(!passes_value_threshold(&with_value("399999"), VALUE_THRESHOLD));
    }

    #[test]
    fn test_unparseable_value_fails() {
        assert!(!passes_value_threshold(&with_value(""), VALUE_THRESHOLD));
        assert!(!passes_value_threshold(&with_value("500,000"), VALUE_THRESHOLD));
        assert!(!passes_value_threshold(&with_value("500000.50"), VALUE_THRESHOLD));
        assert!(!passes_value_threshold(&with_value(" 500000"), VALUE_THRESHOLD));
    }

    #[test]
    fn test_legacy_threshold_discrepancy() {
        // 50_000 passed under the old policy and fails under the current one
        let record = with_value("50000");
        assert!(passes_value_threshold(&record, LEGACY_VALUE_THRESHOLD));
        assert!(!passes_value_threshold(&record, VALUE_THRESHOLD));
    }
}
