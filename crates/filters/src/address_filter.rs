//! Address suffix exclusion

use propdedup_formats::PropertyRecord;

/// Street-type suffixes whose properties are excluded
pub const EXCLUDED_SUFFIXES: [&str; 3] = ["AVE", "CRES", "PL"];

/// Check that the address does not end with any of `suffixes`
///
/// Matching is case-sensitive and the address is not trimmed.
pub fn passes_suffix_filter(record: &PropertyRecord, suffixes: &[&str]) -> bool {
    !suffixes
        .iter()
        .any(|suffix| record.address.ends_with(suffix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use propdedup_formats::RecordKey;

    fn at(address: &str) -> PropertyRecord {
        PropertyRecord::new(RecordKey::new(1, "2020"), address, "X", "500000")
    }

    #[test]
    fn test_excluded_suffixes() {
        assert!(!passes_suffix_filter(&at("10 MAIN AVE"), &EXCLUDED_SUFFIXES));
        assert!(!passes_suffix_filter(&at("4 MAPLE CRES"), &EXCLUDED_SUFFIXES));
        assert!(!passes_suffix_filter(&at("9 BIRCH PL"), &EXCLUDED_SUFFIXES));
        assert!(passes_suffix_filter(&at("20 OAK ST"), &EXCLUDED_SUFFIXES));
    }

    #[test]
    fn test_case_sensitive() {
        assert!(passes_suffix_filter(&at("10 Main Ave"), &EXCLUDED_SUFFIXES));
        assert!(passes_suffix_filter(&at("9 birch pl"), &EXCLUDED_SUFFIXES));
    }

    #[test]
    fn test_no_trimming() {
        assert!(passes_suffix_filter(&at("10 MAIN AVE "), &EXCLUDED_SUFFIXES));
    }

    #[test]
    fn test_suffix_not_word_bounded() {
        // plain suffix match, not a street-type word match
        assert!(passes_suffix_filter(&at("1 STAPLE"), &EXCLUDED_SUFFIXES));
        assert!(!passes_suffix_filter(&at("1 CHAPL"), &EXCLUDED_SUFFIXES));
        assert!(!passes_suffix_filter(&at("1 CAVE"), &EXCLUDED_SUFFIXES));
    }
}
