//! Record data structures for property valuation rows

use std::fmt;

/// Identity of a property valuation: numeric id plus valuation date
///
/// Two records with the same key are duplicates regardless of their
/// address, town or value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey {
    id: i64,
    valuation_date: String,
}

impl RecordKey {
    /// Create a new key
    pub fn new(id: i64, valuation_date: impl Into<String>) -> Self {
        Self {
            id,
            valuation_date: valuation_date.into(),
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn valuation_date(&self) -> &str {
        &self.valuation_date
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.id, self.valuation_date)
    }
}

/// A single property valuation row
///
/// The value is kept as the raw text from the input. Filters that need a
/// number parse it on demand via [`PropertyRecord::parsed_value`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRecord {
    pub key: RecordKey,
    pub address: String,
    pub town: String,
    pub value: String,
}

impl PropertyRecord {
    /// Create a new record
    pub fn new(
        key: RecordKey,
        address: impl Into<String>,
        town: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            key,
            address: address.into(),
            town: town.into(),
            value: value.into(),
        }
    }

    pub fn id(&self) -> i64 {
        self.key.id()
    }

    pub fn valuation_date(&self) -> &str {
        self.key.valuation_date()
    }

    /// Parse the value text as an integer, `None` if it is not one
    pub fn parsed_value(&self) -> Option<i64> {
        self.value.parse().ok()
    }
}

/// Space-separated output line: id, address, town, valuation date, value
impl fmt::Display for PropertyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.key.id, self.address, self.town, self.key.valuation_date, self.value
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_equality_ignores_other_fields() {
        let a = PropertyRecord::new(RecordKey::new(5, "2021"), "1 ELM ST", "X", "100");
        let b = PropertyRecord::new(RecordKey::new(5, "2021"), "9 OAK RD", "Y", "200");

        assert_eq!(a.key, b.key);
        assert_ne!(a, b);
    }

    #[test]
    fn test_key_distinguishes_dates() {
        assert_ne!(RecordKey::new(5, "2021"), RecordKey::new(5, "2022"));
        assert_ne!(RecordKey::new(5, "2021"), RecordKey::new(6, "2021"));
    }

    #[test]
    fn test_parsed_value() {
        let record = PropertyRecord::new(RecordKey::new(1, "2020"), "A", "B", "500000");
        assert_eq!(record.parsed_value(), Some(500_000));

        let bad = PropertyRecord::new(RecordKey::new(1, "2020"), "A", "B", "$500,000");
        assert_eq!(bad.parsed_value(), None);
    }

    #[test]
    fn test_display_field_order() {
        let record = PropertyRecord::new(RecordKey::new(2, "2020"), "20 OAK ST", "X", "500000");
        assert_eq!(record.to_string(), "2 20 OAK ST X 2020 500000");
    }
}
