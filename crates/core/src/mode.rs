//! Numbered run modes

use crate::dedup::DedupPolicy;
use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Run mode selected by the numeric command-line argument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// 1: keep the last record per key
    KeepLast,
    /// 2: keep the first record per key
    KeepFirst,
    /// 3: drop every key that appears more than once
    KeepNeither,
    /// 4: filter sequentially while ingesting
    FilteredInsert,
    /// 5: deduplicate, then filter in two concurrent halves
    SplitMerge,
}

impl RunMode {
    pub const ALL: [RunMode; 5] = [
        RunMode::KeepLast,
        RunMode::KeepFirst,
        RunMode::KeepNeither,
        RunMode::FilteredInsert,
        RunMode::SplitMerge,
    ];

    pub fn number(&self) -> u8 {
        match self {
            RunMode::KeepLast => 1,
            RunMode::KeepFirst => 2,
            RunMode::KeepNeither => 3,
            RunMode::FilteredInsert => 4,
            RunMode::SplitMerge => 5,
        }
    }

    /// Policy used during ingestion
    ///
    /// Split-merge ingests with `split_policy` and filters afterwards.
    pub fn ingest_policy(&self, split_policy: DedupPolicy) -> DedupPolicy {
        match self {
            RunMode::KeepLast => DedupPolicy::KeepLast,
            RunMode::KeepFirst => DedupPolicy::KeepFirst,
            RunMode::KeepNeither => DedupPolicy::KeepNeither,
            RunMode::FilteredInsert => DedupPolicy::FilteredInsert,
            RunMode::SplitMerge => split_policy,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RunMode::KeepLast => "keep last duplicate",
            RunMode::KeepFirst => "keep first duplicate",
            RunMode::KeepNeither => "drop all duplicates",
            RunMode::FilteredInsert => "filter while ingesting",
            RunMode::SplitMerge => "split, filter concurrently, merge",
        }
    }
}

impl TryFrom<i64> for RunMode {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            1 => Ok(RunMode::KeepLast),
            2 => Ok(RunMode::KeepFirst),
            3 => Ok(RunMode::KeepNeither),
            4 => Ok(RunMode::FilteredInsert),
            5 => Ok(RunMode::SplitMerge),
            other => Err(Error::InvalidMode(format!(
                "{} is not between 1 and 5",
                other
            ))),
        }
    }
}

impl FromStr for RunMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value: i64 = s
            .parse()
            .map_err(|_| Error::InvalidMode(format!("{:?} is not an integer", s)))?;
        RunMode::try_from(value)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.number(), self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_round_trip() {
        for mode in RunMode::ALL {
            assert_eq!(RunMode::try_from(mode.number() as i64).unwrap(), mode);
        }
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(RunMode::try_from(0i64), Err(Error::InvalidMode(_))));
        assert!(matches!(RunMode::try_from(6i64), Err(Error::InvalidMode(_))));
        assert!(matches!(RunMode::try_from(-1i64), Err(Error::InvalidMode(_))));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("4".parse::<RunMode>().unwrap(), RunMode::FilteredInsert);
        assert!(matches!("four".parse::<RunMode>(), Err(Error::InvalidMode(_))));
        assert!(matches!("".parse::<RunMode>(), Err(Error::InvalidMode(_))));
        assert!(matches!("4.0".parse::<RunMode>(), Err(Error::InvalidMode(_))));
    }

    #[test]
    fn test_ingest_policy() {
        assert_eq!(
            RunMode::KeepNeither.ingest_policy(DedupPolicy::KeepFirst),
            DedupPolicy::KeepNeither
        );
        assert_eq!(
            RunMode::SplitMerge.ingest_policy(DedupPolicy::KeepFirst),
            DedupPolicy::KeepFirst
        );
        assert_eq!(
            RunMode::SplitMerge.ingest_policy(DedupPolicy::KeepLast),
            DedupPolicy::KeepLast
        );
    }
}
