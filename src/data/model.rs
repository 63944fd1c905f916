use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use thiserror::Error;

// ---------------------------------------------------------------------------
// VersionId – a dotted numeric language version ("7.1", "10")
// ---------------------------------------------------------------------------

/// A language version identifier such as `7.1` or `10`.
///
/// Ordered by the numeric value of its dot-separated components, so `7.2`
/// sorts before `7.10`. Identifiers with equal components but different
/// spelling (`8` vs `8.0`) stay distinct and fall back to text order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionId {
    text: String,
    parts: Vec<u64>,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid version identifier '{0}': expected dot-separated integers")]
pub struct VersionParseError(pub String);

impl VersionId {
    /// The identifier exactly as it appeared in the snapshot.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl FromStr for VersionId {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split('.')
            .map(|p| {
                if p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                p.parse::<u64>().ok()
            })
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| VersionParseError(s.to_string()))?;

        Ok(VersionId {
            text: s.to_string(),
            parts,
        })
    }
}

impl PartialOrd for VersionId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parts
            .cmp(&other.parts)
            .then_with(|| self.text.cmp(&other.text))
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

// ---------------------------------------------------------------------------
// Snapshot – one dated input file
// ---------------------------------------------------------------------------

/// Feature counts per version as recorded on one date.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Date encoded in the file name.
    pub date: NaiveDate,
    /// File the snapshot was read from.
    pub source: PathBuf,
    pub counts: BTreeMap<VersionId, u64>,
}

impl Snapshot {
    /// Count for `version`, or 0 when the snapshot never mentions it.
    pub fn count(&self, version: &VersionId) -> u64 {
        self.counts.get(version).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> VersionId {
        s.parse().unwrap()
    }

    #[test]
    fn sorts_numerically_not_lexically() {
        let mut versions = vec![v("7.10"), v("7.2"), v("7.1")];
        versions.sort();
        let names: Vec<&str> = versions.iter().map(VersionId::as_str).collect();
        assert_eq!(names, vec!["7.1", "7.2", "7.10"]);
    }

    #[test]
    fn major_only_versions_interleave() {
        let mut versions = vec![v("10"), v("8"), v("7.3"), v("12"), v("9")];
        versions.sort();
        let names: Vec<&str> = versions.iter().map(VersionId::as_str).collect();
        assert_eq!(names, vec!["7.3", "8", "9", "10", "12"]);
    }

    #[test]
    fn different_spellings_stay_distinct() {
        assert_ne!(v("8"), v("8.0"));
        assert!(v("8") < v("8.0"));
    }

    #[test]
    fn rejects_malformed_identifiers() {
        for bad in ["", "7.", ".1", "7.x", "v7", "7..1", "-1", " 7.1", "7.1 "] {
            assert!(bad.parse::<VersionId>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn missing_version_counts_as_zero() {
        let snapshot = Snapshot {
            date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            source: PathBuf::from("a_01-01-2020.json"),
            counts: BTreeMap::from([(v("7.1"), 3)]),
        };
        assert_eq!(snapshot.count(&v("7.1")), 3);
        assert_eq!(snapshot.count(&v("9")), 0);
    }
}
