use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use super::loader::DATE_FORMAT;
use super::model::{Snapshot, VersionId};

// ---------------------------------------------------------------------------
// AggregateTable – raw counts indexed by [version][snapshot]
// ---------------------------------------------------------------------------

/// Raw feature counts of every observed version across all snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateTable {
    /// Union of all versions, ascending.
    pub versions: Vec<VersionId>,
    /// Snapshot dates, in snapshot order.
    pub dates: Vec<NaiveDate>,
    /// `values[version][snapshot]`; absent pairs are 0.
    pub values: Vec<Vec<u64>>,
}

impl AggregateTable {
    /// Merge snapshots (already in display order) into one table.
    ///
    /// The version set is the union over all snapshots, so a version that
    /// first appears in a later snapshot still gets a row.
    pub fn from_snapshots(snapshots: &[Snapshot]) -> Self {
        let versions: Vec<VersionId> = snapshots
            .iter()
            .flat_map(|s| s.counts.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let values = versions
            .iter()
            .map(|v| snapshots.iter().map(|s| s.count(v)).collect())
            .collect();

        AggregateTable {
            versions,
            dates: snapshots.iter().map(|s| s.date).collect(),
            values,
        }
    }

    /// `(versions, snapshots)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.versions.len(), self.dates.len())
    }

    /// Largest count of each version across all snapshots.
    pub fn row_maxima(&self) -> Vec<u64> {
        self.values
            .iter()
            .map(|row| row.iter().copied().max().unwrap_or(0))
            .collect()
    }

    pub fn global_max(&self) -> u64 {
        self.row_maxima().into_iter().max().unwrap_or(0)
    }

    /// Write the table as CSV: a `version` column followed by one column per
    /// snapshot date.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("creating {}", path.display()))?;

        let mut header = vec!["version".to_string()];
        header.extend(self.dates.iter().map(|d| d.format(DATE_FORMAT).to_string()));
        writer.write_record(&header).context("writing CSV header")?;

        for (version, row) in self.versions.iter().zip(&self.values) {
            let mut record = vec![version.to_string()];
            record.extend(row.iter().map(u64::to_string));
            writer
                .write_record(&record)
                .with_context(|| format!("writing CSV row for {version}"))?;
        }

        writer.flush().context("flushing CSV")?;
        log::info!("Wrote aggregate table to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use super::*;

    fn snapshot(date: (i32, u32, u32), counts: &[(&str, u64)]) -> Snapshot {
        Snapshot {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            source: PathBuf::new(),
            counts: counts
                .iter()
                .map(|(v, c)| (v.parse().unwrap(), *c))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn labels(table: &AggregateTable) -> Vec<&str> {
        table.versions.iter().map(VersionId::as_str).collect()
    }

    #[test]
    fn two_snapshot_scenario() {
        let table = AggregateTable::from_snapshots(&[
            snapshot((2020, 1, 1), &[("7.1", 4), ("7.2", 8)]),
            snapshot((2021, 1, 1), &[("7.1", 8), ("7.2", 8)]),
        ]);
        assert_eq!(labels(&table), vec!["7.1", "7.2"]);
        assert_eq!(table.values, vec![vec![4, 8], vec![8, 8]]);
    }

    #[test]
    fn versions_are_unioned_and_sorted() {
        let table = AggregateTable::from_snapshots(&[
            snapshot((2019, 1, 1), &[("7.10", 1), ("7.2", 2)]),
            snapshot((2020, 1, 1), &[("7.1", 3)]),
            snapshot((2021, 1, 1), &[("12", 5), ("7.2", 1)]),
        ]);
        assert_eq!(labels(&table), vec!["7.1", "7.2", "7.10", "12"]);
        assert_eq!(table.shape(), (4, 3));
    }

    #[test]
    fn absent_versions_are_zero() {
        let table = AggregateTable::from_snapshots(&[
            snapshot((2019, 1, 1), &[("7.1", 1)]),
            snapshot((2020, 1, 1), &[("9", 7)]),
        ]);
        // versions: 7.1, 9
        assert_eq!(table.values, vec![vec![1, 0], vec![0, 7]]);
    }

    #[test]
    fn shape_matches_versions_by_snapshots() {
        let snapshots: Vec<Snapshot> = (0..5)
            .map(|i| snapshot((2015 + i, 6, 1), &[("7.1", i as u64), ("8", 1)]))
            .collect();
        let table = AggregateTable::from_snapshots(&snapshots);
        assert_eq!(table.shape(), (2, 5));
        assert!(table.values.iter().all(|row| row.len() == 5));
    }

    #[test]
    fn maxima() {
        let table = AggregateTable::from_snapshots(&[
            snapshot((2019, 1, 1), &[("7.1", 4), ("8", 0)]),
            snapshot((2020, 1, 1), &[("7.1", 2), ("8", 0)]),
        ]);
        assert_eq!(table.row_maxima(), vec![4, 0]);
        assert_eq!(table.global_max(), 4);
    }

    #[test]
    fn csv_export() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("table.csv");
        let table = AggregateTable::from_snapshots(&[
            snapshot((2020, 1, 1), &[("7.1", 4), ("7.2", 8)]),
            snapshot((2021, 1, 1), &[("7.1", 8)]),
        ]);
        table.write_csv(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["version,01-01-2020,01-01-2021", "7.1,4,8", "7.2,8,0"]);
    }
}
