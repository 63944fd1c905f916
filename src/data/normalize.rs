use std::fmt;

use super::aggregate::AggregateTable;

/// How raw counts are scaled before plotting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum NormalizeMode {
    /// Each version divided by its own maximum across snapshots.
    #[default]
    PerVersion,
    /// Whole table divided by its largest count.
    Global,
    /// Raw counts.
    #[value(name = "none")]
    Raw,
}

impl NormalizeMode {
    pub const ALL: [NormalizeMode; 3] = [
        NormalizeMode::PerVersion,
        NormalizeMode::Global,
        NormalizeMode::Raw,
    ];
}

impl fmt::Display for NormalizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizeMode::PerVersion => write!(f, "Per version"),
            NormalizeMode::Global => write!(f, "Global"),
            NormalizeMode::Raw => write!(f, "Raw counts"),
        }
    }
}

/// Scaled copy of an [`AggregateTable`], same `[version][snapshot]` layout.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    pub mode: NormalizeMode,
    pub values: Vec<Vec<f64>>,
}

impl NormalizedTable {
    /// Upper bound of the value axis when plotting this table.
    pub fn z_max(&self) -> f64 {
        match self.mode {
            NormalizeMode::PerVersion | NormalizeMode::Global => 1.0,
            NormalizeMode::Raw => self
                .values
                .iter()
                .flatten()
                .copied()
                .fold(1.0, f64::max),
        }
    }
}

/// Scale `table` according to `mode`.
///
/// A zero maximum leaves the affected values at zero. This is a one-shot
/// transform: it always divides the raw counts, never previous output.
pub fn normalize(table: &AggregateTable, mode: NormalizeMode) -> NormalizedTable {
    let divisors: Vec<u64> = match mode {
        NormalizeMode::PerVersion => table.row_maxima(),
        NormalizeMode::Global => vec![table.global_max(); table.versions.len()],
        NormalizeMode::Raw => vec![1; table.versions.len()],
    };

    let values = table
        .values
        .iter()
        .zip(divisors)
        .map(|(row, max)| {
            row.iter()
                .map(|&count| if max == 0 { 0.0 } else { count as f64 / max as f64 })
                .collect()
        })
        .collect();

    NormalizedTable { mode, values }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn table(values: Vec<Vec<u64>>) -> AggregateTable {
        let n_dates = values.first().map_or(0, Vec::len);
        AggregateTable {
            versions: (0..values.len())
                .map(|i| format!("7.{}", i + 1).parse().unwrap())
                .collect(),
            dates: (0..n_dates)
                .map(|i| NaiveDate::from_ymd_opt(2015 + i as i32, 1, 1).unwrap())
                .collect(),
            values,
        }
    }

    #[test]
    fn per_version_scenario() {
        let normalized = normalize(&table(vec![vec![4, 8], vec![8, 8]]), NormalizeMode::PerVersion);
        assert_eq!(normalized.values, vec![vec![0.5, 1.0], vec![1.0, 1.0]]);
    }

    #[test]
    fn per_version_max_becomes_exactly_one() {
        let normalized = normalize(
            &table(vec![vec![3, 7, 5], vec![0, 2, 9], vec![11, 1, 0]]),
            NormalizeMode::PerVersion,
        );
        for row in &normalized.values {
            assert!(row.iter().all(|v| (0.0..=1.0).contains(v)));
            assert_eq!(row.iter().copied().fold(f64::MIN, f64::max), 1.0);
        }
    }

    #[test]
    fn all_zero_row_stays_zero() {
        let normalized = normalize(&table(vec![vec![0, 0], vec![2, 4]]), NormalizeMode::PerVersion);
        assert_eq!(normalized.values[0], vec![0.0, 0.0]);
        assert_eq!(normalized.values[1], vec![0.5, 1.0]);
    }

    #[test]
    fn global_divides_by_table_max() {
        let normalized = normalize(&table(vec![vec![4, 8], vec![2, 1]]), NormalizeMode::Global);
        assert_eq!(normalized.values, vec![vec![0.5, 1.0], vec![0.25, 0.125]]);
        assert_eq!(normalized.z_max(), 1.0);
    }

    #[test]
    fn global_all_zero_table_stays_zero() {
        let normalized = normalize(&table(vec![vec![0, 0], vec![0, 0]]), NormalizeMode::Global);
        assert!(normalized.values.iter().flatten().all(|&v| v == 0.0));
    }

    #[test]
    fn raw_mode_keeps_counts() {
        let normalized = normalize(&table(vec![vec![4, 8], vec![0, 3]]), NormalizeMode::Raw);
        assert_eq!(normalized.values, vec![vec![4.0, 8.0], vec![0.0, 3.0]]);
        assert_eq!(normalized.z_max(), 8.0);
    }

    #[test]
    fn empty_table() {
        let normalized = normalize(&table(Vec::new()), NormalizeMode::PerVersion);
        assert!(normalized.values.is_empty());
    }
}
