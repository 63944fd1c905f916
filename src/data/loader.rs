use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use super::model::{Snapshot, VersionId, VersionParseError};

/// Date format of the last `_`-separated segment of a snapshot file name.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read snapshot directory {path}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read snapshot file {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file name '{name}' has no '_DD-MM-YYYY' date suffix")]
    MissingDate { name: String },

    #[error("file name '{name}': '{token}' is not a DD-MM-YYYY date")]
    InvalidDate {
        name: String,
        token: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("{path}: expected a JSON object of version -> non-negative integer")]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path}: malformed version key")]
    InvalidVersion {
        path: PathBuf,
        #[source]
        source: VersionParseError,
    },

    #[error("no .json snapshots found in {0}")]
    NoSnapshots(PathBuf),
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load every `*.json` snapshot directly inside `dir`, sorted by date.
///
/// Files with other extensions are skipped. The first malformed snapshot
/// aborts the whole load; a directory without snapshots is an error too.
pub fn load_dir(dir: &Path) -> Result<Vec<Snapshot>, LoadError> {
    let read_dir_err = |source| LoadError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut snapshots = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_dir_err)? {
        let path = entry.map_err(read_dir_err)?.path();
        if !path.is_file() || !has_json_extension(&path) {
            log::debug!("Skipping {}", path.display());
            continue;
        }
        snapshots.push(load_snapshot(&path)?);
    }

    if snapshots.is_empty() {
        return Err(LoadError::NoSnapshots(dir.to_path_buf()));
    }

    snapshots.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.source.cmp(&b.source)));
    log::info!(
        "Loaded {} snapshots from {} ({} .. {})",
        snapshots.len(),
        dir.display(),
        snapshots[0].date,
        snapshots[snapshots.len() - 1].date
    );
    Ok(snapshots)
}

/// Read one snapshot file. The date comes from the file name, the counts
/// from its JSON body.
pub fn load_snapshot(path: &Path) -> Result<Snapshot, LoadError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let date = parse_snapshot_date(&name)?;

    let text = std::fs::read_to_string(path).map_err(|source| LoadError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let counts = parse_counts(&text).map_err(|e| match e {
        CountsError::Json(source) => LoadError::InvalidJson {
            path: path.to_path_buf(),
            source,
        },
        CountsError::Version(source) => LoadError::InvalidVersion {
            path: path.to_path_buf(),
            source,
        },
    })?;

    log::debug!("{name}: {date}, {} versions", counts.len());
    Ok(Snapshot {
        date,
        source: path.to_path_buf(),
        counts,
    })
}

/// Extract the date from a file name of the form `<prefix>_<DD-MM-YYYY>.json`.
///
/// The date is always the last `_`-separated segment of the stem, so prefixes
/// may themselves contain underscores.
pub fn parse_snapshot_date(file_name: &str) -> Result<NaiveDate, LoadError> {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);

    let token = match stem.rsplit_once('_') {
        Some((_, token)) if !token.is_empty() => token,
        _ => {
            return Err(LoadError::MissingDate {
                name: file_name.to_string(),
            })
        }
    };

    NaiveDate::parse_from_str(token, DATE_FORMAT).map_err(|source| LoadError::InvalidDate {
        name: file_name.to_string(),
        token: token.to_string(),
        source,
    })
}

// ---------------------------------------------------------------------------
// JSON body
// ---------------------------------------------------------------------------

enum CountsError {
    Json(serde_json::Error),
    Version(VersionParseError),
}

/// Expected body:
///
/// ```json
/// { "7.1": 8, "7.2": 0, "8": 15 }
/// ```
#[derive(Debug, Deserialize)]
#[serde(transparent)]
struct SnapshotBody {
    counts: BTreeMap<String, u64>,
}

fn parse_counts(text: &str) -> Result<BTreeMap<VersionId, u64>, CountsError> {
    let body: SnapshotBody = serde_json::from_str(text).map_err(CountsError::Json)?;

    body.counts
        .into_iter()
        .map(|(key, count)| {
            let version = key.parse::<VersionId>().map_err(CountsError::Version)?;
            Ok((version, count))
        })
        .collect()
}

fn has_json_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn date_is_last_underscore_segment() {
        assert_eq!(parse_snapshot_date("repo_01-02-2021.json").unwrap(), ymd(2021, 2, 1));
        assert_eq!(
            parse_snapshot_date("my_big_repo_31-12-2019.json").unwrap(),
            ymd(2019, 12, 31)
        );
    }

    #[test]
    fn missing_date_token_is_an_error() {
        assert!(matches!(
            parse_snapshot_date("results.json"),
            Err(LoadError::MissingDate { .. })
        ));
        assert!(matches!(
            parse_snapshot_date("results_.json"),
            Err(LoadError::MissingDate { .. })
        ));
    }

    #[test]
    fn malformed_date_token_is_an_error() {
        for name in ["repo_2021-02-01.json", "repo_32-01-2021.json", "repo_latest.json"] {
            assert!(
                matches!(parse_snapshot_date(name), Err(LoadError::InvalidDate { .. })),
                "accepted {name}"
            );
        }
    }

    #[test]
    fn loads_and_sorts_by_date() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "repo_01-01-2021.json", r#"{"7.1": 8, "7.2": 8}"#);
        write(dir.path(), "repo_01-01-2020.json", r#"{"7.1": 4, "7.2": 8}"#);
        write(dir.path(), "notes.txt", "not a snapshot");

        let snapshots = load_dir(dir.path()).unwrap();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].date, ymd(2020, 1, 1));
        assert_eq!(snapshots[1].date, ymd(2021, 1, 1));
        assert_eq!(snapshots[0].count(&"7.1".parse().unwrap()), 4);
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "repo_01-01-2020.JSON", r#"{"8": 1}"#);
        assert_eq!(load_dir(dir.path()).unwrap().len(), 1);
    }

    #[test]
    fn invalid_json_aborts_the_load() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "repo_01-01-2020.json", r#"{"7.1": 4}"#);
        write(dir.path(), "repo_01-01-2021.json", "{not json");
        assert!(matches!(load_dir(dir.path()), Err(LoadError::InvalidJson { .. })));
    }

    #[test]
    fn negative_or_fractional_counts_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), "repo_01-01-2020.json", r#"{"7.1": -1}"#);
        assert!(matches!(load_snapshot(&path), Err(LoadError::InvalidJson { .. })));

        let path = write(dir.path(), "repo_02-01-2020.json", r#"{"7.1": 1.5}"#);
        assert!(matches!(load_snapshot(&path), Err(LoadError::InvalidJson { .. })));
    }

    #[test]
    fn malformed_version_key_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), "repo_01-01-2020.json", r#"{"seven": 1}"#);
        assert!(matches!(load_snapshot(&path), Err(LoadError::InvalidVersion { .. })));
    }

    #[test]
    fn padded_version_key_is_rejected_not_merged() {
        let dir = TempDir::new().unwrap();
        let path = write(dir.path(), "repo_01-01-2020.json", r#"{"7.1": 3, " 7.1": 5}"#);
        assert!(matches!(load_snapshot(&path), Err(LoadError::InvalidVersion { .. })));
    }

    #[test]
    fn malformed_file_name_fails_before_reading_body() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "snapshot.json", "{not json");
        assert!(matches!(load_dir(dir.path()), Err(LoadError::MissingDate { .. })));
    }

    #[test]
    fn empty_directory_has_no_snapshots() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "readme.md", "");
        assert!(matches!(load_dir(dir.path()), Err(LoadError::NoSnapshots(_))));
    }

    #[test]
    fn missing_directory_is_a_read_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("Results");
        assert!(matches!(load_dir(&missing), Err(LoadError::ReadDir { .. })));
    }
}
