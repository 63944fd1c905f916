use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use chrono::NaiveDate;
use clap::Parser;

/// C# language versions with their release dates (year, month).
const VERSIONS: [(&str, i32, u32); 8] = [
    ("7.1", 2017, 8),
    ("7.2", 2017, 11),
    ("7.3", 2018, 5),
    ("8", 2019, 9),
    ("9", 2020, 11),
    ("10", 2021, 11),
    ("11", 2022, 11),
    ("12", 2023, 11),
];

/// Write synthetic feature-usage snapshots for trying out modernity-plot.
#[derive(Parser, Debug)]
struct Args {
    /// Output directory (created if missing).
    #[arg(default_value = "Results")]
    out: PathBuf,

    /// First snapshot year.
    #[arg(long, default_value_t = 2018)]
    from: i32,

    /// Last snapshot year.
    #[arg(long, default_value_t = 2024)]
    to: i32,

    /// File name prefix before the `_DD-MM-YYYY` date.
    #[arg(long, default_value = "analysis")]
    prefix: String,
}

/// Logistic adoption curve: ~0 at release, ~`peak` three years later.
fn adoption(years_since_release: f64, peak: f64) -> f64 {
    peak / (1.0 + (-2.5 * (years_since_release - 1.5)).exp())
}

fn snapshot(date: NaiveDate) -> BTreeMap<&'static str, u64> {
    VERSIONS
        .iter()
        .enumerate()
        .filter_map(|(i, &(version, year, month))| {
            let released = NaiveDate::from_ymd_opt(year, month, 1)?;
            if date < released {
                return None;
            }
            let years = (date - released).num_days() as f64 / 365.25;
            // Older versions carry more features, so they saturate higher.
            let peak = 40.0 + 15.0 * (VERSIONS.len() - i) as f64;
            Some((version, adoption(years, peak).round() as u64))
        })
        .collect()
}

fn main() -> Result<()> {
    let args = Args::parse();
    ensure!(args.from <= args.to, "--from must not be after --to");

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;

    let mut written = 0;
    for year in args.from..=args.to {
        let date = NaiveDate::from_ymd_opt(year, 1, 1).context("year out of range")?;
        let path = args
            .out
            .join(format!("{}_{}.json", args.prefix, date.format("%d-%m-%Y")));
        let body = serde_json::to_string_pretty(&snapshot(date))?;
        std::fs::write(&path, body).with_context(|| format!("writing {}", path.display()))?;
        written += 1;
    }

    println!("Wrote {written} snapshots to {}", args.out.display());
    Ok(())
}
