//! Backend-neutral surface description and the renderer seam.
//!
//! The data layer never talks to a graphics backend directly: it builds a
//! [`Surface`] and hands it to whichever [`SurfaceRenderer`] the
//! configuration selected.

pub mod image;
pub mod projection;

use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate};

use crate::data::aggregate::AggregateTable;
use crate::data::loader::DATE_FORMAT;
use crate::data::normalize::{NormalizeMode, NormalizedTable};

/// Anything that can show or store a 3D surface.
pub trait SurfaceRenderer {
    fn render(&mut self, surface: &Surface) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Surface
// ---------------------------------------------------------------------------

/// A labelled tick on the time axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub value: f64,
    pub label: String,
}

/// Everything a renderer needs: grid positions, heights and labels.
///
/// Heights are stored `z[version][snapshot]`; versions sit at integer
/// positions `0..versions.len()` on the y axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub z_label: String,
    /// Time of each snapshot as a decimal year.
    pub x: Vec<f64>,
    pub x_ticks: Vec<Tick>,
    /// One label per snapshot (its date).
    pub columns: Vec<String>,
    pub versions: Vec<String>,
    pub z: Vec<Vec<f64>>,
    /// Top of the value axis.
    pub z_max: f64,
}

impl Surface {
    /// Combine the aggregate's axes with the normalized heights.
    pub fn build(
        table: &AggregateTable,
        normalized: &NormalizedTable,
        title: Option<&str>,
    ) -> Self {
        let (default_title, z_label) = match normalized.mode {
            NormalizeMode::PerVersion => (
                "Max normalized feature usage across years and versions",
                "Normalized count",
            ),
            NormalizeMode::Global => (
                "Globally normalized feature usage across years and versions",
                "Globally normalized count",
            ),
            NormalizeMode::Raw => ("Feature usage across years and versions", "Feature count"),
        };

        Surface {
            title: title.unwrap_or(default_title).to_string(),
            x_label: "Year".to_string(),
            y_label: "Version".to_string(),
            z_label: z_label.to_string(),
            x: table.dates.iter().copied().map(decimal_year).collect(),
            x_ticks: time_ticks(&table.dates),
            columns: table
                .dates
                .iter()
                .map(|d| d.format(DATE_FORMAT).to_string())
                .collect(),
            versions: table.versions.iter().map(ToString::to_string).collect(),
            z: normalized.values.clone(),
            z_max: normalized.z_max(),
        }
    }

    /// Smallest and largest time value; a single snapshot is padded by half
    /// a year on each side so axes keep a nonzero extent.
    pub fn x_range(&self) -> (f64, f64) {
        let min = self.x.iter().copied().fold(f64::INFINITY, f64::min);
        let max = self.x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !min.is_finite() || !max.is_finite() {
            return (0.0, 1.0);
        }
        if (max - min).abs() < f64::EPSILON {
            (min - 0.5, max + 0.5)
        } else {
            (min, max)
        }
    }

    /// A surface needs at least two snapshots and two versions to span an
    /// area; otherwise renderers fall back to lines.
    pub fn is_degenerate(&self) -> bool {
        self.x.len() < 2 || self.versions.len() < 2
    }

    pub fn value(&self, version: usize, snapshot: usize) -> f64 {
        self.z
            .get(version)
            .and_then(|row| row.get(snapshot))
            .copied()
            .unwrap_or(0.0)
    }
}

// ---------------------------------------------------------------------------
// Time axis helpers
// ---------------------------------------------------------------------------

fn days_in_year(year: i32) -> u32 {
    NaiveDate::from_ymd_opt(year, 12, 31).map_or(365, |d| d.ordinal())
}

/// `2020-07-02` → `2020.5`: the year plus the elapsed fraction of it.
pub fn decimal_year(date: NaiveDate) -> f64 {
    date.year() as f64 + date.ordinal0() as f64 / days_in_year(date.year()) as f64
}

/// Inverse of [`decimal_year`], rounded to the nearest day.
pub fn date_from_decimal_year(value: f64) -> Option<NaiveDate> {
    if !value.is_finite() {
        return None;
    }
    let year = value.floor() as i32;
    let day = ((value - year as f64) * days_in_year(year) as f64).round() as i64;
    NaiveDate::from_ymd_opt(year, 1, 1)?.checked_add_signed(Duration::days(day))
}

/// One tick per 1st of January inside the data range. When fewer than two
/// year boundaries fall in range, every snapshot gets its own dated tick.
pub fn time_ticks(dates: &[NaiveDate]) -> Vec<Tick> {
    let (Some(first), Some(last)) = (dates.iter().min(), dates.iter().max()) else {
        return Vec::new();
    };

    let first_year = if first.ordinal0() == 0 {
        first.year()
    } else {
        first.year() + 1
    };
    let years: Vec<Tick> = (first_year..=last.year())
        .map(|y| Tick {
            value: y as f64,
            label: y.to_string(),
        })
        .collect();
    if years.len() >= 2 {
        return years;
    }

    let mut ticks: Vec<Tick> = Vec::with_capacity(dates.len());
    for date in dates {
        let value = decimal_year(*date);
        if ticks.last().is_some_and(|t| t.value == value) {
            continue;
        }
        ticks.push(Tick {
            value,
            label: date.format(DATE_FORMAT).to_string(),
        });
    }
    ticks
}
