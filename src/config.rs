use std::path::PathBuf;

use clap::Parser;

use crate::data::normalize::NormalizeMode;
use crate::render::projection::View;

/// Plot per-version language feature usage across dated snapshots.
#[derive(Parser, Debug, Clone)]
#[command(name = "modernity-plot", version, about)]
pub struct Config {
    /// Directory containing `<prefix>_<DD-MM-YYYY>.json` snapshots.
    #[arg(default_value = "Results")]
    pub dir: PathBuf,

    /// Write the plot to a .png or .svg file instead of opening a window.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// How counts are scaled before plotting.
    #[arg(short, long, value_enum, default_value_t = NormalizeMode::PerVersion)]
    pub normalize: NormalizeMode,

    /// Camera elevation in degrees.
    #[arg(long, default_value_t = 30.0, allow_negative_numbers = true)]
    pub elevation: f32,

    /// Camera azimuth in degrees.
    #[arg(long, default_value_t = 135.0, allow_negative_numbers = true)]
    pub azimuth: f32,

    /// Window / image width in pixels.
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Window / image height in pixels.
    #[arg(long, default_value_t = 800)]
    pub height: u32,

    /// Plot title; defaults to one describing the normalization.
    #[arg(long)]
    pub title: Option<String>,

    /// Also write the raw aggregate table to this CSV file.
    #[arg(long)]
    pub export_csv: Option<PathBuf>,
}

impl Config {
    pub fn view(&self) -> View {
        View::new(self.elevation, self.azimuth)
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
