//! Still-image rendering of a [`Surface`] with the [`plotters`] crate.
//!
//! PNG goes through the bitmap backend, SVG through the SVG backend; the
//! format is picked from the output file extension.

use std::path::{Path, PathBuf};

use plotters::coord::cartesian::Cartesian3d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use thiserror::Error;

use super::projection::View;
use super::{date_from_decimal_year, Surface, SurfaceRenderer};
use crate::color::Gradient;
use crate::data::loader::DATE_FORMAT;

/// Errors that can occur while writing a plot image.
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("unsupported image format for {0} (expected .png or .svg)")]
    UnsupportedFormat(PathBuf),

    #[error("failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("failed to draw chart elements: {0}")]
    Drawing(String),
}

type Result<T> = core::result::Result<T, PlotError>;

const COLORBAR_WIDTH: u32 = 110;
const COLORBAR_STEPS: i32 = 64;

type Chart3d<'a, DB> =
    ChartContext<'a, DB, Cartesian3d<RangedCoordf64, RangedCoordf64, RangedCoordf64>>;

/// Chart coordinates in plotters order: (time, value, version index).
type Point3 = (f64, f64, f64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "png" => Ok(ImageFormat::Png),
            "svg" => Ok(ImageFormat::Svg),
            _ => Err(PlotError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Writes the surface to a PNG or SVG file.
#[derive(Debug, Clone)]
pub struct ImageRenderer {
    path: PathBuf,
    format: ImageFormat,
    size: (u32, u32),
    view: View,
    gradient: Gradient,
}

impl ImageRenderer {
    pub fn new(path: impl Into<PathBuf>, size: (u32, u32), view: View) -> Result<Self> {
        let path = path.into();
        let format = ImageFormat::from_path(&path)?;
        Ok(ImageRenderer {
            path,
            format,
            size,
            view,
            gradient: Gradient::blues(),
        })
    }

    pub fn write(&self, surface: &Surface) -> Result<()> {
        match self.format {
            ImageFormat::Png => {
                let root = BitMapBackend::new(&self.path, self.size).into_drawing_area();
                self.draw(root, surface)?;
            }
            ImageFormat::Svg => {
                let root = SVGBackend::new(&self.path, self.size).into_drawing_area();
                self.draw(root, surface)?;
            }
        }
        log::info!("Wrote {}", self.path.display());
        Ok(())
    }

    /// Chart with the surface's axis ranges and this renderer's camera.
    fn chart<'a, DB: DrawingBackend>(
        &self,
        area: &'a DrawingArea<DB, Shift>,
        surface: &Surface,
    ) -> Result<Chart3d<'a, DB>> {
        let (x_min, x_max) = surface.x_range();
        let y_max = surface.versions.len().saturating_sub(1).max(1) as f64;

        // plotters' 3D axes: x across, y up, z into the screen. Values go up.
        let mut chart = ChartBuilder::on(area)
            .caption(&surface.title, ("sans-serif", 26))
            .margin(20)
            .build_cartesian_3d(x_min..x_max, 0.0..surface.z_max, 0.0..y_max)
            .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

        let view = self.view;
        chart.with_projection(|mut pb| {
            pb.pitch = (view.elevation as f64).to_radians();
            pb.yaw = (view.azimuth as f64).to_radians();
            pb.scale = 0.8;
            pb.into_matrix()
        });
        Ok(chart)
    }

    fn draw<DB: DrawingBackend>(
        &self,
        root: DrawingArea<DB, Shift>,
        surface: &Surface,
    ) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        let draw_err =
            |e: DrawingAreaErrorKind<DB::ErrorType>| PlotError::Drawing(e.to_string());

        root.fill(&WHITE).map_err(draw_err)?;
        let (width, _) = root.dim_in_pixel();
        let (plot_area, bar_area) =
            root.split_horizontally(width.saturating_sub(COLORBAR_WIDTH) as i32);

        let n_versions = surface.versions.len();
        let mut chart = self.chart(&plot_area, surface)?;

        let time_label = |x: &f64| {
            if (x - x.round()).abs() < 1e-6 {
                format!("{:.0}", x)
            } else {
                date_from_decimal_year(*x)
                    .map(|d| d.format(DATE_FORMAT).to_string())
                    .unwrap_or_default()
            }
        };
        let version_label = |y: &f64| {
            let i = y.round();
            if (y - i).abs() < 1e-6 && i >= 0.0 {
                surface.versions.get(i as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        };
        let value_label = |z: &f64| format!("{:.2}", z);

        chart
            .configure_axes()
            .x_labels(surface.x_ticks.len().clamp(2, 12))
            .y_labels(6)
            .z_labels(n_versions.clamp(2, 24))
            .x_formatter(&time_label)
            .y_formatter(&value_label)
            .z_formatter(&version_label)
            .draw()
            .map_err(draw_err)?;

        if surface.is_degenerate() {
            log::warn!(
                "Surface has {} snapshot(s) and {} version(s); drawing lines instead",
                surface.x.len(),
                n_versions
            );
            let color = self.gradient.rgb_color(1.0);
            for (v, row) in surface.z.iter().enumerate() {
                let points: Vec<Point3> = surface
                    .x
                    .iter()
                    .zip(row)
                    .map(|(&x, &z)| (x, z, v as f64))
                    .collect();
                let line = PathElement::new(points.clone(), color.stroke_width(2));
                chart
                    .draw_series(std::iter::once(line))
                    .map_err(draw_err)?;
                chart
                    .draw_series(points.into_iter().map(|p| Circle::new(p, 3, color.filled())))
                    .map_err(draw_err)?;
            }
        } else {
            let coord = chart.as_coord_spec();
            let cells = quads(surface, |&(x, y, z)| coord.projected_depth(&x, &y, &z));
            chart
                .draw_series(cells.into_iter().map(|(points, t)| {
                    Polygon::new(points, self.gradient.rgb_color(t).mix(0.95).filled())
                }))
                .map_err(draw_err)?;
        }

        plot_area
            .draw(&Text::new(
                format!(
                    "x: {}   y: {}   depth: {}",
                    surface.x_label, surface.z_label, surface.y_label
                ),
                (20, plot_area.dim_in_pixel().1 as i32 - 24),
                ("sans-serif", 15),
            ))
            .map_err(draw_err)?;

        self.draw_colorbar(&bar_area, surface.z_max)?;

        root.present().map_err(draw_err)?;
        Ok(())
    }

    fn draw_colorbar<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        z_max: f64,
    ) -> Result<()>
    where
        DB::ErrorType: 'static,
    {
        let draw_err =
            |e: DrawingAreaErrorKind<DB::ErrorType>| PlotError::Drawing(e.to_string());
        let (_, height) = area.dim_in_pixel();
        let top = height as i32 / 4;
        let bottom = height as i32 * 3 / 4;
        let step = ((bottom - top) / COLORBAR_STEPS).max(1);

        for i in 0..COLORBAR_STEPS {
            let t = 1.0 - i as f64 / (COLORBAR_STEPS - 1) as f64;
            let y0 = top + i * step;
            area.draw(&Rectangle::new(
                [(20, y0), (44, y0 + step)],
                self.gradient.rgb_color(t).filled(),
            ))
            .map_err(draw_err)?;
        }

        let bar_bottom = top + COLORBAR_STEPS * step;
        area.draw(&Rectangle::new([(20, top), (44, bar_bottom)], BLACK.stroke_width(1)))
            .map_err(draw_err)?;
        for (y, value) in [(top, z_max), ((top + bar_bottom) / 2, z_max / 2.0), (bar_bottom, 0.0)] {
            area.draw(&Text::new(format!("{value:.2}"), (50, y - 6), ("sans-serif", 13)))
                .map_err(draw_err)?;
        }
        Ok(())
    }
}

/// Grid cells as polygons with the mean height of their corners (scaled to
/// `[0, 1]`) for colouring. `depth` is the chart's projected depth, larger
/// meaning farther from the viewer; cells come out farthest first so nearer
/// ones are painted over them.
fn quads<F>(surface: &Surface, depth: F) -> Vec<(Vec<Point3>, f64)>
where
    F: Fn(&Point3) -> i32,
{
    let z_max = surface.z_max.max(f64::EPSILON);

    let mut cells = Vec::new();
    for v in 0..surface.versions.len().saturating_sub(1) {
        for s in 0..surface.x.len().saturating_sub(1) {
            let corners = [(v, s), (v, s + 1), (v + 1, s + 1), (v + 1, s)];
            let points: Vec<Point3> = corners
                .iter()
                .map(|&(v, s)| (surface.x[s], surface.value(v, s), v as f64))
                .collect();
            let mean = points.iter().map(|p| p.1).sum::<f64>() / 4.0;
            let cell_depth: i64 = points.iter().map(|p| depth(p) as i64).sum();
            cells.push((cell_depth, points, mean / z_max));
        }
    }

    cells.sort_by(|a, b| b.0.cmp(&a.0));
    cells.into_iter().map(|(_, points, t)| (points, t)).collect()
}

impl SurfaceRenderer for ImageRenderer {
    fn render(&mut self, surface: &Surface) -> anyhow::Result<()> {
        self.write(surface)?;
        Ok(())
    }
}
