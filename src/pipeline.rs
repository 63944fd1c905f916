use std::path::Path;

use anyhow::{Context, Result};

use crate::app::WindowRenderer;
use crate::config::Config;
use crate::data::aggregate::AggregateTable;
use crate::data::loader;
use crate::data::normalize::{normalize, NormalizeMode, NormalizedTable};
use crate::render::image::ImageRenderer;
use crate::render::{Surface, SurfaceRenderer};

/// Output of the data stages, ready to hand to a renderer.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub table: AggregateTable,
    pub normalized: NormalizedTable,
    pub surface: Surface,
}

/// Load → aggregate → normalize → surface. Nothing is drawn here.
pub fn prepare(dir: &Path, mode: NormalizeMode, title: Option<&str>) -> Result<Prepared> {
    let snapshots = loader::load_dir(dir)
        .with_context(|| format!("loading snapshots from {}", dir.display()))?;

    let table = AggregateTable::from_snapshots(&snapshots);
    let (n_versions, n_snapshots) = table.shape();
    log::info!("Aggregated {n_versions} versions x {n_snapshots} snapshots");

    let normalized = normalize(&table, mode);
    let surface = Surface::build(&table, &normalized, title);

    Ok(Prepared {
        table,
        normalized,
        surface,
    })
}

/// Pick the renderer the configuration asks for.
pub fn renderer(config: &Config) -> Result<Box<dyn SurfaceRenderer>> {
    let renderer: Box<dyn SurfaceRenderer> = match &config.output {
        Some(path) => Box::new(
            ImageRenderer::new(path, config.size(), config.view())
                .with_context(|| format!("preparing output {}", path.display()))?,
        ),
        None => Box::new(WindowRenderer::new(config)),
    };
    Ok(renderer)
}

/// Full run: prepare the data, export the table if requested, render.
pub fn run(config: &Config) -> Result<()> {
    // Resolve the renderer first so a bad --output fails before any loading.
    let mut renderer = renderer(config)?;

    let prepared = prepare(&config.dir, config.normalize, config.title.as_deref())?;

    if let Some(csv_path) = &config.export_csv {
        prepared.table.write_csv(csv_path)?;
    }

    renderer.render(&prepared.surface)
}
