use std::path::{Path, PathBuf};

use crate::data::normalize::NormalizeMode;
use crate::pipeline;
use crate::render::image::ImageRenderer;
use crate::render::projection::View;
use crate::render::Surface;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Surface currently shown (None until something loads).
    pub surface: Option<Surface>,

    /// Directory the surface was built from; used by reload and mode changes.
    pub source_dir: Option<PathBuf>,

    /// Normalization applied to the counts.
    pub mode: NormalizeMode,

    /// Title override from the command line.
    pub title: Option<String>,

    /// Camera angles.
    pub view: View,

    /// Pixel size used for image export.
    pub export_size: (u32, u32),

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            surface: None,
            source_dir: None,
            mode: NormalizeMode::default(),
            title: None,
            view: View::default(),
            export_size: (1200, 800),
            status_message: None,
        }
    }
}

impl AppState {
    /// Show an already prepared surface.
    pub fn set_surface(&mut self, surface: Surface) {
        self.surface = Some(surface);
        self.status_message = None;
    }

    /// Re-run the pipeline on `source_dir` with the current mode.
    ///
    /// On failure the previous surface stays on screen and the error is
    /// shown in the status line.
    pub fn reload(&mut self) {
        let Some(dir) = self.source_dir.clone() else {
            self.status_message = Some("No snapshot folder selected".to_string());
            return;
        };

        match pipeline::prepare(&dir, self.mode, self.title.as_deref()) {
            Ok(prepared) => {
                log::info!(
                    "Showing {} versions x {} snapshots from {}",
                    prepared.surface.versions.len(),
                    prepared.surface.x.len(),
                    dir.display()
                );
                self.set_surface(prepared.surface);
            }
            Err(e) => {
                log::error!("Failed to load snapshots: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Switch to another snapshot folder.
    pub fn open_dir(&mut self, dir: PathBuf) {
        self.source_dir = Some(dir);
        self.reload();
    }

    /// Change the normalization and rebuild the surface.
    pub fn set_mode(&mut self, mode: NormalizeMode) {
        if self.mode != mode {
            self.mode = mode;
            self.reload();
        }
    }

    /// Write the current surface to a PNG or SVG file with the current view.
    pub fn export_image(&mut self, path: &Path) {
        let Some(surface) = &self.surface else {
            self.status_message = Some("Nothing to export".to_string());
            return;
        };

        let result = ImageRenderer::new(path, self.export_size, self.view)
            .map_err(anyhow::Error::from)
            .and_then(|renderer| renderer.write(surface).map_err(anyhow::Error::from));

        self.status_message = Some(match result {
            Ok(()) => format!("Exported {}", path.display()),
            Err(e) => {
                log::error!("Export failed: {e:#}");
                format!("Error: {e:#}")
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn snapshot_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a_01-01-2020.json"), r#"{"7.1": 4, "7.2": 8}"#).unwrap();
        std::fs::write(dir.path().join("a_01-01-2021.json"), r#"{"7.1": 8, "7.2": 2}"#).unwrap();
        dir
    }

    #[test]
    fn open_dir_builds_surface() {
        let dir = snapshot_dir();
        let mut state = AppState::default();
        state.open_dir(dir.path().to_path_buf());

        let surface = state.surface.as_ref().unwrap();
        assert_eq!(surface.z, vec![vec![0.5, 1.0], vec![1.0, 0.25]]);
        assert!(state.status_message.is_none());
    }

    #[test]
    fn mode_change_rebuilds_surface() {
        let dir = snapshot_dir();
        let mut state = AppState::default();
        state.open_dir(dir.path().to_path_buf());
        state.set_mode(NormalizeMode::Global);

        let surface = state.surface.as_ref().unwrap();
        assert_eq!(surface.z, vec![vec![0.5, 1.0], vec![1.0, 0.25]]);
        assert_eq!(surface.z_label, "Globally normalized count");

        state.set_mode(NormalizeMode::Raw);
        assert_eq!(state.surface.as_ref().unwrap().z, vec![vec![4.0, 8.0], vec![8.0, 2.0]]);
    }

    #[test]
    fn failed_reload_keeps_previous_surface() {
        let dir = snapshot_dir();
        let mut state = AppState::default();
        state.open_dir(dir.path().to_path_buf());

        std::fs::write(dir.path().join("broken.json"), "{}").unwrap();
        state.reload();

        assert!(state.surface.is_some());
        assert!(state.status_message.as_deref().unwrap().starts_with("Error:"));
    }

    #[test]
    fn reload_without_folder() {
        let mut state = AppState::default();
        state.reload();
        assert!(state.surface.is_none());
        assert!(state.status_message.is_some());
    }

    #[test]
    fn export_needs_a_surface_and_known_format() {
        let dir = snapshot_dir();
        let mut state = AppState::default();
        state.export_image(&dir.path().join("plot.png"));
        assert_eq!(state.status_message.as_deref(), Some("Nothing to export"));

        state.open_dir(dir.path().to_path_buf());
        state.export_image(&dir.path().join("plot.gif"));
        assert!(state.status_message.as_deref().unwrap().starts_with("Error:"));
    }

    #[test]
    fn export_writes_the_current_surface() {
        let dir = snapshot_dir();
        let mut state = AppState::default();
        state.open_dir(dir.path().to_path_buf());

        let path = dir.path().join("plot.svg");
        state.export_image(&path);

        assert!(state.status_message.as_deref().unwrap().starts_with("Exported"));
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains(&state.surface.as_ref().unwrap().title));
    }
}
