use anyhow::{anyhow, Result};
use eframe::egui;

use crate::config::Config;
use crate::render::{Surface, SurfaceRenderer};
use crate::state::AppState;
use crate::ui::{panels, plot};

const APP_NAME: &str = "Modernity Plot – Feature Usage Viewer";

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ModernityApp {
    pub state: AppState,
}

impl eframe::App for ModernityApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: view + values ----
        egui::SidePanel::left("side_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: surface ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::surface_plot(ui, &mut self.state);
        });
    }
}

// ---------------------------------------------------------------------------
// Window renderer
// ---------------------------------------------------------------------------

/// Shows the surface in an interactive window and blocks until it closes.
pub struct WindowRenderer {
    state: Option<AppState>,
    size: [f32; 2],
}

impl WindowRenderer {
    pub fn new(config: &Config) -> Self {
        let state = AppState {
            source_dir: Some(config.dir.clone()),
            mode: config.normalize,
            title: config.title.clone(),
            view: config.view(),
            export_size: config.size(),
            ..AppState::default()
        };
        WindowRenderer {
            state: Some(state),
            size: [config.width as f32, config.height as f32],
        }
    }
}

impl SurfaceRenderer for WindowRenderer {
    fn render(&mut self, surface: &Surface) -> Result<()> {
        let mut state = self.state.take().unwrap_or_default();
        state.set_surface(surface.clone());

        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size(self.size)
                .with_min_inner_size([600.0, 400.0]),
            ..Default::default()
        };

        eframe::run_native(
            APP_NAME,
            options,
            Box::new(|_cc| Ok(Box::new(ModernityApp { state }))),
        )
        .map_err(|e| anyhow!("plot window failed: {e}"))
    }
}
