use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::normalize::NormalizeMode;
use crate::render::projection::View;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – view controls and plotted values
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("View");
    ui.separator();

    ui.add(egui::Slider::new(&mut state.view.elevation, -90.0..=90.0).text("Elevation"));
    ui.add(egui::Slider::new(&mut state.view.azimuth, 0.0..=360.0).text("Azimuth"));
    if ui.button("Reset view").clicked() {
        state.view = View::default();
    }
    ui.separator();

    // ---- Normalization selector ----
    ui.strong("Normalization");
    let mut mode = state.mode;
    egui::ComboBox::from_id_salt("normalize")
        .selected_text(mode.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            for m in NormalizeMode::ALL {
                ui.selectable_value(&mut mode, m, m.to_string());
            }
        });
    state.set_mode(mode);
    ui.separator();

    ui.heading("Values");
    let Some(surface) = &state.surface else {
        ui.label("No snapshots loaded.");
        return;
    };

    ScrollArea::both()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .column(Column::auto())
                .columns(Column::auto(), surface.columns.len())
                .header(20.0, |mut header| {
                    header.col(|ui| {
                        ui.strong("Version");
                    });
                    for date in &surface.columns {
                        header.col(|ui| {
                            ui.strong(date);
                        });
                    }
                })
                .body(|mut body| {
                    for (v, version) in surface.versions.iter().enumerate() {
                        body.row(18.0, |mut row| {
                            row.col(|ui| {
                                ui.label(version);
                            });
                            for s in 0..surface.columns.len() {
                                row.col(|ui| {
                                    ui.label(format!("{:.2}", surface.value(v, s)));
                                });
                            }
                        });
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open folder…").clicked() {
                open_folder_dialog(state);
                ui.close_menu();
            }
            if ui.button("Export image…").clicked() {
                export_image_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(dir) = &state.source_dir {
            ui.label(dir.display().to_string());
        }
        if let Some(surface) = &state.surface {
            ui.label(format!(
                "{} snapshots, {} versions",
                surface.x.len(),
                surface.versions.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                ui.visuals().text_color()
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_folder_dialog(state: &mut AppState) {
    let mut dialog = rfd::FileDialog::new().set_title("Open snapshot folder");
    if let Some(dir) = &state.source_dir {
        dialog = dialog.set_directory(dir);
    }

    if let Some(dir) = dialog.pick_folder() {
        state.open_dir(dir);
    }
}

pub fn export_image_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export plot")
        .add_filter("PNG image", &["png"])
        .add_filter("SVG image", &["svg"])
        .set_file_name("modernity.png")
        .save_file();

    if let Some(path) = file {
        state.export_image(&path);
    }
}
