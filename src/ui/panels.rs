use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – chart widgets
// ---------------------------------------------------------------------------

/// Render the left panel: region, powertrain, scale and title widgets.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let dataset = match &state.dataset {
        Some(ds) => ds,
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    // Clone what we need so we can mutate state inside the closures.
    let regions = dataset.regions.clone();
    let powertrains = dataset.powertrains.clone();
    let share_table = dataset.is_share_table();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Powertrain selector ----
            ui.strong("Powertrain");
            let current = state.powertrain.clone().unwrap_or_default();
            ui.add_enabled_ui(!share_table && !powertrains.is_empty(), |ui: &mut Ui| {
                egui::ComboBox::from_id_salt("powertrain")
                    .selected_text(&current)
                    .show_ui(ui, |ui: &mut Ui| {
                        for p in &powertrains {
                            if ui.selectable_label(current == *p, p).clicked() {
                                state.set_powertrain(p.clone());
                            }
                        }
                    });
            });
            if share_table {
                ui.label(RichText::new("Share table: all powertrains").small());
            }
            ui.separator();

            // ---- Scale and title ----
            if ui.checkbox(&mut state.log_scale, "Log scale").changed() {
                log::debug!("Log scale: {}", state.log_scale);
            }
            ui.label("Chart title");
            ui.text_edit_singleline(&mut state.title);
            ui.separator();

            // ---- Region multiselect ----
            let header_text = format!(
                "Regions  ({}/{})",
                state.selected_regions.len(),
                regions.len()
            );
            egui::CollapsingHeader::new(RichText::new(header_text).strong())
                .id_salt("regions")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all_regions();
                        }
                        if ui.small_button("None").clicked() {
                            state.select_no_regions();
                        }
                    });

                    for region in &regions {
                        let mut checked = state.selected_regions.contains(region);
                        let text = RichText::new(region).color(state.colors.color_for(region));
                        if ui.checkbox(&mut checked, text).changed() {
                            state.toggle_region(region);
                        }
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
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let can_export = state.dataset.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export chart PNG…"))
                .clicked()
            {
                save_file_dialog(ui.ctx(), state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} rows loaded, {} plotted",
                ds.len(),
                state.visible_rows
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open EV sales data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        load_into(state, &path);
    }
}

/// Load `path` into the state, reporting failures in the status line.
pub fn load_into(state: &mut AppState, path: &std::path::Path) {
    match crate::data::loader::load_file(path) {
        Ok(dataset) => {
            log::info!(
                "Loaded {} rows, {} regions, years {:?}",
                dataset.len(),
                dataset.regions.len(),
                dataset.year_span()
            );
            state.set_dataset(dataset);
        }
        Err(e) => {
            log::error!("Failed to load {}: {e:#}", path.display());
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

fn save_file_dialog(ctx: &egui::Context, state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export chart")
        .set_file_name("ev_sales.png")
        .add_filter("PNG", &["png"])
        .save_file();

    if let Some(path) = file {
        state.pending_export = Some(path);
        crate::export::request_screenshot(ctx);
    }
}
