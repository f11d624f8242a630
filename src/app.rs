use eframe::egui;

use crate::config::DashboardConfig;
use crate::export;
use crate::state::AppState;
use crate::ui::{growth, panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct EvDashboardApp {
    pub state: AppState,
}

impl EvDashboardApp {
    /// Build the app and preload `data_path` when given.
    pub fn new(config: DashboardConfig, data_path: Option<&std::path::Path>) -> Self {
        let mut state = AppState::new(config);
        if let Some(path) = data_path {
            if path.exists() {
                panels::load_into(&mut state, path);
            } else {
                log::warn!("Data file {} not found, starting empty", path.display());
            }
        }
        Self { state }
    }

    /// Write a screenshot delivered this frame to the pending export path.
    fn finish_export(&mut self, ctx: &egui::Context) {
        let Some(shot) = export::take_screenshot(ctx) else {
            return;
        };
        let Some(path) = self.state.pending_export.take() else {
            return;
        };
        match export::save_png(&path, &shot, self.state.chart_rect, ctx.pixels_per_point()) {
            Ok(()) => {
                log::info!("Exported chart to {}", path.display());
                self.state.status_message = None;
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                self.state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

impl eframe::App for EvDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.finish_export(ctx);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: growth calculator and summary ----
        if self.state.dataset.is_some() {
            egui::TopBottomPanel::bottom("growth_panel")
                .resizable(true)
                .default_height(180.0)
                .show(ctx, |ui| {
                    growth::calculator(ui, &mut self.state);
                    ui.separator();
                    growth::summary_table(ui, &self.state);
                });
        }

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::year_plot(ui, &mut self.state);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_startup_file_leaves_app_empty() {
        let app = EvDashboardApp::new(
            DashboardConfig::default(),
            Some(std::path::Path::new("/nonexistent/ev.csv")),
        );
        assert!(app.state.dataset.is_none());
        assert!(app.state.status_message.is_none());
    }
}
