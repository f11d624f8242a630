use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::growth::GrowthOutcome;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Growth calculator
// ---------------------------------------------------------------------------

/// Region / powertrain / year pickers and the resulting report.
pub fn calculator(ui: &mut Ui, state: &mut AppState) {
    let Some(ds) = &state.dataset else {
        return;
    };
    let regions = ds.regions.clone();
    let powertrains = ds.powertrains.clone();
    let share_table = ds.is_share_table();
    let (min_year, max_year) = ds.year_span().unwrap_or_default();

    ui.strong("Growth calculator");
    ui.horizontal_wrapped(|ui: &mut Ui| {
        let form = &mut state.growth_form;

        egui::ComboBox::from_id_salt("growth_region")
            .selected_text(&form.region)
            .show_ui(ui, |ui: &mut Ui| {
                for r in &regions {
                    ui.selectable_value(&mut form.region, r.clone(), r);
                }
            });

        if !share_table {
            egui::ComboBox::from_id_salt("growth_powertrain")
                .selected_text(&form.powertrain)
                .show_ui(ui, |ui: &mut Ui| {
                    for p in &powertrains {
                        ui.selectable_value(&mut form.powertrain, p.clone(), p);
                    }
                });
        }

        ui.label("from");
        ui.add(egui::DragValue::new(&mut form.start_year).range(min_year..=max_year));
        ui.label("to");
        ui.add(egui::DragValue::new(&mut form.end_year).range(min_year..=max_year));

        if ui.button("Compute").clicked() {
            state.compute_growth();
        }
    });

    match &state.growth_form.result {
        Some(Ok(report)) => {
            ui.label(report);
        }
        Some(Err(e)) => {
            ui.label(RichText::new(e.to_string()).color(Color32::RED));
        }
        None => {}
    }
}

// ---------------------------------------------------------------------------
// Summary table
// ---------------------------------------------------------------------------

fn fmt_value(v: f64, share: bool) -> String {
    if share {
        format!("{v:.2}%")
    } else {
        format!("{v:.0}")
    }
}

/// First year, last year and percentage change for every selected region.
pub fn summary_table(ui: &mut Ui, state: &AppState) {
    let Some(ds) = &state.dataset else {
        return;
    };
    let Some((first_year, last_year)) = ds.year_span() else {
        return;
    };
    let share = ds.is_share_table();

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(100.0))
        .column(Column::auto().at_least(90.0))
        .column(Column::auto().at_least(90.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Region");
            });
            header.col(|ui| {
                ui.strong(first_year.to_string());
            });
            header.col(|ui| {
                ui.strong(last_year.to_string());
            });
            header.col(|ui| {
                ui.strong("Change");
            });
        })
        .body(|mut body| {
            for (region, outcome) in &state.summary {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(RichText::new(region).color(state.colors.color_for(region)));
                    });
                    match outcome {
                        Ok(outcome) => {
                            row.col(|ui| {
                                ui.label(fmt_value(outcome.first(), share));
                            });
                            row.col(|ui| {
                                ui.label(fmt_value(outcome.last(), share));
                            });
                            row.col(|ui| {
                                ui.label(match outcome {
                                    GrowthOutcome::Change { percent, .. } => {
                                        format!("{percent:+.2}%")
                                    }
                                    GrowthOutcome::NewMarketEntry { .. } => {
                                        "new market entry".to_string()
                                    }
                                });
                            });
                        }
                        Err(e) => {
                            row.col(|ui| {
                                ui.label("–");
                            });
                            row.col(|ui| {
                                ui.label("–");
                            });
                            row.col(|ui| {
                                ui.label(RichText::new(e.to_string()).small().weak());
                            });
                        }
                    }
                });
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_format_by_table_kind() {
        assert_eq!(fmt_value(1234.4, false), "1234");
        assert_eq!(fmt_value(12.346, true), "12.35%");
    }
}
