use eframe::egui::{RichText, Ui};
use egui_plot::{GridMark, Legend, Line, Plot, PlotPoint, PlotPoints};

use crate::data::filter::YearSeries;
use crate::data::model::EvDataset;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Year plot (central panel)
// ---------------------------------------------------------------------------

/// Map a series to plot coordinates.
///
/// With `log` the y value is `log10(value)`; non-positive values have no
/// logarithm and are dropped.
pub fn plot_points(series: &YearSeries, log: bool) -> Vec<[f64; 2]> {
    series
        .iter()
        .filter(|(_, v)| !log || *v > 0.0)
        .map(|&(year, v)| [f64::from(year), if log { v.log10() } else { v }])
        .collect()
}

/// Tick label for the y axis.
fn y_tick(value: f64, log: bool) -> String {
    if log {
        if value.fract() == 0.0 {
            format!("1e{value:.0}")
        } else {
            String::new()
        }
    } else {
        format!("{value}")
    }
}

/// Y axis label: the parameter of a share table, otherwise unit sales.
fn y_axis_label(dataset: Option<&EvDataset>, log: bool) -> String {
    let label = dataset
        .filter(|ds| ds.is_share_table())
        .and_then(|ds| ds.parameters.first().cloned())
        .unwrap_or_else(|| "EV Car Sales".to_string());
    if log {
        format!("{label} (log)")
    } else {
        label
    }
}

/// Render the EV sales chart in the central panel.
///
/// `chart_rect` covers the title and the plot, the area exported as PNG.
pub fn year_plot(ui: &mut Ui, state: &mut AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view EV sales  (File → Open…)");
        });
        return;
    }

    let log = state.log_scale;
    let y_label = y_axis_label(state.dataset.as_ref(), log);
    let chart = ui.vertical(|ui: &mut Ui| {
        if !state.title.is_empty() {
            ui.vertical_centered(|ui: &mut Ui| {
                ui.label(RichText::new(&state.title).size(16.0).strong());
            });
        }

        Plot::new("year_plot")
            .legend(Legend::default())
            .x_axis_label("Year")
            .y_axis_label(y_label)
            .x_axis_formatter(|mark: GridMark, _range| {
                if mark.value.fract() == 0.0 {
                    format!("{:.0}", mark.value)
                } else {
                    String::new()
                }
            })
            .y_axis_formatter(move |mark: GridMark, _range| y_tick(mark.value, log))
            .label_formatter(move |name: &str, point: &PlotPoint| {
                let y = if log { 10f64.powf(point.y) } else { point.y };
                if name.is_empty() {
                    format!("{:.0}: {y:.2}", point.x)
                } else {
                    format!("{name}\n{:.0}: {y:.2}", point.x)
                }
            })
            .allow_boxed_zoom(true)
            .allow_drag(true)
            .allow_scroll(true)
            .allow_zoom(true)
            .show(ui, |plot_ui| {
                for (region, series) in &state.series {
                    let points: PlotPoints = plot_points(series, log).into();
                    let line = Line::new(points)
                        .name(region)
                        .color(state.colors.color_for(region))
                        .width(2.0);
                    plot_ui.line(line);
                }
            });
    });

    state.chart_rect = Some(chart.response.rect);
}

#[cfg(test)]
mod tests {
    use eframe::egui;

    use super::*;
    use crate::data::model::fixtures::{sales, shares};

    #[test]
    fn linear_points_are_unchanged() {
        let series = vec![(2020, 0.0), (2021, 50.0)];
        assert_eq!(
            plot_points(&series, false),
            vec![[2020.0, 0.0], [2021.0, 50.0]]
        );
    }

    #[test]
    fn log_points_drop_non_positive_values() {
        let series = vec![(2020, 0.0), (2021, 100.0), (2022, 1000.0)];
        let points = plot_points(&series, true);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0][0], 2021.0);
        assert!((points[0][1] - 2.0).abs() < 1e-12);
        assert!((points[1][1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn log_ticks_only_at_decades() {
        assert_eq!(y_tick(3.0, true), "1e3");
        assert_eq!(y_tick(2.5, true), "");
        assert_eq!(y_tick(250.0, false), "250");
    }

    #[test]
    fn y_label_follows_table_kind() {
        assert_eq!(y_axis_label(None, false), "EV Car Sales");
        assert_eq!(y_axis_label(Some(&sales()), true), "EV Car Sales (log)");
        assert_eq!(y_axis_label(Some(&shares()), false), "EV sales share");
    }

    #[test]
    fn chart_area_includes_the_title() {
        let mut state = AppState::default();
        state.set_dataset(sales());
        state.title = "EV Sales in different regions".to_string();

        let ctx = egui::Context::default();
        let mut panel_top = None;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                panel_top = Some(ui.max_rect().top());
                year_plot(ui, &mut state);
            });
        });

        let rect = state.chart_rect.unwrap();
        assert_eq!(Some(rect.top()), panel_top);
        assert!(rect.height() > 16.0);
    }
}
