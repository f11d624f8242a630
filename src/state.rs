use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use eframe::egui::Rect;

use crate::color::RegionColors;
use crate::config::DashboardConfig;
use crate::data::filter::{YearSeries, filter_regions, year_series};
use crate::data::growth::{GrowthOutcome, share_growth, span_summary, vehicle_growth};
use crate::data::model::EvDataset;
use crate::error::EvError;

// ---------------------------------------------------------------------------
// Growth calculator inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct GrowthForm {
    pub region: String,
    pub powertrain: String,
    pub start_year: i32,
    pub end_year: i32,
    /// Last report sentence, or the validation error.
    pub result: Option<Result<String, EvError>>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<EvDataset>,

    // ---- Chart widgets ----
    pub selected_regions: BTreeSet<String>,
    pub powertrain: Option<String>,
    pub log_scale: bool,
    pub title: String,

    /// Per-region lines for the current selection (cached).
    pub series: BTreeMap<String, YearSeries>,
    /// Number of rows behind `series`.
    pub visible_rows: usize,
    pub colors: RegionColors,

    /// Growth of each selected region over the full year span (cached).
    pub summary: Vec<(String, Result<GrowthOutcome, EvError>)>,

    pub growth_form: GrowthForm,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Destination of a requested chart screenshot.
    pub pending_export: Option<PathBuf>,

    /// Screen area of the chart in the last frame.
    pub chart_rect: Option<Rect>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            log_scale: config.log_scale,
            title: config.title.clone(),
            config,
            dataset: None,
            selected_regions: BTreeSet::new(),
            powertrain: None,
            series: BTreeMap::new(),
            visible_rows: 0,
            colors: RegionColors::default(),
            summary: Vec::new(),
            growth_form: GrowthForm::default(),
            status_message: None,
            pending_export: None,
            chart_rect: None,
        }
    }

    /// Ingest a newly loaded dataset and reset the widgets to their defaults.
    pub fn set_dataset(&mut self, dataset: EvDataset) {
        self.selected_regions = dataset.default_regions(&self.config.default_regions);

        self.powertrain = if dataset.powertrains.contains(&self.config.default_powertrain) {
            Some(self.config.default_powertrain.clone())
        } else {
            dataset.powertrains.first().cloned()
        };

        self.colors = RegionColors::new(&dataset.regions);

        let (first, last) = dataset.year_span().unwrap_or_default();
        self.growth_form = GrowthForm {
            region: self
                .selected_regions
                .first()
                .or(dataset.regions.first())
                .cloned()
                .unwrap_or_default(),
            powertrain: self.powertrain.clone().unwrap_or_default(),
            start_year: first,
            end_year: last,
            result: None,
        };

        self.status_message = if dataset.is_empty() {
            Some("The loaded file contains no rows.".to_string())
        } else {
            None
        };
        self.dataset = Some(dataset);
        self.refilter();
    }

    /// Recompute the chart series and summary after a widget change.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        let rows = filter_regions(
            ds,
            &self.selected_regions,
            self.powertrain.as_deref(),
            self.config.eu27_members,
        );
        self.visible_rows = rows.len();
        self.series = year_series(&rows);
        self.summary = span_summary(ds, &self.selected_regions, self.powertrain.as_deref());
        log::debug!(
            "Refiltered: {} rows, {} series",
            self.visible_rows,
            self.series.len()
        );
    }

    pub fn toggle_region(&mut self, region: &str) {
        if !self.selected_regions.remove(region) {
            self.selected_regions.insert(region.to_string());
        }
        self.refilter();
    }

    pub fn select_all_regions(&mut self) {
        if let Some(ds) = &self.dataset {
            self.selected_regions = ds.regions.clone();
            self.refilter();
        }
    }

    pub fn select_no_regions(&mut self) {
        self.selected_regions.clear();
        self.refilter();
    }

    pub fn set_powertrain(&mut self, powertrain: String) {
        self.powertrain = Some(powertrain);
        self.refilter();
    }

    /// Run the growth calculator with the current form inputs.
    pub fn compute_growth(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        let form = &self.growth_form;
        let result = if ds.is_share_table() {
            share_growth(ds, &form.region, form.start_year, form.end_year).map(|g| g.to_string())
        } else {
            vehicle_growth(
                ds,
                &form.powertrain,
                &form.region,
                form.start_year,
                form.end_year,
            )
            .map(|g| g.to_string())
        };
        if let Ok(report) = &result {
            log::info!("{report}");
        }
        self.growth_form.result = Some(result);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}
