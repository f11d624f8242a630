use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

/// Aggregate region whose values are sums over the EU member states.
pub const EU27: &str = "EU27";

/// Regions shown when a dataset is first loaded.
pub const DEFAULT_REGIONS: [&str; 4] = ["Germany", "France", "Spain", EU27];

// ---------------------------------------------------------------------------
// EvRecord – one row of the source table
// ---------------------------------------------------------------------------

/// A single observation: (year, region, powertrain, parameter) → value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvRecord {
    pub region: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub parameter: String,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub powertrain: String,
    pub year: i32,
    #[serde(default)]
    pub unit: String,
    /// `NaN` when the cell is blank or null.
    #[serde(deserialize_with = "value_or_nan")]
    pub value: f64,
}

/// Blank CSV cells and JSON nulls read as a missing value.
fn value_or_nan<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

// ---------------------------------------------------------------------------
// EvDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table with pre-computed unique values.
#[derive(Debug, Clone, Default)]
pub struct EvDataset {
    /// All rows, in file order.
    pub records: Vec<EvRecord>,
    /// Column names as they appeared in the source file.
    pub columns: Vec<String>,
    pub years: BTreeSet<i32>,
    pub regions: BTreeSet<String>,
    /// Non-empty powertrain labels.
    pub powertrains: BTreeSet<String>,
    pub parameters: BTreeSet<String>,
}

impl EvDataset {
    /// Build the unique-value indices from the loaded rows.
    pub fn from_records(records: Vec<EvRecord>, columns: Vec<String>) -> Self {
        let mut years = BTreeSet::new();
        let mut regions = BTreeSet::new();
        let mut powertrains = BTreeSet::new();
        let mut parameters = BTreeSet::new();

        for rec in &records {
            years.insert(rec.year);
            regions.insert(rec.region.clone());
            if !rec.powertrain.is_empty() {
                powertrains.insert(rec.powertrain.clone());
            }
            if !rec.parameter.is_empty() {
                parameters.insert(rec.parameter.clone());
            }
        }

        EvDataset {
            records,
            columns,
            years,
            regions,
            powertrains,
            parameters,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the values are percentage shares rather than unit sales.
    ///
    /// A column header containing "per" (e.g. `percentage`) marks a share
    /// table, as does a table whose rows are all in `percent`.
    pub fn is_share_table(&self) -> bool {
        let by_header = self
            .columns
            .iter()
            .any(|c| c.to_ascii_lowercase().contains("per"));
        let by_unit = !self.records.is_empty()
            && self
                .records
                .iter()
                .all(|r| r.unit.eq_ignore_ascii_case("percent"));
        by_header || by_unit
    }

    /// First and last year in the table.
    pub fn year_span(&self) -> Option<(i32, i32)> {
        Some((*self.years.first()?, *self.years.last()?))
    }

    /// The default region selection restricted to regions that exist.
    pub fn default_regions(&self, wanted: &[String]) -> BTreeSet<String> {
        wanted
            .iter()
            .filter(|r| self.regions.contains(*r))
            .cloned()
            .collect()
    }
}
