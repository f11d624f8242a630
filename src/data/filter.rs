use std::collections::{BTreeMap, BTreeSet};

use super::model::{EU27, EvDataset, EvRecord};

// ---------------------------------------------------------------------------
// Region / powertrain selection
// ---------------------------------------------------------------------------

/// One chart line: (year, value) points sorted by year.
pub type YearSeries = Vec<(i32, f64)>;

/// Select the rows to chart.  Rows are cloned; the dataset is left untouched.
///
/// Share tables, and calls without a powertrain, are filtered by region
/// only.  `EU27` values are divided by `eu27_members` so the aggregate is
/// comparable to a single country.
pub fn filter_regions(
    dataset: &EvDataset,
    regions: &BTreeSet<String>,
    powertrain: Option<&str>,
    eu27_members: u32,
) -> Vec<EvRecord> {
    let powertrain = if dataset.is_share_table() {
        None
    } else {
        powertrain
    };

    let mut rows: Vec<EvRecord> = dataset
        .records
        .iter()
        .filter(|r| regions.contains(&r.region))
        .filter(|r| powertrain.map_or(true, |p| r.powertrain == p))
        .cloned()
        .collect();

    if regions.contains(EU27) && eu27_members > 0 {
        let divisor = f64::from(eu27_members);
        for row in rows.iter_mut().filter(|r| r.region == EU27) {
            row.value /= divisor;
        }
    }

    rows
}

/// Group rows into one series per region.
///
/// Several rows for the same (region, year) are averaged.
pub fn year_series(rows: &[EvRecord]) -> BTreeMap<String, YearSeries> {
    let mut acc: BTreeMap<String, BTreeMap<i32, (f64, usize)>> = BTreeMap::new();
    for row in rows {
        if !row.value.is_finite() {
            continue;
        }
        let slot = acc
            .entry(row.region.clone())
            .or_default()
            .entry(row.year)
            .or_insert((0.0, 0));
        slot.0 += row.value;
        slot.1 += 1;
    }

    acc.into_iter()
        .map(|(region, by_year)| {
            let points = by_year
                .into_iter()
                .map(|(year, (sum, n))| (year, sum / n as f64))
                .collect();
            (region, points)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::{sales, shares};

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn filters_by_powertrain_and_region() {
        let ds = sales();
        let rows = filter_regions(&ds, &set(&["Germany"]), Some("BEV"), 27);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.region == "Germany" && r.powertrain == "BEV"));
    }

    #[test]
    fn no_powertrain_means_region_only() {
        let ds = sales();
        let rows = filter_regions(&ds, &set(&["Germany"]), None, 27);
        assert_eq!(rows.len(), 5);
    }

    #[test]
    fn share_tables_ignore_powertrain() {
        let ds = shares();
        let rows = filter_regions(&ds, &set(&["Germany"]), Some("BEV"), 27);
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn eu27_is_averaged_per_member_without_touching_source() {
        let ds = sales();
        let rows = filter_regions(&ds, &set(&["EU27", "Spain"]), Some("BEV"), 27);
        let eu: Vec<f64> = rows
            .iter()
            .filter(|r| r.region == "EU27")
            .map(|r| r.value)
            .collect();
        assert_eq!(eu, vec![100.0, 200.0]);
        let spain_2023 = rows
            .iter()
            .find(|r| r.region == "Spain" && r.year == 2023)
            .unwrap();
        assert_eq!(spain_2023.value, 30.0);
        assert_eq!(ds.records[9].value, 2700.0);
    }

    #[test]
    fn empty_selection_yields_nothing() {
        let ds = sales();
        assert!(filter_regions(&ds, &BTreeSet::new(), Some("BEV"), 27).is_empty());
    }

    #[test]
    fn series_average_duplicate_years() {
        let ds = sales();
        let rows = filter_regions(&ds, &set(&["Germany"]), None, 27);
        let series = year_series(&rows);
        let germany = &series["Germany"];
        assert_eq!(germany, &vec![(2021, 90.0), (2022, 150.0), (2023, 120.0)]);
    }
}
