use std::collections::BTreeSet;
use std::fmt;

use crate::error::EvError;

use super::model::EvDataset;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of comparing the start and end year totals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GrowthOutcome {
    /// Both totals known and the start total is non-zero.
    Change { first: f64, last: f64, percent: f64 },
    /// Nothing was sold in the start year, so no percentage exists.
    NewMarketEntry { last: f64 },
}

impl GrowthOutcome {
    fn from_totals(first: f64, last: f64) -> Self {
        if first == 0.0 {
            GrowthOutcome::NewMarketEntry { last }
        } else {
            GrowthOutcome::Change {
                first,
                last,
                percent: percent_change(first, last),
            }
        }
    }

    pub fn percent(&self) -> Option<f64> {
        match self {
            GrowthOutcome::Change { percent, .. } => Some(*percent),
            GrowthOutcome::NewMarketEntry { .. } => None,
        }
    }

    pub fn first(&self) -> f64 {
        match self {
            GrowthOutcome::Change { first, .. } => *first,
            GrowthOutcome::NewMarketEntry { .. } => 0.0,
        }
    }

    pub fn last(&self) -> f64 {
        match self {
            GrowthOutcome::Change { last, .. } | GrowthOutcome::NewMarketEntry { last } => *last,
        }
    }
}

/// Unit-sales growth of one powertrain in one region.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleGrowth {
    pub powertrain: String,
    pub region: String,
    pub start_year: i32,
    pub end_year: i32,
    pub outcome: GrowthOutcome,
}

/// Sales-share growth in one region.
#[derive(Debug, Clone, PartialEq)]
pub struct ShareGrowth {
    pub region: String,
    /// Parameter label of the selected rows, e.g. `EV sales share`.
    pub parameter: String,
    pub start_year: i32,
    pub end_year: i32,
    pub outcome: GrowthOutcome,
}

/// `((last / first) - 1) * 100`
pub fn percent_change(first: f64, last: f64) -> f64 {
    ((last / first) - 1.0) * 100.0
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Calculations
// ---------------------------------------------------------------------------

/// Percentage change of unit sales between `start_year` and `end_year`.
///
/// Year totals are summed over every matching row of that year.
pub fn vehicle_growth(
    dataset: &EvDataset,
    powertrain: &str,
    region: &str,
    start_year: i32,
    end_year: i32,
) -> Result<VehicleGrowth, EvError> {
    validate_years(dataset, start_year, end_year)?;
    if !dataset.powertrains.contains(powertrain) {
        return Err(EvError::UnknownPowertrain {
            available: quoted_list(&dataset.powertrains),
        });
    }
    validate_region(dataset, region)?;

    let rows: Vec<_> = dataset
        .records
        .iter()
        .filter(|r| r.powertrain == powertrain && r.region == region)
        .filter(|r| (start_year..=end_year).contains(&r.year))
        .collect();

    if rows.is_empty() {
        return Err(EvError::NoData {
            for_powertrain: format!(" for {powertrain}"),
            region: region.to_string(),
            start: start_year,
            end: end_year,
        });
    }

    // Missing values (NaN) are skipped.
    let total = |year: i32| -> f64 {
        rows.iter()
            .filter(|r| r.year == year && r.value.is_finite())
            .map(|r| r.value)
            .sum()
    };
    let first = total(start_year);
    let last = total(end_year);
    log::debug!("{powertrain}/{region}: {first} in {start_year}, {last} in {end_year}");

    Ok(VehicleGrowth {
        powertrain: powertrain.to_string(),
        region: region.to_string(),
        start_year,
        end_year,
        outcome: GrowthOutcome::from_totals(first, last),
    })
}

/// Percentage change of a share table between `start_year` and `end_year`.
///
/// Year totals are rounded to two decimals before comparing.
pub fn share_growth(
    dataset: &EvDataset,
    region: &str,
    start_year: i32,
    end_year: i32,
) -> Result<ShareGrowth, EvError> {
    validate_years(dataset, start_year, end_year)?;
    validate_region(dataset, region)?;

    let rows: Vec<_> = dataset
        .records
        .iter()
        .filter(|r| r.region == region)
        .filter(|r| (start_year..=end_year).contains(&r.year))
        .collect();

    let Some(head) = rows.first() else {
        return Err(EvError::NoData {
            for_powertrain: String::new(),
            region: region.to_string(),
            start: start_year,
            end: end_year,
        });
    };
    let parameter = head.parameter.clone();

    let total = |year: i32| -> f64 {
        round2(
            rows.iter()
                .filter(|r| r.year == year && r.value.is_finite())
                .map(|r| r.value)
                .sum(),
        )
    };

    Ok(ShareGrowth {
        region: region.to_string(),
        parameter,
        start_year,
        end_year,
        outcome: GrowthOutcome::from_totals(total(start_year), total(end_year)),
    })
}

/// Growth of each region over the full year span of the dataset.
///
/// Share tables use [`share_growth`]; otherwise `powertrain` is required.
pub fn span_summary(
    dataset: &EvDataset,
    regions: &BTreeSet<String>,
    powertrain: Option<&str>,
) -> Vec<(String, Result<GrowthOutcome, EvError>)> {
    let Some((start, end)) = dataset.year_span() else {
        return Vec::new();
    };
    let share = dataset.is_share_table();

    regions
        .iter()
        .map(|region| {
            let outcome = match (share, powertrain) {
                (true, _) => share_growth(dataset, region, start, end).map(|g| g.outcome),
                (false, Some(p)) => {
                    vehicle_growth(dataset, p, region, start, end).map(|g| g.outcome)
                }
                (false, None) => Err(EvError::UnknownPowertrain {
                    available: quoted_list(&dataset.powertrains),
                }),
            };
            (region.clone(), outcome)
        })
        .collect()
}

// -- Validation --

fn validate_years(dataset: &EvDataset, start_year: i32, end_year: i32) -> Result<(), EvError> {
    if start_year == end_year {
        return Err(EvError::SameYears);
    }
    if start_year > end_year {
        return Err(EvError::StartAfterEnd);
    }
    let (min, max) = dataset.year_span().ok_or(EvError::EmptyDataset)?;
    if !dataset.years.contains(&start_year) || !dataset.years.contains(&end_year) {
        return Err(EvError::YearOutOfRange { min, max });
    }
    Ok(())
}

fn validate_region(dataset: &EvDataset, region: &str) -> Result<(), EvError> {
    if dataset.regions.contains(region) {
        Ok(())
    } else {
        Err(EvError::UnknownRegion(region.to_string()))
    }
}

fn quoted_list(values: &BTreeSet<String>) -> String {
    values
        .iter()
        .map(|v| format!("'{v}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

impl fmt::Display for VehicleGrowth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (start, end) = (self.start_year, self.end_year);
        match self.outcome {
            GrowthOutcome::Change {
                first,
                last,
                percent,
            } => write!(
                f,
                "For {} region and {} powertrain, the percentage change between {start} and \
                 {end} has been of {percent:.2}%, with {first:.0} units in {start}, and \
                 {last:.0} units in {end}.",
                self.region, self.powertrain
            ),
            GrowthOutcome::NewMarketEntry { last } => write!(
                f,
                "{} sales in {} were 0 in {start} and {last:.0} in {end}, \
                 probable new market entry.",
                self.powertrain, self.region
            ),
        }
    }
}

impl fmt::Display for ShareGrowth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (start, end) = (self.start_year, self.end_year);
        match self.outcome {
            GrowthOutcome::Change {
                first,
                last,
                percent,
            } => write!(
                f,
                "For {}, the percentage change for {} between {start} and {end} has been of \
                 {percent:.2}%, with {first:.2}% in {start}, and {last:.2}% in {end}.",
                self.region, self.parameter
            ),
            GrowthOutcome::NewMarketEntry { last } => write!(
                f,
                "Percentage share for {} in {} was 0% in {start} and {last:.2}% in {end}, \
                 probable new market entry.",
                self.parameter, self.region
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::fixtures::{record, sales, share, shares};

    #[test]
    fn bev_growth_in_germany() {
        let g = vehicle_growth(&sales(), "BEV", "Germany", 2021, 2023).unwrap();
        assert_eq!(
            g.outcome,
            GrowthOutcome::Change {
                first: 100.0,
                last: 200.0,
                percent: 100.0
            }
        );
        assert_eq!(
            g.to_string(),
            "For Germany region and BEV powertrain, the percentage change between 2021 and 2023 \
             has been of 100.00%, with 100 units in 2021, and 200 units in 2023."
        );
    }

    #[test]
    fn missing_end_year_rows_count_as_zero() {
        let g = vehicle_growth(&sales(), "BEV", "Spain", 2021, 2022).unwrap();
        assert_eq!(g.outcome.percent(), Some(-100.0));
    }

    #[test]
    fn zero_start_is_new_market_entry() {
        let g = vehicle_growth(&sales(), "FCEV", "Spain", 2021, 2023).unwrap();
        assert_eq!(g.outcome, GrowthOutcome::NewMarketEntry { last: 5.0 });
        assert_eq!(g.outcome.percent(), None);
        assert_eq!(
            g.to_string(),
            "FCEV sales in Spain were 0 in 2021 and 5 in 2023, probable new market entry."
        );
    }

    #[test]
    fn validation_runs_in_order() {
        let ds = sales();
        assert_eq!(
            vehicle_growth(&ds, "XYZ", "Nowhere", 2022, 2022),
            Err(EvError::SameYears)
        );
        assert_eq!(
            vehicle_growth(&ds, "XYZ", "Nowhere", 2023, 2022),
            Err(EvError::StartAfterEnd)
        );
        assert_eq!(
            vehicle_growth(&ds, "XYZ", "Nowhere", 2009, 2022),
            Err(EvError::YearOutOfRange {
                min: 2021,
                max: 2023
            })
        );
        assert_eq!(
            vehicle_growth(&ds, "XYZ", "Nowhere", 2021, 2022),
            Err(EvError::UnknownPowertrain {
                available: "'BEV', 'FCEV', 'PHEV'".into()
            })
        );
        assert_eq!(
            vehicle_growth(&ds, "BEV", "Nowhere", 2021, 2022),
            Err(EvError::UnknownRegion("Nowhere".into()))
        );
    }

    #[test]
    fn no_rows_for_combination() {
        let err = vehicle_growth(&sales(), "PHEV", "Spain", 2021, 2023).unwrap_err();
        assert_eq!(
            err.to_string(),
            "No data found for PHEV in Spain in the period 2021-2023."
        );
    }

    #[test]
    fn empty_dataset_is_reported() {
        let ds = EvDataset::default();
        assert_eq!(
            vehicle_growth(&ds, "BEV", "Spain", 2021, 2023),
            Err(EvError::EmptyDataset)
        );
    }

    #[test]
    fn share_growth_rounds_and_reports() {
        let g = share_growth(&shares(), "Germany", 2021, 2023).unwrap();
        assert_eq!(g.parameter, "EV sales share");
        assert_eq!(g.outcome.percent(), Some(100.0));
        assert_eq!(
            g.to_string(),
            "For Germany, the percentage change for EV sales share between 2021 and 2023 \
             has been of 100.00%, with 12.50% in 2021, and 25.00% in 2023."
        );
    }

    #[test]
    fn missing_values_are_skipped_in_year_totals() {
        let mut ds = sales();
        ds.records.push(record("Germany", "BEV", 2021, f64::NAN));
        let g = vehicle_growth(&ds, "BEV", "Germany", 2021, 2023).unwrap();
        assert_eq!(g.outcome.first(), 100.0);
        assert_eq!(g.outcome.percent(), Some(100.0));
        assert!(g.to_string().contains("has been of 100.00%"));

        let mut ds = shares();
        ds.records.push(share("Germany", 2023, f64::NAN));
        let g = share_growth(&ds, "Germany", 2021, 2023).unwrap();
        assert_eq!(g.outcome.last(), 25.0);
    }

    #[test]
    fn share_growth_from_zero_is_not_infinite() {
        let g = share_growth(&shares(), "Norway", 2021, 2023).unwrap();
        assert_eq!(g.outcome, GrowthOutcome::NewMarketEntry { last: 3.33 });
        assert_eq!(
            g.to_string(),
            "Percentage share for EV sales share in Norway was 0% in 2021 and 3.33% in 2023, \
             probable new market entry."
        );
    }

    #[test]
    fn summary_covers_each_selected_region() {
        let ds = sales();
        let regions: BTreeSet<String> =
            ["Germany", "Spain"].iter().map(|s| s.to_string()).collect();
        let rows = span_summary(&ds, &regions, Some("BEV"));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0, "Germany");
        assert_eq!(rows[0].1.as_ref().unwrap().percent(), Some(100.0));
        assert_eq!(rows[1].1.as_ref().unwrap().percent(), Some(200.0));
    }

    #[test]
    fn percent_change_formula() {
        assert_eq!(percent_change(50.0, 75.0), 50.0);
        assert_eq!(percent_change(200.0, 100.0), -50.0);
    }
}
