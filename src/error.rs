use thiserror::Error;

/// Validation failures of the growth calculations.
///
/// Checks run in declaration order and the first failing one is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvError {
    #[error("Start year and end year cannot be the same.")]
    SameYears,

    #[error("Start year cannot be higher than end year.")]
    StartAfterEnd,

    #[error("The years must be within the scope of the database ({min}-{max}).")]
    YearOutOfRange { min: i32, max: i32 },

    #[error("Powertrain must be present in the database ({available}).")]
    UnknownPowertrain { available: String },

    #[error("Region must be present in the database: '{0}'.")]
    UnknownRegion(String),

    #[error("No data found{for_powertrain} in {region} in the period {start}-{end}.")]
    NoData {
        /// Pre-rendered " for BEV" fragment, empty for share tables.
        for_powertrain: String,
        region: String,
        start: i32,
        end: i32,
    },

    #[error("The dataset is empty.")]
    EmptyDataset,
}
