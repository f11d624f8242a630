use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::{DATA_ENV, DashboardConfig};
use crate::data::growth::{share_growth, vehicle_growth};
use crate::data::loader::load_file;

#[derive(Parser, Debug)]
#[command(name = "ev-dashboard", version, about = "Electric-vehicle sales dashboard")]
pub struct Cli {
    /// Table to load (CSV, JSON or Parquet)
    #[arg(long, global = true, env = DATA_ENV)]
    pub data: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print unit-sales growth of one powertrain in one region
    Growth {
        #[arg(long)]
        powertrain: String,
        #[arg(long)]
        region: String,
        #[arg(long)]
        start: i32,
        #[arg(long)]
        end: i32,
    },
    /// Print sales-share growth in one region
    Share {
        #[arg(long)]
        region: String,
        #[arg(long)]
        start: i32,
        #[arg(long)]
        end: i32,
    },
}

impl Cli {
    /// Data file from the flag, falling back to the config.
    pub fn data_path<'a>(&'a self, config: &'a DashboardConfig) -> Option<&'a Path> {
        self.data.as_deref().or(config.data_path.as_deref())
    }
}

/// Run a headless subcommand and print its report.
pub fn run(command: &Command, data: Option<&Path>) -> Result<()> {
    let path = data.context("no data file given (use --data)")?;
    let dataset = load_file(path).with_context(|| format!("loading {}", path.display()))?;
    log::info!("Loaded {} rows from {}", dataset.len(), path.display());

    let report = match command {
        Command::Growth {
            powertrain,
            region,
            start,
            end,
        } => vehicle_growth(&dataset, powertrain, region, *start, *end)?.to_string(),
        Command::Share { region, start, end } => {
            share_growth(&dataset, region, *start, *end)?.to_string()
        }
    };
    println!("{report}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::CommandFactory;

    use super::*;
    use crate::error::EvError;

    fn sales_csv() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(
            b"region,parameter,powertrain,year,unit,value\n\
              Germany,EV sales,BEV,2021,Vehicles,100\n\
              Germany,EV sales,BEV,2023,Vehicles,200\n",
        )
        .unwrap();
        file
    }

    fn growth(start: i32, end: i32) -> Command {
        Command::Growth {
            powertrain: "BEV".into(),
            region: "Germany".into(),
            start,
            end,
        }
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_growth_subcommand() {
        let cli = Cli::try_parse_from([
            "ev-dashboard",
            "growth",
            "--data",
            "sales.csv",
            "--powertrain",
            "BEV",
            "--region",
            "Germany",
            "--start",
            "2022",
            "--end",
            "2023",
        ])
        .unwrap();
        assert_eq!(cli.data.as_deref(), Some(Path::new("sales.csv")));
        match cli.command {
            Some(Command::Growth { start, end, .. }) => assert_eq!((start, end), (2022, 2023)),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn flag_wins_over_config() {
        let cli = Cli::try_parse_from(["ev-dashboard", "--data", "a.csv"]).unwrap();
        let config = DashboardConfig::default();
        assert_eq!(cli.data_path(&config), Some(Path::new("a.csv")));
    }

    #[test]
    fn run_prints_growth_report() {
        let file = sales_csv();
        run(&growth(2021, 2023), Some(file.path())).unwrap();
    }

    #[test]
    fn run_surfaces_validation_errors() {
        let file = sales_csv();
        let err = run(&growth(2021, 2021), Some(file.path())).unwrap_err();
        assert_eq!(err.downcast_ref::<EvError>(), Some(&EvError::SameYears));

        let share = Command::Share {
            region: "Atlantis".into(),
            start: 2021,
            end: 2023,
        };
        let err = run(&share, Some(file.path())).unwrap_err();
        assert_eq!(
            err.downcast_ref::<EvError>(),
            Some(&EvError::UnknownRegion("Atlantis".into()))
        );
    }

    #[test]
    fn run_needs_a_data_file() {
        let err = run(&growth(2021, 2023), None).unwrap_err();
        assert!(err.to_string().contains("--data"));
    }
}
