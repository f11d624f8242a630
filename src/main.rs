mod app;
mod cli;
mod color;
mod config;
mod data;
mod error;
mod export;
mod state;
mod ui;

use std::process::ExitCode;

use app::EvDashboardApp;
use clap::Parser;
use cli::Cli;
use config::DashboardConfig;
use eframe::egui;

fn main() -> ExitCode {
    env_logger::init();

    let args = Cli::parse();
    let config = match DashboardConfig::resolve(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(command) = &args.command {
        return match cli::run(command, args.data_path(&config)) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {e:#}");
                ExitCode::FAILURE
            }
        };
    }

    match run_gui(&args, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("GUI exited with error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_gui(args: &Cli, config: DashboardConfig) -> eframe::Result {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    let data_path = args.data_path(&config).map(|p| p.to_path_buf());
    eframe::run_native(
        "EV Sales Dashboard",
        options,
        Box::new(move |_cc| Ok(Box::new(EvDashboardApp::new(config, data_path.as_deref())))),
    )
}
