//! `histories` entry point.

use clap::Parser;
use histories_app::cli::{self, Cli};
use histories_app::config::AppConfig;
use histories_app::error::AppError;
use histories_app::telemetry;

fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load(&cli.config)?;
    telemetry::init_tracing(config.log_filter.as_deref())?;

    tracing::debug!(command = ?cli.command, "running");
    let outcome = cli::run(&config, cli.command, cli.edit)?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
