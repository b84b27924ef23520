use clap::{Args, ValueEnum};
use landed_cost::config::AppConfig;
use landed_cost::error::AppError;
use landed_cost::engine::RateTable;
use landed_cost::tariff::TariffSchedule;
use rust_decimal::Decimal;
use std::io::Read;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

/// Illustrative schedule bundled with the binary; deployments point `APP_RATE_TABLE` at their own.
const REFERENCE_SCHEDULE: &str = include_str!("../../../data/reference_schedule.json");

#[derive(Args, Debug, Default, Clone)]
pub(crate) struct RateSourceArgs {
    /// Tariff schedule JSON (overrides APP_RATE_TABLE)
    #[arg(long)]
    pub(crate) rates: Option<PathBuf>,
    /// Duty-line CSV merged into the schedule (overrides APP_DUTY_CSV)
    #[arg(long)]
    pub(crate) duty_csv: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Loads the schedule from the flag, then configuration, then the bundled reference data.
pub(crate) fn load_schedule(
    source: &RateSourceArgs,
    config: &AppConfig,
) -> Result<TariffSchedule, AppError> {
    let schedule_path = source
        .rates
        .clone()
        .or_else(|| config.rates.schedule_path.clone());
    let duty_csv = source
        .duty_csv
        .clone()
        .or_else(|| config.rates.duty_csv_path.clone());

    let mut schedule = match &schedule_path {
        Some(path) => TariffSchedule::from_path(path)?,
        None => TariffSchedule::from_json_str(REFERENCE_SCHEDULE)?,
    };
    if let Some(path) = &duty_csv {
        schedule = schedule.with_duty_csv_path(path)?;
    }

    let origin = schedule_path
        .as_deref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "bundled reference".to_string());
    info!(
        environment = ?config.environment,
        %origin,
        version = schedule.version(),
        duty_lines = schedule.duty_line_count(),
        effective = %schedule.effective_date(),
        "tariff schedule loaded"
    );

    Ok(schedule)
}

/// Reads a request body from a file, or stdin when the path is `-`.
pub(crate) fn read_input(path: &str) -> Result<String, AppError> {
    if path == "-" {
        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw)?;
        Ok(raw)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

pub(crate) fn parse_decimal(raw: &str) -> Result<Decimal, String> {
    Decimal::from_str(raw.trim())
        .map_err(|err| format!("failed to parse '{raw}' as a decimal amount ({err})"))
}

#[cfg(test)]
pub(crate) fn reference_schedule() -> TariffSchedule {
    TariffSchedule::from_json_str(REFERENCE_SCHEDULE).expect("reference schedule loads")
}
