use std::env;
use std::fmt;
use std::path::PathBuf;

/// Distinguishes runtime behavior for different deployment stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub rates: RateTableConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let schedule_path = optional_path("APP_RATE_TABLE")?;
        let duty_csv_path = optional_path("APP_DUTY_CSV")?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            rates: RateTableConfig {
                schedule_path,
                duty_csv_path,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn optional_path(variable: &'static str) -> Result<Option<PathBuf>, ConfigError> {
    match env::var(variable) {
        Ok(value) if value.trim().is_empty() => Err(ConfigError::EmptyPath { variable }),
        Ok(value) => Ok(Some(PathBuf::from(value.trim()))),
        Err(_) => Ok(None),
    }
}

/// Where the tariff schedule and optional duty-line CSV live.
#[derive(Debug, Clone, Default)]
pub struct RateTableConfig {
    pub schedule_path: Option<PathBuf>,
    pub duty_csv_path: Option<PathBuf>,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    EmptyPath { variable: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyPath { variable } => {
                write!(f, "{variable} is set but empty; unset it or point it at a file")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_RATE_TABLE");
        env::remove_var("APP_DUTY_CSV");
        env::remove_var("APP_LOG_LEVEL");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert!(config.rates.schedule_path.is_none());
        assert!(config.rates.duty_csv_path.is_none());
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn reads_rate_table_paths() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "prod");
        env::set_var("APP_RATE_TABLE", " /etc/landed-cost/schedule.json ");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Production);
        assert_eq!(
            config.rates.schedule_path,
            Some(PathBuf::from("/etc/landed-cost/schedule.json"))
        );
        reset_env();
    }

    #[test]
    fn empty_path_is_rejected() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_DUTY_CSV", "  ");
        let error = AppConfig::load().expect_err("empty path rejected");
        assert!(matches!(
            error,
            ConfigError::EmptyPath {
                variable: "APP_DUTY_CSV"
            }
        ));
        reset_env();
    }
}
