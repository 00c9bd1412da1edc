use config::builder::DefaultState;
use config::{Config, ConfigBuilder};
use serde::Deserialize;

use crate::constants::{
    CONFIG_FILE_NAME, DEFAULT_LOG_LEVEL, DEFAULT_MAX_EMPTY_PERIODS, DEFAULT_TIMEZONE, ENV_PREFIX,
};
use crate::error::CoreResult;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub logging: LoggingConfig,
    pub recurrence: RecurrenceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Recurrence expansion settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RecurrenceConfig {
    /// TZID used to place floating and full-day values on the timeline.
    pub default_timezone: String,
    /// Consecutive empty recurrence periods tolerated before a rule is
    /// considered exhausted.
    pub max_empty_periods: u32,
}

impl Default for RecurrenceConfig {
    fn default() -> Self {
        Self {
            default_timezone: DEFAULT_TIMEZONE.to_string(),
            max_empty_periods: DEFAULT_MAX_EMPTY_PERIODS,
        }
    }
}

impl Settings {
    /// ## Summary
    /// Loads configuration from environment variables and an optional
    /// `almanac.toml` into a `Settings`.
    /// Environment variables take precedence over file values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> CoreResult<Self> {
        Ok(Self::defaults()?
            // TOML file
            .add_source(config::File::with_name(CONFIG_FILE_NAME).required(false))
            // Env
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?)
    }

    /// ## Summary
    /// Builds `Settings` from TOML text layered over the defaults.
    ///
    /// ## Errors
    /// Returns an error if the TOML is malformed or does not deserialize.
    pub fn from_toml(contents: &str) -> CoreResult<Self> {
        Ok(Self::defaults()?
            .add_source(config::File::from_str(contents, config::FileFormat::Toml))
            .build()?
            .try_deserialize::<Settings>()?)
    }

    fn defaults() -> CoreResult<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("logging.level", DEFAULT_LOG_LEVEL)?
            .set_default("recurrence.default_timezone", DEFAULT_TIMEZONE)?
            .set_default(
                "recurrence.max_empty_periods",
                i64::from(DEFAULT_MAX_EMPTY_PERIODS),
            )?)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> CoreResult<Settings> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    tracing::debug!(
        default_timezone = %settings.recurrence.default_timezone,
        max_empty_periods = settings.recurrence.max_empty_periods,
        "Recurrence settings resolved"
    );
    Ok(settings)
}
