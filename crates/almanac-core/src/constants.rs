/// Application identity shared across crates
pub const APP_NAME: &str = "almanac";
pub const CONFIG_FILE_NAME: &str = const_str::concat!(APP_NAME, ".toml");
pub const ENV_PREFIX: &str = "ALMANAC";

/// Timezone used for floating and full-day values when none is configured.
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Consecutive recurrence periods without a match before expansion gives up.
pub const DEFAULT_MAX_EMPTY_PERIODS: u32 = 1000;

pub const DEFAULT_LOG_LEVEL: &str = "info";
