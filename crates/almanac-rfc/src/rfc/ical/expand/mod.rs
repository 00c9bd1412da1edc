//! Recurrence expansion and timezone handling.

mod expander;
mod timezone;

pub use expander::RuleExpander;
pub use timezone::{ConversionError, TimeZoneResolver, normalize_tzid, resolve_local, to_local};
