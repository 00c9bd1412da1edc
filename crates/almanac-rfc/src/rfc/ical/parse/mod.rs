//! Parsers for iCalendar value types used by recurrence expansion.

mod error;
mod values;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use values::{parse_date, parse_datetime, parse_event_time, parse_rrule};
