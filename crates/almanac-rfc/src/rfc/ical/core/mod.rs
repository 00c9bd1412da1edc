//! iCalendar core models (RFC 5545).
//!
//! This module defines the value types the recurrence engine works on:
//! - Event start/end values in their original representation
//! - Recurrence rules reduced to the parts the expander understands

mod datetime;
mod rrule;

pub use datetime::EventTime;
pub use rrule::{Frequency, RecurrenceRule, RuleUntil, Weekday, WeekdayNum};
