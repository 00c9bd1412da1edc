//! Date and date-time values as carried by calendar events (RFC 5545 §3.3.4, §3.3.5).

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A start or end value of an event.
///
/// The variant records how the value was expressed, which decides how it is
/// placed on the timeline:
/// - `Date`: full-day value, interpreted in the calendar's timezone
/// - `Floating`: wall-clock time without zone, interpreted in the calendar's timezone
/// - `Utc`: absolute instant
/// - `Zoned`: wall-clock time in the timezone named by `tzid`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum EventTime {
    Date { date: NaiveDate },
    Floating { local: NaiveDateTime },
    Utc { instant: DateTime<Utc> },
    Zoned { local: NaiveDateTime, tzid: String },
}

impl EventTime {
    /// Creates a full-day value.
    #[must_use]
    pub fn date(date: NaiveDate) -> Self {
        Self::Date { date }
    }

    /// Creates a floating value.
    #[must_use]
    pub fn floating(local: NaiveDateTime) -> Self {
        Self::Floating { local }
    }

    /// Creates a UTC value.
    #[must_use]
    pub fn utc(instant: DateTime<Utc>) -> Self {
        Self::Utc { instant }
    }

    /// Creates a zoned value.
    #[must_use]
    pub fn zoned(local: NaiveDateTime, tzid: impl Into<String>) -> Self {
        Self::Zoned {
            local,
            tzid: tzid.into(),
        }
    }

    /// Returns whether this is a full-day value.
    #[must_use]
    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::Date { .. })
    }

    /// Returns the wall-clock value.
    ///
    /// Full-day values map to midnight, UTC values to their UTC wall-clock.
    #[must_use]
    pub fn local(&self) -> NaiveDateTime {
        match self {
            Self::Date { date } => date.and_time(NaiveTime::MIN),
            Self::Floating { local } | Self::Zoned { local, .. } => *local,
            Self::Utc { instant } => instant.naive_utc(),
        }
    }

    /// Returns the calendar date of the wall-clock value.
    #[must_use]
    pub fn local_date(&self) -> NaiveDate {
        self.local().date()
    }

    /// Returns a value of the same form with a different wall-clock time.
    ///
    /// Full-day values keep only the date part.
    #[must_use]
    pub fn with_local(&self, local: NaiveDateTime) -> Self {
        match self {
            Self::Date { .. } => Self::Date { date: local.date() },
            Self::Floating { .. } => Self::Floating { local },
            Self::Utc { .. } => Self::Utc {
                instant: local.and_utc(),
            },
            Self::Zoned { tzid, .. } => Self::Zoned {
                local,
                tzid: tzid.clone(),
            },
        }
    }

    /// Returns whether both values share form and zone, so that wall-clock
    /// arithmetic between them is meaningful.
    #[must_use]
    pub fn same_form(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Date { .. }, Self::Date { .. })
            | (Self::Floating { .. }, Self::Floating { .. })
            | (Self::Utc { .. }, Self::Utc { .. }) => true,
            (Self::Zoned { tzid: a, .. }, Self::Zoned { tzid: b, .. }) => a == b,
            _ => false,
        }
    }

    /// Returns the wall-clock span from `self` to `other`.
    #[must_use]
    pub fn wall_clock_until(&self, other: &Self) -> TimeDelta {
        other.local().signed_duration_since(self.local())
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date { date } => write!(f, "{}", date.format("%Y%m%d")),
            Self::Floating { local } => write!(f, "{}", local.format("%Y%m%dT%H%M%S")),
            Self::Utc { instant } => write!(f, "{}", instant.format("%Y%m%dT%H%M%SZ")),
            Self::Zoned { local, tzid } => {
                write!(f, "TZID={tzid}:{}", local.format("%Y%m%dT%H%M%S"))
            }
        }
    }
}
