//! Recurrence rule model (RFC 5545 §3.3.10).

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::fmt;

/// Recurrence frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Parses a FREQ value (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "SECONDLY" => Some(Self::Secondly),
            "MINUTELY" => Some(Self::Minutely),
            "HOURLY" => Some(Self::Hourly),
            "DAILY" => Some(Self::Daily),
            "WEEKLY" => Some(Self::Weekly),
            "MONTHLY" => Some(Self::Monthly),
            "YEARLY" => Some(Self::Yearly),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Secondly => "SECONDLY",
            Self::Minutely => "MINUTELY",
            Self::Hourly => "HOURLY",
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
        }
    }

    /// Returns whether the expander can produce occurrences for this frequency.
    #[must_use]
    pub const fn is_supported(self) -> bool {
        matches!(
            self,
            Self::Daily | Self::Weekly | Self::Monthly | Self::Yearly
        )
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Day of the week as used in BYDAY and WKST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// Parses a two-letter weekday code (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "MO" => Some(Self::Monday),
            "TU" => Some(Self::Tuesday),
            "WE" => Some(Self::Wednesday),
            "TH" => Some(Self::Thursday),
            "FR" => Some(Self::Friday),
            "SA" => Some(Self::Saturday),
            "SU" => Some(Self::Sunday),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "MO",
            Self::Tuesday => "TU",
            Self::Wednesday => "WE",
            Self::Thursday => "TH",
            Self::Friday => "FR",
            Self::Saturday => "SA",
            Self::Sunday => "SU",
        }
    }

    #[must_use]
    pub const fn to_chrono(self) -> chrono::Weekday {
        match self {
            Self::Monday => chrono::Weekday::Mon,
            Self::Tuesday => chrono::Weekday::Tue,
            Self::Wednesday => chrono::Weekday::Wed,
            Self::Thursday => chrono::Weekday::Thu,
            Self::Friday => chrono::Weekday::Fri,
            Self::Saturday => chrono::Weekday::Sat,
            Self::Sunday => chrono::Weekday::Sun,
        }
    }

    #[must_use]
    pub const fn from_chrono(weekday: chrono::Weekday) -> Self {
        match weekday {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A BYDAY entry: weekday with optional ordinal (`MO`, `2TU`, `-1FR`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekdayNum {
    pub ordinal: Option<i8>,
    pub weekday: Weekday,
}

impl WeekdayNum {
    /// Every occurrence of the weekday within the period.
    #[must_use]
    pub const fn every(weekday: Weekday) -> Self {
        Self {
            ordinal: None,
            weekday,
        }
    }

    /// The n-th occurrence of the weekday (negative counts from the end).
    #[must_use]
    pub const fn nth(ordinal: i8, weekday: Weekday) -> Self {
        Self {
            ordinal: Some(ordinal),
            weekday,
        }
    }
}

impl fmt::Display for WeekdayNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ordinal) = self.ordinal {
            write!(f, "{ordinal}")?;
        }
        f.write_str(self.weekday.as_str())
    }
}

/// UNTIL bound of a rule. Inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleUntil {
    Date(NaiveDate),
    Floating(NaiveDateTime),
    Utc(DateTime<Utc>),
}

impl fmt::Display for RuleUntil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => write!(f, "{}", date.format("%Y%m%d")),
            Self::Floating(local) => write!(f, "{}", local.format("%Y%m%dT%H%M%S")),
            Self::Utc(instant) => write!(f, "{}", instant.format("%Y%m%dT%H%M%SZ")),
        }
    }
}

/// A parsed and validated recurrence rule.
///
/// Only parts the expander understands are kept. Use
/// [`crate::rfc::ical::parse::parse_rrule`] to obtain one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub freq: Frequency,
    pub interval: u32,
    pub count: Option<u32>,
    pub until: Option<RuleUntil>,
    pub by_day: Vec<WeekdayNum>,
    pub by_monthday: Vec<i8>,
    pub by_month: Vec<u8>,
    pub by_setpos: Vec<i16>,
    pub wkst: Option<Weekday>,
}

impl RecurrenceRule {
    /// Creates a rule with the given frequency and no further parts.
    #[must_use]
    pub fn new(freq: Frequency) -> Self {
        Self {
            freq,
            interval: 1,
            count: None,
            until: None,
            by_day: Vec::new(),
            by_monthday: Vec::new(),
            by_month: Vec::new(),
            by_setpos: Vec::new(),
            wkst: None,
        }
    }

    /// Returns whether the rule produces a finite series.
    #[must_use]
    pub fn is_bounded(&self) -> bool {
        self.count.is_some() || self.until.is_some()
    }

    /// Week start, `MO` unless WKST says otherwise.
    #[must_use]
    pub fn week_start(&self) -> Weekday {
        self.wkst.unwrap_or(Weekday::Monday)
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, name: &str, values: &[T]) -> fmt::Result {
    if values.is_empty() {
        return Ok(());
    }
    write!(f, ";{name}=")?;
    for (idx, value) in values.iter().enumerate() {
        if idx > 0 {
            f.write_str(",")?;
        }
        write!(f, "{value}")?;
    }
    Ok(())
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FREQ={}", self.freq)?;
        if self.interval != 1 {
            write!(f, ";INTERVAL={}", self.interval)?;
        }
        if let Some(count) = self.count {
            write!(f, ";COUNT={count}")?;
        }
        if let Some(until) = &self.until {
            write!(f, ";UNTIL={until}")?;
        }
        write_list(f, "BYDAY", &self.by_day)?;
        write_list(f, "BYMONTHDAY", &self.by_monthday)?;
        write_list(f, "BYMONTH", &self.by_month)?;
        write_list(f, "BYSETPOS", &self.by_setpos)?;
        if let Some(wkst) = self.wkst {
            write!(f, ";WKST={wkst}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_minimal() {
        let rule = RecurrenceRule::new(Frequency::Daily);
        assert_eq!(rule.to_string(), "FREQ=DAILY");
        assert!(!rule.is_bounded());
    }

    #[test]
    fn test_display_all_parts() {
        let mut rule = RecurrenceRule::new(Frequency::Monthly);
        rule.interval = 2;
        rule.until = Some(RuleUntil::Date(NaiveDate::from_ymd_opt(2026, 12, 31).unwrap()));
        rule.by_day = vec![
            WeekdayNum::every(Weekday::Monday),
            WeekdayNum::nth(-1, Weekday::Friday),
        ];
        rule.by_setpos = vec![1, -1];
        rule.wkst = Some(Weekday::Sunday);

        assert_eq!(
            rule.to_string(),
            "FREQ=MONTHLY;INTERVAL=2;UNTIL=20261231;BYDAY=MO,-1FR;BYSETPOS=1,-1;WKST=SU"
        );
        assert!(rule.is_bounded());
        assert_eq!(rule.week_start(), Weekday::Sunday);
    }

    #[test]
    fn test_weekday_chrono_round_trip() {
        for weekday in [
            Weekday::Monday,
            Weekday::Tuesday,
            Weekday::Wednesday,
            Weekday::Thursday,
            Weekday::Friday,
            Weekday::Saturday,
            Weekday::Sunday,
        ] {
            assert_eq!(Weekday::from_chrono(weekday.to_chrono()), weekday);
        }
    }

    #[test]
    fn test_frequency_support() {
        assert!(Frequency::Daily.is_supported());
        assert!(Frequency::Yearly.is_supported());
        assert!(!Frequency::Hourly.is_supported());
        assert_eq!(Frequency::parse("weekly"), Some(Frequency::Weekly));
        assert_eq!(Frequency::parse("FORTNIGHTLY"), None);
    }
}
