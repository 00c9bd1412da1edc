//! Value type parsers for iCalendar (RFC 5545 §3.3).

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::rfc::ical::core::{
    EventTime, Frequency, RecurrenceRule, RuleUntil, Weekday, WeekdayNum,
};

/// Parses a DATE value (RFC 5545 §3.3.4).
///
/// Format: YYYYMMDD (e.g., "19970714")
///
/// ## Errors
/// Returns an error if the string is not a valid 8-digit date.
pub fn parse_date(s: &str, offset: usize) -> ParseResult<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::new(
            ParseErrorKind::InvalidDate,
            offset,
            format!("expected YYYYMMDD, found {s}"),
        ));
    }

    let year = digits(&s[0..4]);
    let month = digits(&s[4..6]);
    let day = digits(&s[6..8]);

    i32::try_from(year)
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, month, day))
        .ok_or_else(|| {
            ParseError::new(
                ParseErrorKind::InvalidDate,
                offset,
                format!("no such date: {s}"),
            )
        })
}

/// Parses a TIME value without the UTC designator.
fn parse_time(s: &str, offset: usize) -> ParseResult<NaiveTime> {
    if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::new(
            ParseErrorKind::InvalidDateTime,
            offset,
            format!("expected HHMMSS, found {s}"),
        ));
    }

    NaiveTime::from_hms_opt(digits(&s[0..2]), digits(&s[2..4]), digits(&s[4..6])).ok_or_else(
        || {
            ParseError::new(
                ParseErrorKind::InvalidDateTime,
                offset,
                format!("no such time: {s}"),
            )
        },
    )
}

/// Folds a string of ASCII digits into a number. Callers check the digits.
fn digits(s: &str) -> u32 {
    s.bytes()
        .fold(0, |acc, b| acc * 10 + u32::from(b.saturating_sub(b'0')))
}

/// Parses a DATE-TIME value (RFC 5545 §3.3.5).
///
/// Format: YYYYMMDD"T"HHMMSS[Z] (e.g., "19970714T133000Z")
///
/// A trailing `Z` yields a UTC value, otherwise the value is zoned when a
/// TZID is supplied and floating when not.
///
/// ## Errors
/// Returns an error if the string is not a valid datetime format.
pub fn parse_datetime(s: &str, tzid: Option<&str>, offset: usize) -> ParseResult<EventTime> {
    let t_pos = s.find('T').ok_or_else(|| {
        ParseError::new(
            ParseErrorKind::InvalidDateTime,
            offset,
            format!("missing 'T' separator in {s}"),
        )
    })?;

    let date = parse_date(&s[..t_pos], offset)?;
    let time_str = &s[t_pos + 1..];
    let (time_str, is_utc) = match time_str.strip_suffix('Z') {
        Some(stripped) => (stripped, true),
        None => (time_str, false),
    };
    let local = NaiveDateTime::new(date, parse_time(time_str, offset + t_pos + 1)?);

    Ok(if is_utc {
        EventTime::utc(local.and_utc())
    } else if let Some(tzid) = tzid {
        EventTime::zoned(local, tzid)
    } else {
        EventTime::floating(local)
    })
}

/// ## Summary
/// Parses a DATE or DATE-TIME value into an [`EventTime`].
///
/// ## Errors
/// Returns an error if the value is neither a valid DATE nor DATE-TIME.
pub fn parse_event_time(s: &str, tzid: Option<&str>) -> ParseResult<EventTime> {
    let s = s.trim();
    if s.contains('T') {
        parse_datetime(s, tzid, 0)
    } else {
        parse_date(s, 0).map(EventTime::date)
    }
}

/// Rule parts as they appear in the text, before validation.
#[derive(Debug, Default)]
struct RuleParts {
    freq: Option<Frequency>,
    interval: Option<u32>,
    count: Option<u32>,
    until: Option<RuleUntil>,
    by_day: Vec<WeekdayNum>,
    by_monthday: Vec<i8>,
    by_month: Vec<u8>,
    by_setpos: Vec<i16>,
    wkst: Option<Weekday>,
}

/// Parses a RECUR (RRULE) value (RFC 5545 §3.3.10).
///
/// Accepts an optional `RRULE:` prefix. Unknown rule parts are ignored;
/// rule parts the expander cannot honour are rejected.
///
/// ## Errors
/// Returns an error if the string is not a valid recurrence rule.
pub fn parse_rrule(s: &str) -> ParseResult<RecurrenceRule> {
    let trimmed = s.trim();
    let body = match trimmed.get(..6) {
        Some(prefix) if prefix.eq_ignore_ascii_case("RRULE:") => &trimmed[6..],
        _ => trimmed,
    };
    if body.is_empty() {
        return Err(ParseError::invalid_rule(0, "empty rule"));
    }

    let mut parts = RuleParts::default();
    let mut offset = 0;
    for part in body.split(';') {
        if !part.is_empty() {
            let eq_pos = part.find('=').ok_or_else(|| {
                ParseError::invalid_rule(offset, format!("missing '=' in {part}"))
            })?;
            parse_rrule_part(&mut parts, &part[..eq_pos], &part[eq_pos + 1..], offset)?;
        }
        offset += part.len() + 1;
    }

    validate(parts)
}

/// Parses a single RRULE key-value pair.
fn parse_rrule_part(parts: &mut RuleParts, key: &str, value: &str, offset: usize) -> ParseResult<()> {
    match key.to_ascii_uppercase().as_str() {
        "FREQ" => {
            parts.freq = Some(Frequency::parse(value).ok_or_else(|| {
                ParseError::new(
                    ParseErrorKind::InvalidFrequency,
                    offset,
                    format!("unknown frequency {value}"),
                )
            })?);
        }
        "INTERVAL" => parts.interval = Some(parse_number(value, "INTERVAL", offset)?),
        "COUNT" => parse_rrule_count(parts, value, offset)?,
        "UNTIL" => parse_rrule_until(parts, value, offset)?,
        "WKST" => parts.wkst = Some(parse_weekday(value, offset)?),
        "BYDAY" => parts.by_day = parse_byday(value, offset)?,
        "BYMONTHDAY" => parts.by_monthday = parse_list(value, "BYMONTHDAY", offset)?,
        "BYMONTH" => parts.by_month = parse_list(value, "BYMONTH", offset)?,
        "BYSETPOS" => parts.by_setpos = parse_list(value, "BYSETPOS", offset)?,
        unsupported @ ("BYSECOND" | "BYMINUTE" | "BYHOUR" | "BYYEARDAY" | "BYWEEKNO") => {
            return Err(ParseError::unsupported(offset, unsupported));
        }
        other => {
            tracing::trace!(part = %other, "Ignoring unknown rule part");
        }
    }
    Ok(())
}

fn parse_number<T: std::str::FromStr>(value: &str, name: &str, offset: usize) -> ParseResult<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|err| ParseError::invalid_rule(offset, format!("{name}={value}: {err}")))
}

/// Parses a comma-separated list of numbers.
fn parse_list<T: std::str::FromStr>(s: &str, name: &str, offset: usize) -> ParseResult<Vec<T>>
where
    T::Err: std::fmt::Display,
{
    s.split(',').map(|v| parse_number(v, name, offset)).collect()
}

/// Parses the COUNT component of an RRULE.
fn parse_rrule_count(parts: &mut RuleParts, value: &str, offset: usize) -> ParseResult<()> {
    if parts.until.is_some() {
        return Err(ParseError::new(
            ParseErrorKind::UntilCountConflict,
            offset,
            "COUNT after UNTIL",
        ));
    }
    parts.count = Some(parse_number(value, "COUNT", offset)?);
    Ok(())
}

/// Parses the UNTIL component of an RRULE.
fn parse_rrule_until(parts: &mut RuleParts, value: &str, offset: usize) -> ParseResult<()> {
    if parts.count.is_some() {
        return Err(ParseError::new(
            ParseErrorKind::UntilCountConflict,
            offset,
            "UNTIL after COUNT",
        ));
    }
    // UNTIL can be DATE or DATE-TIME
    let until = if value.contains('T') {
        match parse_datetime(value, None, offset)? {
            EventTime::Utc { instant } => RuleUntil::Utc(instant),
            other => RuleUntil::Floating(other.local()),
        }
    } else {
        RuleUntil::Date(parse_date(value, offset)?)
    };
    parts.until = Some(until);
    Ok(())
}

fn parse_weekday(s: &str, offset: usize) -> ParseResult<Weekday> {
    Weekday::parse(s.trim()).ok_or_else(|| {
        ParseError::new(
            ParseErrorKind::InvalidWeekday,
            offset,
            format!("unknown weekday {s}"),
        )
    })
}

/// Parses a BYDAY value (weekdays with optional ordinals).
fn parse_byday(s: &str, offset: usize) -> ParseResult<Vec<WeekdayNum>> {
    s.split(',')
        .map(|v| parse_weekday_num(v.trim(), offset))
        .collect()
}

/// Parses a single weekday with optional ordinal (e.g., "MO", "1MO", "-1FR").
fn parse_weekday_num(s: &str, offset: usize) -> ParseResult<WeekdayNum> {
    // The weekday is always the trailing two characters
    let split = s
        .char_indices()
        .rev()
        .nth(1)
        .map(|(idx, _)| idx)
        .ok_or_else(|| {
            ParseError::new(
                ParseErrorKind::InvalidWeekday,
                offset,
                format!("unknown weekday {s}"),
            )
        })?;

    let weekday = parse_weekday(&s[split..], offset)?;
    let ordinal_str = &s[..split];
    let ordinal = if ordinal_str.is_empty() {
        None
    } else {
        Some(parse_number(ordinal_str.trim_start_matches('+'), "BYDAY", offset)?)
    };

    Ok(WeekdayNum { ordinal, weekday })
}

/// Checks value ranges and frequency-dependent constraints.
fn validate(parts: RuleParts) -> ParseResult<RecurrenceRule> {
    let freq = parts.freq.ok_or_else(|| {
        ParseError::new(ParseErrorKind::InvalidFrequency, 0, "missing FREQ")
    })?;
    if !freq.is_supported() {
        return Err(ParseError::unsupported(0, freq.as_str()));
    }

    let interval = parts.interval.unwrap_or(1);
    if interval == 0 {
        return Err(ParseError::invalid_rule(0, "INTERVAL must be positive"));
    }
    if parts.count == Some(0) {
        return Err(ParseError::invalid_rule(0, "COUNT must be positive"));
    }
    if let Some(month) = parts.by_month.iter().find(|m| !(1..=12).contains(*m)) {
        return Err(ParseError::invalid_rule(0, format!("BYMONTH={month} out of range")));
    }
    if let Some(day) = parts
        .by_monthday
        .iter()
        .find(|d| **d == 0 || !(-31..=31).contains(*d))
    {
        return Err(ParseError::invalid_rule(0, format!("BYMONTHDAY={day} out of range")));
    }
    if let Some(pos) = parts
        .by_setpos
        .iter()
        .find(|p| **p == 0 || !(-366..=366).contains(*p))
    {
        return Err(ParseError::invalid_rule(0, format!("BYSETPOS={pos} out of range")));
    }
    for entry in &parts.by_day {
        let Some(ordinal) = entry.ordinal else {
            continue;
        };
        if ordinal == 0 || !(-53..=53).contains(&ordinal) {
            return Err(ParseError::invalid_rule(0, format!("BYDAY={entry} out of range")));
        }
        if !matches!(freq, Frequency::Monthly | Frequency::Yearly) {
            return Err(ParseError::invalid_rule(
                0,
                format!("BYDAY={entry} needs MONTHLY or YEARLY frequency"),
            ));
        }
    }

    Ok(RecurrenceRule {
        freq,
        interval,
        count: parts.count,
        until: parts.until,
        by_day: parts.by_day,
        by_monthday: parts.by_monthday,
        by_month: parts.by_month,
        by_setpos: parts.by_setpos,
        wkst: parts.wkst,
    })
}
