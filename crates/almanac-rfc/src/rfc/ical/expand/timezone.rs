//! Timezone resolution and DST-aware placement of wall-clock times.
//!
//! Uses ICU4X for Windows timezone ID to IANA mapping and timezone canonicalization.

use chrono::{DateTime, LocalResult, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use icu::time::zone::WindowsParser;
use icu::time::zone::iana::IanaParserExtended;
use std::collections::HashMap;
use std::str::FromStr;

/// Error during timezone conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// Unknown or invalid timezone identifier.
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),
}

/// Resolver for timezone identifiers.
///
/// Maintains a cache of resolved timezones keyed by the TZID as written.
#[derive(Debug, Default)]
pub struct TimeZoneResolver {
    cache: HashMap<String, Tz>,
}

impl TimeZoneResolver {
    /// Creates a new timezone resolver.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cache: HashMap::new(),
        }
    }

    /// ## Summary
    /// Resolves a timezone identifier to a `chrono_tz::Tz`.
    ///
    /// Windows names, vendor-prefixed names and IANA aliases are normalized
    /// to canonical IANA names before lookup.
    ///
    /// ## Errors
    ///
    /// Returns `ConversionError::UnknownTimezone` if the TZID cannot be resolved.
    ///
    /// ## Side Effects
    ///
    /// Caches successful resolutions to avoid repeated parsing.
    pub fn resolve(&mut self, tzid: &str) -> Result<Tz, ConversionError> {
        if let Some(tz) = self.cache.get(tzid) {
            return Ok(*tz);
        }

        let normalized = normalize_tzid(tzid);
        let tz = Tz::from_str(&normalized)
            .map_err(|_e| ConversionError::UnknownTimezone(tzid.to_string()))?;

        tracing::trace!(tzid, resolved = %tz, "Resolved timezone");
        self.cache.insert(tzid.to_string(), tz);

        Ok(tz)
    }
}

/// Normalizes common calendar-client timezone identifiers to IANA names.
///
/// Uses ICU4X for Windows timezone ID mapping and IANA canonicalization.
#[must_use]
pub fn normalize_tzid(tzid: &str) -> String {
    let stripped = tzid
        .strip_prefix("/mozilla.org/")
        .or_else(|| tzid.strip_prefix("/softwarestudio.org/"))
        .unwrap_or(tzid);

    let iana_parser = IanaParserExtended::new();

    let windows_parser = WindowsParser::new();
    if let Some(tz) = windows_parser.parse(stripped, None) {
        for entry in iana_parser.iter() {
            if entry.time_zone == tz {
                return entry.canonical.to_string();
            }
        }
    }

    // Handles aliases like Europe/Kiev -> Europe/Kyiv
    let parsed = iana_parser.parse(stripped);
    if parsed.time_zone != icu::time::TimeZone::UNKNOWN {
        return parsed.canonical.to_string();
    }

    stripped.to_string()
}

/// ## Summary
/// Places a wall-clock time of `tz` on the timeline without failing.
///
/// Ambiguous times (DST fold) resolve to the earlier instant. Non-existent
/// times (DST gap) are read with the offset in effect before the gap, which
/// moves them forward by the size of the gap.
#[must_use]
pub fn resolve_local(local: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => {
            let before = local.checked_sub_signed(TimeDelta::days(1)).unwrap_or(local);
            let offset = tz.offset_from_utc_datetime(&before).fix();
            local
                .checked_sub_signed(TimeDelta::seconds(i64::from(offset.local_minus_utc())))
                .unwrap_or(local)
                .and_utc()
        }
    }
}

/// Returns the wall-clock time of an instant in `tz`.
#[must_use]
pub fn to_local(instant: DateTime<Utc>, tz: Tz) -> NaiveDateTime {
    instant.with_timezone(&tz).naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_resolve_standard_timezone() {
        let mut resolver = TimeZoneResolver::new();

        let tz = resolver
            .resolve("America/New_York")
            .expect("should resolve");
        assert_eq!(tz, Tz::America__New_York);
    }

    #[test]
    fn test_resolve_unknown_timezone() {
        let mut resolver = TimeZoneResolver::new();

        let err = resolver.resolve("Mars/Olympus_Mons").unwrap_err();
        assert_eq!(
            err,
            ConversionError::UnknownTimezone("Mars/Olympus_Mons".to_string())
        );
    }

    #[test]
    fn test_normalize_windows_timezone() {
        assert_eq!(normalize_tzid("Eastern Standard Time"), "America/New_York");
        assert_eq!(
            normalize_tzid("Pacific Standard Time"),
            "America/Los_Angeles"
        );
        assert_eq!(normalize_tzid("W. Europe Standard Time"), "Europe/Berlin");
    }

    #[test]
    fn test_normalize_mozilla_prefix() {
        assert_eq!(
            normalize_tzid("/mozilla.org/America/New_York"),
            "America/New_York"
        );
    }

    #[test]
    fn test_normalize_iana_alias() {
        assert_eq!(normalize_tzid("Europe/Kiev"), "Europe/Kyiv");
        assert_eq!(normalize_tzid("US/Eastern"), "America/New_York");
    }

    #[test]
    fn test_resolve_local_standard_and_summer_time() {
        let tz = Tz::America__New_York;

        assert_eq!(
            resolve_local(local(2026, 1, 15, 10, 0), tz),
            Utc.with_ymd_and_hms(2026, 1, 15, 15, 0, 0).unwrap()
        );
        assert_eq!(
            resolve_local(local(2026, 7, 15, 10, 0), tz),
            Utc.with_ymd_and_hms(2026, 7, 15, 14, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_resolve_local_moves_gap_forward() {
        let mut resolver = TimeZoneResolver::new();
        let tz = resolver.resolve("US/Eastern").expect("alias should resolve");

        // 2026-03-08 02:30 does not exist in New York, so it is read with EST (-05:00)
        let utc = resolve_local(local(2026, 3, 8, 2, 30), tz);
        assert_eq!(utc, Utc.with_ymd_and_hms(2026, 3, 8, 7, 30, 0).unwrap());
        assert_eq!(to_local(utc, tz), local(2026, 3, 8, 3, 30));
    }

    #[test]
    fn test_resolve_local_fold_picks_earlier() {
        // 2026-11-01 01:30 happens twice in New York
        let utc = resolve_local(local(2026, 11, 1, 1, 30), Tz::America__New_York);
        assert_eq!(utc, Utc.with_ymd_and_hms(2026, 11, 1, 5, 30, 0).unwrap());
    }

    #[test]
    fn test_timezone_caching() {
        let mut resolver = TimeZoneResolver::new();

        resolver
            .resolve("America/New_York")
            .expect("should resolve");
        assert!(resolver.cache.contains_key("America/New_York"));

        resolver
            .resolve("America/New_York")
            .expect("should resolve from cache");
    }
}
