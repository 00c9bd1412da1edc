//! Writes expanded occurrences as JSON lines.

use almanac_service::calendar::service::{CalendarService, EventSource};
use std::io::Write;

use crate::cli::CliArgs;
use crate::error::AppResult;

/// ## Summary
/// Expands the requested series and writes one JSON object per occurrence
/// as soon as it is produced.
///
/// Series are written in source order. Returns the number of lines written.
///
/// ## Errors
/// Returns an error if a series is unknown, never ends under the given
/// bounds or fails to expand, or if writing fails. Lines of earlier series
/// are already written at that point.
pub fn write_occurrences<S, W>(
    calendar: &CalendarService<S>,
    args: &CliArgs,
    out: &mut W,
) -> AppResult<usize>
where
    S: EventSource,
    W: Write,
{
    let series_ids = match args.series {
        Some(id) => vec![id],
        None => calendar.series_ids()?,
    };

    let mut written = 0;
    for series_id in series_ids {
        let series = calendar.load_series(series_id)?;
        for occurrence in calendar.expand(&series, args.from, args.to, args.limit)? {
            serde_json::to_writer(&mut *out, &occurrence)?;
            writeln!(out)?;
            written += 1;
        }
        tracing::debug!(%series_id, written, "Series written");
    }
    out.flush()?;

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::input::CalendarFile;
    use almanac_service::calendar::recurrence::RecurrenceService;
    use almanac_service::calendar::service::InMemoryEventSource;
    use almanac_service::error::ServiceError;
    use chrono::{TimeZone, Utc};
    use std::path::PathBuf;
    use uuid::Uuid;

    fn calendar() -> CalendarService<InMemoryEventSource> {
        let file = CalendarFile::from_json(
            r#"{"series": [
                {"uid": "a", "rrule": "FREQ=DAILY;COUNT=3", "dtstart": "20081001T090000Z", "dtend": "20081001T100000Z"},
                {"uid": "b", "rrule": "FREQ=WEEKLY", "dtstart": "20081001", "dtend": "20081002"}
            ]}"#,
        )
        .unwrap();
        CalendarService::new(file.into_source().unwrap(), RecurrenceService::default())
    }

    fn args(limit: Option<usize>, series: Option<Uuid>) -> CliArgs {
        CliArgs {
            input: PathBuf::from("calendar.json"),
            from: None,
            to: None,
            limit,
            series,
        }
    }

    #[test_log::test]
    fn test_writes_one_line_per_occurrence() {
        let calendar = calendar();
        let mut out = Vec::new();

        let written = write_occurrences(&calendar, &args(Some(2), None), &mut out).unwrap();

        assert_eq!(written, 4);
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0]["uid"], "a");
        assert_eq!(lines[0]["kind"], "regular");
        assert_eq!(lines[1]["position"], 2);
        assert_eq!(lines[2]["uid"], "b");
        assert_eq!(lines[3]["start"]["date"], "2008-10-08");
    }

    #[test_log::test]
    fn test_range_end_bounds_endless_series() {
        let calendar = calendar();
        let mut out = Vec::new();
        let mut bounded = args(None, None);
        bounded.to = Some(Utc.with_ymd_and_hms(2008, 10, 20, 0, 0, 0).unwrap());

        let written = write_occurrences(&calendar, &bounded, &mut out).unwrap();

        // Three daily slots plus Oct 1, 8 and 15 of the weekly series
        assert_eq!(written, 6);
    }

    #[test_log::test]
    fn test_endless_series_without_bounds_is_rejected() {
        let calendar = calendar();
        let mut out = Vec::new();

        let err = write_occurrences(&calendar, &args(None, None), &mut out).unwrap_err();

        assert!(matches!(
            err,
            AppError::ServiceError(ServiceError::UnboundedQuery(ref uid)) if uid == "b"
        ));
        // The bounded series before it was streamed out in full
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 3);
    }

    #[test_log::test]
    fn test_unknown_series_is_reported() {
        let calendar = calendar();
        let mut out = Vec::new();

        let err = write_occurrences(&calendar, &args(None, Some(Uuid::new_v4())), &mut out)
            .unwrap_err();

        assert!(matches!(err, AppError::ServiceError(ServiceError::NotFound(_))));
        assert!(out.is_empty());
    }
}
