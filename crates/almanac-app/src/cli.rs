//! Command line arguments.

use chrono::{DateTime, Utc};
use clap::Parser;
use std::path::PathBuf;
use uuid::Uuid;

/// Expands recurring calendar series into occurrences, one JSON object per line.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(name = "almanac", version, about)]
pub struct CliArgs {
    /// JSON calendar file to read
    pub input: PathBuf,

    /// Skip occurrences whose original slot ends before this instant (RFC 3339)
    #[arg(long, value_parser = parse_instant)]
    pub from: Option<DateTime<Utc>>,

    /// Stop at the first original slot starting at or after this instant (RFC 3339)
    #[arg(long, value_parser = parse_instant)]
    pub to: Option<DateTime<Utc>>,

    /// Maximum number of occurrences per series
    #[arg(long)]
    pub limit: Option<usize>,

    /// Only expand the series with this id
    #[arg(long)]
    pub series: Option<Uuid>,
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_parse_full_invocation() {
        let parsed = CliArgs::try_parse_from([
            "almanac",
            "calendar.json",
            "--from",
            "2008-10-01T00:00:00Z",
            "--to",
            "2008-10-04T02:00:00+02:00",
            "--limit",
            "3",
            "--series",
            "67e55044-10b1-426f-9247-bb680e5fe0c8",
        ])
        .unwrap();

        assert_eq!(parsed.input, PathBuf::from("calendar.json"));
        assert_eq!(parsed.from, Some(Utc.with_ymd_and_hms(2008, 10, 1, 0, 0, 0).unwrap()));
        assert_eq!(parsed.to, Some(Utc.with_ymd_and_hms(2008, 10, 4, 0, 0, 0).unwrap()));
        assert_eq!(parsed.limit, Some(3));
        assert_eq!(
            parsed.series,
            Some(Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap())
        );
    }

    #[test]
    fn test_only_input_is_required() {
        let parsed = CliArgs::try_parse_from(["almanac", "calendar.json"]).unwrap();
        assert_eq!(parsed.from, None);
        assert_eq!(parsed.limit, None);
        assert_eq!(parsed.series, None);
    }

    #[test]
    fn test_bad_invocations_are_rejected() {
        for bad in [
            vec!["almanac"],
            vec!["almanac", "calendar.json", "--limit"],
            vec!["almanac", "calendar.json", "--limit", "many"],
            vec!["almanac", "calendar.json", "--from", "yesterday"],
            vec!["almanac", "calendar.json", "--series", "not-a-uuid"],
            vec!["almanac", "calendar.json", "--verbose"],
            vec!["almanac", "a.json", "b.json"],
        ] {
            assert!(CliArgs::try_parse_from(bad).is_err());
        }
    }
}
