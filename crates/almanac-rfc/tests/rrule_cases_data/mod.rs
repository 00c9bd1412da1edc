use almanac_rfc::rfc::ical::core::EventTime;
use almanac_rfc::rfc::ical::expand::{RuleExpander, TimeZoneResolver, resolve_local};
use almanac_rfc::rfc::ical::parse::{parse_event_time, parse_rrule};
use chrono::{DateTime, FixedOffset};
use chrono_tz::Tz;
use rrule::RRuleSet;

pub struct RRuleCase {
    pub name: &'static str,
    pub dtstart: &'static str,
    pub rrule: &'static str,
    pub expected: Option<&'static [&'static str]>,
    pub expected_len: Option<usize>,
    pub limit: u16,
}

#[expect(clippy::too_many_lines)]
pub fn rrule_cases() -> Vec<RRuleCase> {
    vec![
        RRuleCase {
            name: "daily_basic",
            dtstart: "DTSTART:20120201T093000Z",
            rrule: "FREQ=DAILY;COUNT=3",
            expected: Some(&[
                "2012-02-01T09:30:00+00:00",
                "2012-02-02T09:30:00+00:00",
                "2012-02-03T09:30:00+00:00",
            ]),
            expected_len: None,
            limit: 100,
        },
        RRuleCase {
            name: "weekly_basic",
            dtstart: "DTSTART:19970902T090000Z",
            rrule: "FREQ=WEEKLY;COUNT=3;BYDAY=TU,TH",
            expected: Some(&[
                "1997-09-02T09:00:00+00:00",
                "1997-09-04T09:00:00+00:00",
                "1997-09-09T09:00:00+00:00",
            ]),
            expected_len: None,
            limit: 100,
        },
        RRuleCase {
            name: "weekly_interval_week_start",
            dtstart: "DTSTART;TZID=America/New_York:19970805T090000",
            rrule: "FREQ=WEEKLY;INTERVAL=2;COUNT=4;BYDAY=TU,SU;WKST=SU",
            expected: Some(&[
                "1997-08-05T13:00:00+00:00",
                "1997-08-17T13:00:00+00:00",
                "1997-08-19T13:00:00+00:00",
                "1997-08-31T13:00:00+00:00",
            ]),
            expected_len: None,
            limit: 100,
        },
        RRuleCase {
            name: "daily_sparse_leap_day",
            dtstart: "DTSTART:20240229T090000Z",
            rrule: "FREQ=DAILY;COUNT=3;BYMONTH=2;BYMONTHDAY=29",
            expected: Some(&[
                "2024-02-29T09:00:00+00:00",
                "2028-02-29T09:00:00+00:00",
                "2032-02-29T09:00:00+00:00",
            ]),
            expected_len: None,
            limit: 100,
        },
        RRuleCase {
            name: "monthly_basic",
            dtstart: "DTSTART:20120101T090000Z",
            rrule: "FREQ=MONTHLY;COUNT=3;BYMONTHDAY=1",
            expected: Some(&[
                "2012-01-01T09:00:00+00:00",
                "2012-02-01T09:00:00+00:00",
                "2012-03-01T09:00:00+00:00",
            ]),
            expected_len: None,
            limit: 100,
        },
        RRuleCase {
            name: "monthly_skips_short_months",
            dtstart: "DTSTART:20260131T090000Z",
            rrule: "FREQ=MONTHLY;COUNT=4",
            expected: Some(&[
                "2026-01-31T09:00:00+00:00",
                "2026-03-31T09:00:00+00:00",
                "2026-05-31T09:00:00+00:00",
                "2026-07-31T09:00:00+00:00",
            ]),
            expected_len: None,
            limit: 100,
        },
        RRuleCase {
            name: "monthly_last_workday",
            dtstart: "DTSTART:20260130T090000Z",
            rrule: "FREQ=MONTHLY;COUNT=3;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-1",
            expected: Some(&[
                "2026-01-30T09:00:00+00:00",
                "2026-02-27T09:00:00+00:00",
                "2026-03-31T09:00:00+00:00",
            ]),
            expected_len: None,
            limit: 100,
        },
        RRuleCase {
            name: "yearly_basic",
            dtstart: "DTSTART:20120101T090000Z",
            rrule: "FREQ=YEARLY;COUNT=3",
            expected: Some(&[
                "2012-01-01T09:00:00+00:00",
                "2013-01-01T09:00:00+00:00",
                "2014-01-01T09:00:00+00:00",
            ]),
            expected_len: None,
            limit: 100,
        },
        RRuleCase {
            name: "yearly_leap_day",
            dtstart: "DTSTART:20240229T000000Z",
            rrule: "FREQ=YEARLY;COUNT=3",
            expected: Some(&[
                "2024-02-29T00:00:00+00:00",
                "2028-02-29T00:00:00+00:00",
                "2032-02-29T00:00:00+00:00",
            ]),
            expected_len: None,
            limit: 100,
        },
        RRuleCase {
            name: "yearly_nth_weekday_in_month",
            dtstart: "DTSTART:20261126T120000Z",
            rrule: "FREQ=YEARLY;COUNT=3;BYMONTH=11;BYDAY=4TH",
            expected: Some(&[
                "2026-11-26T12:00:00+00:00",
                "2027-11-25T12:00:00+00:00",
                "2028-11-23T12:00:00+00:00",
            ]),
            expected_len: None,
            limit: 100,
        },
        RRuleCase {
            name: "daily_interval_until",
            dtstart: "DTSTART:20260101T090000Z",
            rrule: "FREQ=DAILY;INTERVAL=10;UNTIL=20260201T000000Z",
            expected: Some(&[
                "2026-01-01T09:00:00+00:00",
                "2026-01-11T09:00:00+00:00",
                "2026-01-21T09:00:00+00:00",
                "2026-01-31T09:00:00+00:00",
            ]),
            expected_len: None,
            limit: 100,
        },
        RRuleCase {
            name: "dst_transition",
            dtstart: "DTSTART;TZID=America/New_York:20210313T090000",
            rrule: "FREQ=DAILY;COUNT=3",
            expected: Some(&[
                "2021-03-13T14:00:00+00:00",
                "2021-03-14T13:00:00+00:00",
                "2021-03-15T13:00:00+00:00",
            ]),
            expected_len: None,
            limit: 100,
        },
        RRuleCase {
            name: "yearly_until_in_zone",
            dtstart: "DTSTART;TZID=America/New_York:19980101T090000",
            rrule: "FREQ=YEARLY;UNTIL=20000131T140000Z;BYMONTH=1;BYDAY=SU,MO,TU,WE,TH,FR,SA",
            expected: None,
            expected_len: Some(93),
            limit: 200,
        },
    ]
}

/// Splits a `DTSTART` line into its value and optional TZID.
fn split_dtstart(line: &str) -> (&str, Option<&str>) {
    let rest = line.trim_start_matches("DTSTART");
    match rest.strip_prefix(";TZID=") {
        Some(zoned) => {
            let (tzid, value) = zoned.split_once(':').expect("TZID line has a value");
            (value, Some(tzid))
        }
        None => (rest.trim_start_matches(':'), None),
    }
}

fn expand_native(case: &RRuleCase) -> Vec<i64> {
    let (value, tzid) = split_dtstart(case.dtstart);
    let start = parse_event_time(value, tzid)
        .unwrap_or_else(|err| panic!("Failed to parse DTSTART of {}: {}", case.name, err));
    let zone = match &start {
        EventTime::Zoned { tzid, .. } => TimeZoneResolver::new()
            .resolve(tzid)
            .unwrap_or_else(|err| panic!("Failed to resolve zone of {}: {}", case.name, err)),
        _ => Tz::UTC,
    };
    let rule = parse_rrule(case.rrule)
        .unwrap_or_else(|err| panic!("Failed to parse {}: {}", case.name, err));

    RuleExpander::new(&rule, start.local(), zone, 1000)
        .take(usize::from(case.limit))
        .map(|local| resolve_local(local, zone).timestamp())
        .collect()
}

fn expand_oracle(case: &RRuleCase) -> Vec<i64> {
    let text = format!("{}\nRRULE:{}", case.dtstart, case.rrule);
    let rrule_set: RRuleSet = text
        .parse()
        .unwrap_or_else(|err| panic!("Oracle failed to parse {}: {}", case.name, err));

    rrule_set
        .all(case.limit)
        .dates
        .iter()
        .map(chrono::DateTime::timestamp)
        .collect()
}

pub fn assert_case(case: &RRuleCase) {
    let actual_timestamps = expand_native(case);

    assert_eq!(
        actual_timestamps,
        expand_oracle(case),
        "Case {} disagrees with the reference expansion",
        case.name
    );

    if let Some(expected) = case.expected {
        let expected_timestamps: Vec<i64> = expected
            .iter()
            .map(|value| parse_rfc3339(value).timestamp())
            .collect();
        assert_eq!(
            actual_timestamps, expected_timestamps,
            "Case {} did not match",
            case.name
        );
    }

    if let Some(expected_len) = case.expected_len {
        assert_eq!(
            actual_timestamps.len(),
            expected_len,
            "Case {} expected {} occurrences",
            case.name,
            expected_len
        );
    }
}

fn parse_rfc3339(value: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(value).unwrap_or_else(|err| {
        panic!("Failed to parse rfc3339 value {value}: {err}")
    })
}
