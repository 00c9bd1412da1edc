//! Canonical slot keys for comparing occurrence starts across representations.

use almanac_rfc::error::RfcResult;
use almanac_rfc::rfc::ical::core::EventTime;
use almanac_rfc::rfc::ical::expand::{TimeZoneResolver, resolve_local, to_local};
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use chrono_tz::Tz;

use crate::calendar::model::MasterEvent;

/// Canonical identity of one occurrence within a series.
///
/// Full-day series are keyed by date, timed series by UTC instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SlotKey {
    Day(NaiveDate),
    Instant(DateTime<Utc>),
}

/// Length of every slot of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotSpan {
    /// Full-day series ending on a date.
    Days(u64),
    /// Absolute span between start and end.
    Duration(TimeDelta),
}

/// ## Summary
/// Places any event time on the timeline.
///
/// Full-day values start at midnight and floating values are read in
/// `context`. Zoned values go through their own timezone.
///
/// ## Errors
/// Returns an error if a zoned value names an unknown timezone.
pub fn place(
    value: &EventTime,
    context: Tz,
    resolver: &mut TimeZoneResolver,
) -> RfcResult<DateTime<Utc>> {
    Ok(match value {
        EventTime::Date { date } => resolve_local(date.and_time(NaiveTime::MIN), context),
        EventTime::Floating { local } => resolve_local(*local, context),
        EventTime::Utc { instant } => *instant,
        EventTime::Zoned { local, tzid } => resolve_local(*local, resolver.resolve(tzid)?),
    })
}

/// Everything needed to turn event times of one series into slot keys.
#[derive(Debug, Clone, Copy)]
pub struct SeriesAnchor {
    zone: Tz,
    context: Tz,
    all_day: bool,
    start_time: NaiveTime,
    span: SlotSpan,
}

impl SeriesAnchor {
    /// ## Summary
    /// Derives the anchor of `master`'s series.
    ///
    /// The series zone is the start's own timezone, UTC for UTC starts and
    /// `context` for floating and full-day starts.
    ///
    /// ## Errors
    /// Returns an error if the start or end names an unknown timezone.
    pub fn new(
        master: &MasterEvent,
        context: Tz,
        resolver: &mut TimeZoneResolver,
    ) -> RfcResult<Self> {
        let zone = match &master.start {
            EventTime::Utc { .. } => Tz::UTC,
            EventTime::Zoned { tzid, .. } => resolver.resolve(tzid)?,
            EventTime::Date { .. } | EventTime::Floating { .. } => context,
        };
        let all_day = master.start.is_all_day();

        let span = match (&master.start, &master.end) {
            (EventTime::Date { date: start }, EventTime::Date { date: end }) => SlotSpan::Days(
                u64::try_from(end.signed_duration_since(*start).num_days()).unwrap_or(0),
            ),
            (start, end) => {
                let span = place(end, context, resolver)?
                    .signed_duration_since(place(start, context, resolver)?);
                SlotSpan::Duration(span.max(TimeDelta::zero()))
            }
        };

        Ok(Self {
            zone,
            context,
            all_day,
            start_time: master.start.local().time(),
            span,
        })
    }

    /// Series timezone that rule expansion runs in.
    #[must_use]
    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// Timezone for floating and full-day values.
    #[must_use]
    pub fn context(&self) -> Tz {
        self.context
    }

    #[must_use]
    pub fn is_all_day(&self) -> bool {
        self.all_day
    }

    /// Returns the key of a wall-clock start produced by rule expansion.
    #[must_use]
    pub fn key_of_local(&self, local: NaiveDateTime) -> SlotKey {
        if self.all_day {
            SlotKey::Day(local.date())
        } else {
            SlotKey::Instant(resolve_local(local, self.zone))
        }
    }

    /// ## Summary
    /// Normalizes a recurrence id or extra start of any form to a slot key.
    ///
    /// ## Errors
    /// Returns an error if a zoned value names an unknown timezone.
    pub fn key_of(&self, value: &EventTime, resolver: &mut TimeZoneResolver) -> RfcResult<SlotKey> {
        if self.all_day {
            return Ok(SlotKey::Day(match value {
                EventTime::Utc { instant } => to_local(*instant, self.context).date(),
                other => other.local_date(),
            }));
        }

        Ok(SlotKey::Instant(match value {
            EventTime::Date { date } => resolve_local(date.and_time(self.start_time), self.zone),
            EventTime::Floating { local } => resolve_local(*local, self.zone),
            EventTime::Utc { instant } => *instant,
            EventTime::Zoned { local, tzid } => resolve_local(*local, resolver.resolve(tzid)?),
        }))
    }

    /// Returns the wall-clock start in the series zone for a key.
    #[must_use]
    pub fn local_of(&self, key: SlotKey) -> NaiveDateTime {
        match key {
            SlotKey::Day(date) => date.and_time(NaiveTime::MIN),
            SlotKey::Instant(instant) => to_local(instant, self.zone),
        }
    }

    /// Returns the start of a slot on the timeline.
    #[must_use]
    pub fn slot_start(&self, key: SlotKey) -> DateTime<Utc> {
        match key {
            SlotKey::Day(date) => resolve_local(date.and_time(NaiveTime::MIN), self.context),
            SlotKey::Instant(instant) => instant,
        }
    }

    /// Returns the start and end of a slot on the timeline.
    #[must_use]
    pub fn slot_bounds(&self, key: SlotKey) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.slot_start(key);
        let end = match (self.span, key) {
            (SlotSpan::Days(days), SlotKey::Day(date)) => date
                .checked_add_days(Days::new(days))
                .map_or(start, |end| resolve_local(end.and_time(NaiveTime::MIN), self.context)),
            (SlotSpan::Days(days), SlotKey::Instant(_)) => start
                .checked_add_days(Days::new(days))
                .unwrap_or(start),
            (SlotSpan::Duration(span), _) => start.checked_add_signed(span).unwrap_or(start),
        };
        (start, end)
    }
}
