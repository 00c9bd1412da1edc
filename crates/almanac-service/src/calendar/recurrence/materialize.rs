//! Builds concrete occurrences from the master or a change exception.

use almanac_core::types::OccurrenceKind;
use almanac_rfc::error::RfcResult;
use almanac_rfc::rfc::ical::core::EventTime;
use almanac_rfc::rfc::ical::expand::{TimeZoneResolver, to_local};
use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use chrono_tz::Tz;

use super::slot::{SeriesAnchor, SlotKey, place};
use crate::calendar::model::{ChangeException, MasterEvent, Occurrence, RecurrenceId};

/// How the end of a regular occurrence follows its start.
#[derive(Debug, Clone, Copy)]
enum EndShift {
    /// Start and end share form and zone: keep the wall-clock span.
    WallClock(TimeDelta),
    /// Mixed forms: keep the absolute span and render the end in its own zone.
    Absolute { span: TimeDelta, end_zone: Tz },
}

/// Produces occurrences of one series.
#[derive(Debug)]
pub struct Materializer<'a> {
    master: &'a MasterEvent,
    anchor: SeriesAnchor,
    end_shift: EndShift,
}

impl<'a> Materializer<'a> {
    /// ## Summary
    /// Prepares occurrence construction for `master`.
    ///
    /// ## Errors
    /// Returns an error if the master's start or end names an unknown timezone.
    pub fn new(
        master: &'a MasterEvent,
        anchor: SeriesAnchor,
        resolver: &mut TimeZoneResolver,
    ) -> RfcResult<Self> {
        let end_shift = if master.start.same_form(&master.end) {
            EndShift::WallClock(master.start.wall_clock_until(&master.end))
        } else {
            let context = anchor.context();
            let span = place(&master.end, context, resolver)?
                .signed_duration_since(place(&master.start, context, resolver)?);
            let end_zone = match &master.end {
                EventTime::Zoned { tzid, .. } => resolver.resolve(tzid)?,
                EventTime::Utc { .. } => Tz::UTC,
                EventTime::Date { .. } | EventTime::Floating { .. } => context,
            };
            EndShift::Absolute { span, end_zone }
        };

        Ok(Self {
            master,
            anchor,
            end_shift,
        })
    }

    /// Builds the unmodified occurrence of a slot.
    #[must_use]
    pub fn regular(&self, key: SlotKey, local: NaiveDateTime, position: usize) -> Occurrence {
        let start = self.master.start.with_local(local);
        let end = match self.end_shift {
            EndShift::WallClock(span) => self
                .master
                .end
                .with_local(local.checked_add_signed(span).unwrap_or(local)),
            EndShift::Absolute { span, end_zone } => {
                let slot_start = self.anchor.slot_start(key);
                self.end_in_form(slot_start.checked_add_signed(span).unwrap_or(slot_start), end_zone)
            }
        };

        Occurrence {
            series_id: self.master.id,
            uid: self.master.uid.clone(),
            recurrence_id: RecurrenceId::new(start.clone()),
            start,
            end,
            kind: OccurrenceKind::Regular,
            position,
            exception_id: None,
            fields: self.master.fields.clone(),
        }
    }

    /// Builds the occurrence replacing a slot. The exception's own times are
    /// used as given.
    #[must_use]
    pub fn exception(&self, exception: &ChangeException, position: usize) -> Occurrence {
        Occurrence {
            series_id: self.master.id,
            uid: self.master.uid.clone(),
            recurrence_id: exception.recurrence_id.clone(),
            start: exception.start.clone(),
            end: exception.end.clone(),
            kind: OccurrenceKind::Exception,
            position,
            exception_id: Some(exception.id),
            fields: exception.fields.merged_over(&self.master.fields),
        }
    }

    /// Renders an instant in the form of the master's end.
    fn end_in_form(&self, instant: DateTime<Utc>, end_zone: Tz) -> EventTime {
        match &self.master.end {
            EventTime::Utc { .. } => EventTime::utc(instant),
            EventTime::Zoned { tzid, .. } => EventTime::zoned(to_local(instant, end_zone), tzid.clone()),
            EventTime::Floating { .. } => EventTime::floating(to_local(instant, end_zone)),
            EventTime::Date { .. } => EventTime::date(to_local(instant, end_zone).date()),
        }
    }
}
