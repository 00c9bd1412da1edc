//! Delete and change exception lookup keyed by slot.

use almanac_rfc::error::RfcResult;
use almanac_rfc::rfc::ical::expand::TimeZoneResolver;
use std::collections::{HashMap, HashSet};

use super::slot::{SeriesAnchor, SlotKey};
use crate::calendar::model::{ChangeException, MasterEvent};

/// Outcome of looking up one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// No exception applies.
    Regular,
    /// The slot was deleted.
    Deleted,
    /// The slot was replaced.
    Changed(&'a ChangeException),
}

/// Exceptions of one series, normalized to slot keys.
#[derive(Debug, Default)]
pub struct ExceptionIndex<'a> {
    deleted: HashSet<SlotKey>,
    changed: HashMap<SlotKey, &'a ChangeException>,
}

impl<'a> ExceptionIndex<'a> {
    /// ## Summary
    /// Normalizes the master's delete exceptions and the given change
    /// exceptions against the series anchor.
    ///
    /// When several change exceptions share a slot the first one is kept.
    ///
    /// ## Errors
    /// Returns an error if a recurrence id names an unknown timezone.
    ///
    /// ## Side Effects
    /// Logs a warning for every ignored duplicate change exception.
    pub fn build(
        master: &MasterEvent,
        change_exceptions: &'a [ChangeException],
        anchor: &SeriesAnchor,
        resolver: &mut TimeZoneResolver,
    ) -> RfcResult<Self> {
        let mut deleted = HashSet::with_capacity(master.delete_exceptions.len());
        for recurrence_id in &master.delete_exceptions {
            deleted.insert(anchor.key_of(recurrence_id.value(), resolver)?);
        }

        let mut changed: HashMap<SlotKey, &'a ChangeException> =
            HashMap::with_capacity(change_exceptions.len());
        for exception in change_exceptions {
            let key = anchor.key_of(exception.recurrence_id.value(), resolver)?;
            if let Some(kept) = changed.get(&key) {
                tracing::warn!(
                    recurrence_id = %exception.recurrence_id,
                    kept = %kept.id,
                    ignored = %exception.id,
                    "Duplicate change exception for slot, ignoring"
                );
                continue;
            }
            changed.insert(key, exception);
        }

        tracing::trace!(
            deleted = deleted.len(),
            changed = changed.len(),
            "Indexed exceptions"
        );
        Ok(Self { deleted, changed })
    }

    /// Decides what happens to a slot. Change exceptions take precedence
    /// over deletions.
    #[must_use]
    pub fn resolve(&self, key: &SlotKey) -> Resolution<'a> {
        if let Some(exception) = self.changed.get(key).copied() {
            Resolution::Changed(exception)
        } else if self.deleted.contains(key) {
            Resolution::Deleted
        } else {
            Resolution::Regular
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::model::{EventFields, RecurrenceId};
    use almanac_rfc::rfc::ical::core::EventTime;
    use chrono::{NaiveDate, NaiveDateTime};
    use chrono_tz::Tz;

    fn local(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2008, 10, d)
            .unwrap()
            .and_hms_opt(h, 45, 0)
            .unwrap()
    }

    fn floating(d: u32, h: u32) -> EventTime {
        EventTime::floating(local(d, h))
    }

    #[test_log::test]
    fn test_change_beats_delete_and_first_duplicate_wins() {
        let mut master = MasterEvent::new("uid", "FREQ=DAILY", floating(1, 14), floating(1, 15));
        master.add_delete_exception(RecurrenceId::new(floating(3, 14)));
        master.add_delete_exception(RecurrenceId::new(floating(4, 14)));

        let exceptions = vec![
            ChangeException::new(floating(3, 14), floating(3, 18), floating(3, 19))
                .with_fields(EventFields::with_summary("first")),
            ChangeException::new(floating(3, 14), floating(3, 20), floating(3, 21))
                .with_fields(EventFields::with_summary("second")),
        ];

        let mut resolver = TimeZoneResolver::new();
        let anchor = SeriesAnchor::new(&master, Tz::UTC, &mut resolver).unwrap();
        let index = ExceptionIndex::build(&master, &exceptions, &anchor, &mut resolver).unwrap();

        match index.resolve(&anchor.key_of_local(local(3, 14))) {
            Resolution::Changed(exception) => assert_eq!(exception.id, exceptions[0].id),
            other => panic!("expected change exception, got {other:?}"),
        }
        assert_eq!(
            index.resolve(&anchor.key_of_local(local(4, 14))),
            Resolution::Deleted
        );
        assert_eq!(
            index.resolve(&anchor.key_of_local(local(5, 14))),
            Resolution::Regular
        );
    }
}
