//! Raw slot sequence of a series: rule output merged with extra dates.

use almanac_rfc::error::RfcResult;
use almanac_rfc::rfc::ical::expand::{RuleExpander, TimeZoneResolver};
use chrono::NaiveDateTime;
use std::collections::VecDeque;

use super::slot::{SeriesAnchor, SlotKey};
use crate::calendar::model::MasterEvent;

/// One raw slot: its key and its wall-clock start in the series zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub key: SlotKey,
    pub local: NaiveDateTime,
}

/// Strictly increasing sequence of raw slots.
#[derive(Debug, Clone)]
pub struct Candidates {
    rule: RuleExpander,
    anchor: SeriesAnchor,
    extra: VecDeque<Candidate>,
    pending: Option<Candidate>,
    last: Option<SlotKey>,
}

impl Candidates {
    /// ## Summary
    /// Combines the rule expansion with the master's extra dates.
    ///
    /// ## Errors
    /// Returns an error if an extra date names an unknown timezone.
    pub fn new(
        master: &MasterEvent,
        rule: RuleExpander,
        anchor: SeriesAnchor,
        resolver: &mut TimeZoneResolver,
    ) -> RfcResult<Self> {
        let mut extra = Vec::with_capacity(master.recurrence_dates.len());
        for value in &master.recurrence_dates {
            let key = anchor.key_of(value, resolver)?;
            extra.push(Candidate {
                key,
                local: anchor.local_of(key),
            });
        }
        extra.sort_unstable_by_key(|candidate| candidate.key);
        extra.dedup_by_key(|candidate| candidate.key);

        Ok(Self {
            rule,
            anchor,
            extra: extra.into(),
            pending: None,
            last: None,
        })
    }

    fn next_from_rule(&mut self) -> Option<Candidate> {
        self.pending.take().or_else(|| {
            self.rule.next().map(|local| Candidate {
                key: self.anchor.key_of_local(local),
                local,
            })
        })
    }

    fn next_merged(&mut self) -> Option<Candidate> {
        let from_rule = self.next_from_rule();
        match (from_rule, self.extra.front().copied()) {
            (Some(rule), Some(extra)) if extra.key < rule.key => {
                self.pending = Some(rule);
                self.extra.pop_front()
            }
            (Some(rule), Some(extra)) if extra.key == rule.key => {
                self.extra.pop_front();
                Some(rule)
            }
            (Some(rule), _) => Some(rule),
            (None, _) => self.extra.pop_front(),
        }
    }
}

impl Iterator for Candidates {
    type Item = Candidate;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let candidate = self.next_merged()?;
            // Distinct wall-clock times can share an instant around DST gaps
            if self.last.is_some_and(|last| candidate.key <= last) {
                continue;
            }
            self.last = Some(candidate.key);
            return Some(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use almanac_rfc::rfc::ical::core::EventTime;
    use almanac_rfc::rfc::ical::parse::parse_rrule;
    use chrono::{NaiveDate, TimeZone, Utc};
    use chrono_tz::Tz;

    fn local(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2008, 10, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_extra_dates_merge_in_order_without_duplicates() {
        let mut master = MasterEvent::new(
            "rdate",
            "FREQ=DAILY;INTERVAL=2;COUNT=3",
            EventTime::floating(local(1, 9)),
            EventTime::floating(local(1, 10)),
        );
        master.add_recurrence_date(EventTime::floating(local(4, 12)));
        master.add_recurrence_date(EventTime::floating(local(3, 9)));
        master.add_recurrence_date(EventTime::utc(
            Utc.with_ymd_and_hms(2008, 10, 10, 9, 0, 0).unwrap(),
        ));

        let mut resolver = TimeZoneResolver::new();
        let anchor = SeriesAnchor::new(&master, Tz::UTC, &mut resolver).unwrap();
        let rule = parse_rrule(&master.rrule).unwrap();
        let expander = RuleExpander::new(&rule, master.start.local(), anchor.zone(), 1000);
        let candidates = Candidates::new(&master, expander, anchor, &mut resolver).unwrap();

        let locals: Vec<_> = candidates.map(|candidate| candidate.local).collect();
        assert_eq!(
            locals,
            vec![local(1, 9), local(3, 9), local(4, 12), local(5, 9), local(10, 9)]
        );
    }
}
