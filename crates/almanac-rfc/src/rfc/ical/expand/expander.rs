//! Lazy expansion of a recurrence rule into wall-clock start times.
//!
//! The rule is evaluated one period at a time (a year, month, week or day
//! depending on FREQ). Each period yields the set of matching days, which is
//! narrowed by BYSETPOS and then handed out in order.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use std::collections::VecDeque;

use super::timezone::{resolve_local, to_local};
use crate::rfc::ical::core::{Frequency, RecurrenceRule, RuleUntil, Weekday, WeekdayNum};

/// Span within which BYDAY ordinals are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OrdinalScope {
    Month,
    Year,
}

/// Inclusive upper bound, prepared for comparisons against local candidates.
#[derive(Debug, Clone, Copy)]
enum Until {
    Date(NaiveDate),
    Local(NaiveDateTime),
    Instant(DateTime<Utc>),
}

/// Iterator over the start times generated by a [`RecurrenceRule`].
///
/// Times are wall-clock values in the series timezone. Candidates before the
/// series start are skipped; the start itself is only produced when it
/// matches the rule.
#[derive(Debug, Clone)]
pub struct RuleExpander {
    freq: Frequency,
    interval: u32,
    count: Option<u32>,
    until: Option<Until>,
    months: Vec<u32>,
    monthdays: Vec<i32>,
    weekdays: Vec<WeekdayNum>,
    setpos: Vec<i32>,
    scope: OrdinalScope,
    start: NaiveDateTime,
    zone: Tz,
    empty_limit: u32,
    period: Option<NaiveDate>,
    buffer: VecDeque<NaiveDateTime>,
    produced: u32,
    empty_periods: u32,
    done: bool,
}

impl RuleExpander {
    /// ## Summary
    /// Creates an expander for `rule` anchored at `start`.
    ///
    /// `zone` is the series timezone. It is only consulted to compare
    /// candidates against a UTC `UNTIL`. Expansion stops once more than
    /// `max_empty_periods` consecutive periods produce nothing, but never
    /// before the empty run spans a full 400-year Gregorian cycle. After
    /// that many periods the calendar repeats, so a rule that stays silent
    /// that long can never match again.
    #[must_use]
    pub fn new(rule: &RecurrenceRule, start: NaiveDateTime, zone: Tz, max_empty_periods: u32) -> Self {
        let start_date = start.date();
        let mut months: Vec<u32> = rule.by_month.iter().map(|m| u32::from(*m)).collect();
        let mut monthdays: Vec<i32> = rule.by_monthday.iter().map(|d| i32::from(*d)).collect();
        let mut weekdays = rule.by_day.clone();

        // Without day selectors the start supplies them
        if weekdays.is_empty() && monthdays.is_empty() {
            let start_day = i32::try_from(start_date.day()).unwrap_or(1);
            match rule.freq {
                Frequency::Yearly => {
                    if months.is_empty() {
                        months.push(start_date.month());
                    }
                    monthdays.push(start_day);
                }
                Frequency::Monthly => monthdays.push(start_day),
                Frequency::Weekly => {
                    weekdays.push(WeekdayNum::every(Weekday::from_chrono(start_date.weekday())));
                }
                _ => {}
            }
        }

        let scope = if rule.freq == Frequency::Yearly && rule.by_month.is_empty() {
            OrdinalScope::Year
        } else {
            OrdinalScope::Month
        };

        let until = rule.until.map(|until| match until {
            RuleUntil::Date(date) => Until::Date(date),
            RuleUntil::Floating(local) => Until::Local(local),
            RuleUntil::Utc(instant) => Until::Instant(instant),
        });

        let period = first_period(rule.freq, start_date, rule.week_start());

        Self {
            freq: rule.freq,
            interval: rule.interval.max(1),
            count: rule.count,
            until,
            months,
            monthdays,
            weekdays,
            setpos: rule.by_setpos.iter().map(|p| i32::from(*p)).collect(),
            scope,
            start,
            zone,
            empty_limit: max_empty_periods.max(cycle_periods(rule.freq)),
            period,
            buffer: VecDeque::new(),
            produced: 0,
            empty_periods: 0,
            done: false,
        }
    }

    /// Returns the period following `anchor`, or `None` past the calendar range.
    fn advance(&self, anchor: NaiveDate) -> Option<NaiveDate> {
        match self.freq {
            Frequency::Yearly => i32::try_from(self.interval)
                .ok()
                .and_then(|step| anchor.year().checked_add(step))
                .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1)),
            Frequency::Monthly => anchor.checked_add_months(Months::new(self.interval)),
            Frequency::Weekly => self
                .interval
                .checked_mul(7)
                .and_then(|days| anchor.checked_add_days(Days::new(u64::from(days)))),
            _ => anchor.checked_add_days(Days::new(u64::from(self.interval))),
        }
    }

    /// Returns the days covered by the period starting at `anchor`.
    fn period_days(&self, anchor: NaiveDate) -> impl Iterator<Item = NaiveDate> {
        let length = match self.freq {
            Frequency::Yearly => days_in_year(anchor.year()),
            Frequency::Monthly => days_in_month(anchor),
            Frequency::Weekly => 7,
            _ => 1,
        };
        anchor
            .iter_days()
            .take(usize::try_from(length).unwrap_or(usize::MAX))
    }

    fn matches(&self, date: NaiveDate) -> bool {
        if !self.months.is_empty() && !self.months.contains(&date.month()) {
            return false;
        }
        if !self.monthdays.is_empty() && !self.monthdays.iter().any(|d| monthday_matches(date, *d)) {
            return false;
        }
        self.weekdays.is_empty()
            || self
                .weekdays
                .iter()
                .any(|entry| weekday_matches(date, *entry, self.scope))
    }

    /// Computes the candidates of one period, applying BYSETPOS and the
    /// series start.
    fn candidates(&self, anchor: NaiveDate) -> Vec<NaiveDateTime> {
        let time = self.start.time();
        let days: Vec<NaiveDateTime> = self
            .period_days(anchor)
            .filter(|date| self.matches(*date))
            .map(|date| date.and_time(time))
            .collect();

        let mut selected = if self.setpos.is_empty() {
            days
        } else {
            let len = i32::try_from(days.len()).unwrap_or(i32::MAX);
            let mut picked: Vec<NaiveDateTime> = self
                .setpos
                .iter()
                .filter_map(|pos| {
                    let idx = if *pos > 0 { pos - 1 } else { len + pos };
                    usize::try_from(idx).ok().and_then(|idx| days.get(idx).copied())
                })
                .collect();
            picked.sort_unstable();
            picked.dedup();
            picked
        };

        selected.retain(|candidate| *candidate >= self.start);
        selected
    }

    fn within_until(&self, candidate: NaiveDateTime) -> bool {
        match self.until {
            None => true,
            Some(Until::Date(date)) => candidate.date() <= date,
            Some(Until::Local(local)) => candidate <= local,
            Some(Until::Instant(instant)) => resolve_local(candidate, self.zone) <= instant,
        }
    }

    /// Returns whether every day of the period starting at `anchor` lies
    /// past UNTIL.
    fn period_after_until(&self, anchor: NaiveDate) -> bool {
        match self.until {
            None => false,
            Some(Until::Date(date)) => anchor > date,
            Some(Until::Local(local)) => anchor > local.date(),
            Some(Until::Instant(instant)) => {
                anchor > to_local(instant, self.zone).date().succ_opt().unwrap_or(NaiveDate::MAX)
            }
        }
    }

    fn fill_next_period(&mut self) {
        let Some(anchor) = self.period else {
            self.done = true;
            return;
        };
        self.period = self.advance(anchor);

        if self.period_after_until(anchor) {
            self.done = true;
            return;
        }

        let candidates = self.candidates(anchor);
        if candidates.is_empty() {
            self.empty_periods += 1;
            if self.empty_periods > self.empty_limit {
                tracing::debug!(
                    empty_periods = self.empty_periods,
                    period = %anchor,
                    "Recurrence rule produced no instances, stopping expansion"
                );
                self.done = true;
            }
            return;
        }
        self.empty_periods = 0;

        for candidate in candidates {
            if self.count.is_some_and(|count| self.produced >= count) || !self.within_until(candidate) {
                self.done = true;
                return;
            }
            self.produced += 1;
            self.buffer.push_back(candidate);
        }

        if self.count.is_some_and(|count| self.produced >= count) {
            self.done = true;
        }
    }
}

impl Iterator for RuleExpander {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(next) = self.buffer.pop_front() {
                return Some(next);
            }
            if self.done {
                return None;
            }
            self.fill_next_period();
        }
    }
}

/// Number of unit periods in one 400-year Gregorian cycle.
fn cycle_periods(freq: Frequency) -> u32 {
    match freq {
        Frequency::Yearly => 400,
        Frequency::Monthly => 4_800,
        Frequency::Weekly => 20_871,
        _ => 146_097,
    }
}

fn first_period(freq: Frequency, start: NaiveDate, week_start: Weekday) -> Option<NaiveDate> {
    match freq {
        Frequency::Yearly => NaiveDate::from_ymd_opt(start.year(), 1, 1),
        Frequency::Monthly => start.with_day(1),
        Frequency::Weekly => {
            let offset = (7 + start.weekday().num_days_from_monday()
                - week_start.to_chrono().num_days_from_monday())
                % 7;
            start.checked_sub_days(Days::new(u64::from(offset)))
        }
        _ => Some(start),
    }
}

fn days_in_year(year: i32) -> u32 {
    if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366
    } else {
        365
    }
}

fn days_in_month(date: NaiveDate) -> u32 {
    date.with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next| next.pred_opt())
        .map_or(31, |last| last.day())
}

/// Matches a BYMONTHDAY value; negative values count from the month end.
fn monthday_matches(date: NaiveDate, monthday: i32) -> bool {
    let day = i32::try_from(date.day()).unwrap_or(0);
    if monthday > 0 {
        day == monthday
    } else {
        let len = i32::try_from(days_in_month(date)).unwrap_or(0);
        day == len + monthday + 1
    }
}

/// Matches a BYDAY entry, counting ordinals within the month or the year.
fn weekday_matches(date: NaiveDate, entry: WeekdayNum, scope: OrdinalScope) -> bool {
    if Weekday::from_chrono(date.weekday()) != entry.weekday {
        return false;
    }
    let Some(ordinal) = entry.ordinal else {
        return true;
    };

    let (index, len) = match scope {
        OrdinalScope::Month => (date.day(), days_in_month(date)),
        OrdinalScope::Year => (date.ordinal(), days_in_year(date.year())),
    };
    let from_start = i32::try_from((index - 1) / 7 + 1).unwrap_or(0);
    let from_end = i32::try_from((len - index) / 7 + 1).unwrap_or(0);
    let ordinal = i32::from(ordinal);

    ordinal == from_start || ordinal == -from_end
}
