//! Entry points of the recurrence engine.

use almanac_core::config::RecurrenceConfig;
use almanac_core::constants::DEFAULT_MAX_EMPTY_PERIODS;
use almanac_rfc::error::RfcError;
use almanac_rfc::rfc::ical::expand::{RuleExpander, TimeZoneResolver};
use almanac_rfc::rfc::ical::parse::parse_rrule;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use super::candidates::Candidates;
use super::exception::{ExceptionIndex, Resolution};
use super::iterator::RecurrenceIterator;
use super::materialize::Materializer;
use super::range::RangeFilter;
use super::slot::{SeriesAnchor, place};
use crate::calendar::model::{ChangeException, MasterEvent, Occurrence, RecurrenceId};
use crate::error::{ServiceError, ServiceResult};

/// Settings shared by every expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrenceOptions {
    /// Timezone that floating and full-day values are read in.
    pub context_timezone: Tz,
    /// Consecutive empty rule periods tolerated before expansion stops.
    pub max_empty_periods: u32,
}

impl Default for RecurrenceOptions {
    fn default() -> Self {
        Self {
            context_timezone: Tz::UTC,
            max_empty_periods: DEFAULT_MAX_EMPTY_PERIODS,
        }
    }
}

/// Expands recurring series into occurrences.
///
/// Holds only immutable options; every call builds its own state.
#[derive(Debug, Clone, Default)]
pub struct RecurrenceService {
    options: RecurrenceOptions,
}

/// Raw slots of a series with everything needed to turn them into occurrences.
struct Prepared<'a> {
    anchor: SeriesAnchor,
    candidates: Candidates,
    exceptions: ExceptionIndex<'a>,
    materializer: Materializer<'a>,
}

impl RecurrenceService {
    #[must_use]
    pub fn new(options: RecurrenceOptions) -> Self {
        Self { options }
    }

    /// ## Summary
    /// Builds the service from loaded configuration.
    ///
    /// ## Errors
    /// Returns an error if the configured default timezone is unknown.
    pub fn from_config(config: &RecurrenceConfig) -> ServiceResult<Self> {
        let context_timezone = TimeZoneResolver::new()
            .resolve(&config.default_timezone)
            .map_err(RfcError::from)?;

        Ok(Self::new(RecurrenceOptions {
            context_timezone,
            max_empty_periods: config.max_empty_periods,
        }))
    }

    #[must_use]
    pub fn options(&self) -> &RecurrenceOptions {
        &self.options
    }

    fn prepare<'a>(
        &self,
        master: &'a MasterEvent,
        change_exceptions: &'a [ChangeException],
    ) -> ServiceResult<Prepared<'a>> {
        let rule = parse_rrule(&master.rrule).map_err(RfcError::from)?;
        let mut resolver = TimeZoneResolver::new();
        let context = self.options.context_timezone;

        let start = place(&master.start, context, &mut resolver)?;
        let end = place(&master.end, context, &mut resolver)?;
        if end < start {
            return Err(ServiceError::ValidationError(format!(
                "event {} ends ({}) before it starts ({})",
                master.uid, master.end, master.start
            )));
        }

        let anchor = SeriesAnchor::new(master, context, &mut resolver)?;
        let expander = RuleExpander::new(
            &rule,
            master.start.local(),
            anchor.zone(),
            self.options.max_empty_periods,
        );
        let candidates = Candidates::new(master, expander, anchor, &mut resolver)?;
        let exceptions = ExceptionIndex::build(master, change_exceptions, &anchor, &mut resolver)?;
        let materializer = Materializer::new(master, anchor, &mut resolver)?;

        tracing::trace!(
            rule = %rule,
            zone = %anchor.zone(),
            all_day = anchor.is_all_day(),
            "Prepared series"
        );

        Ok(Prepared {
            anchor,
            candidates,
            exceptions,
            materializer,
        })
    }

    /// ## Summary
    /// Expands `master` into occurrences, applying its delete exceptions and
    /// the given change exceptions.
    ///
    /// Occurrences come in the order of their original slots. A slot belongs
    /// to the window `[range_start, range_end)` when its original span
    /// overlaps it, wherever a change exception moved it. `limit` counts
    /// emitted occurrences.
    ///
    /// ## Errors
    /// Returns an error if the rule is malformed, a timezone is unknown, the
    /// master ends before it starts, `limit` is zero or `range_end` lies
    /// before `range_start`. Nothing is expanded in that case.
    pub fn calculate_instances_respect_exceptions<'a>(
        &self,
        master: &'a MasterEvent,
        range_start: Option<DateTime<Utc>>,
        range_end: Option<DateTime<Utc>>,
        limit: Option<usize>,
        change_exceptions: &'a [ChangeException],
    ) -> ServiceResult<RecurrenceIterator<'a>> {
        tracing::debug!(
            uid = %master.uid,
            range_start = ?range_start,
            range_end = ?range_end,
            limit = ?limit,
            change_exceptions = change_exceptions.len(),
            "Calculating instances"
        );

        let filter = RangeFilter::new(range_start, range_end, limit)?;
        let prepared = self.prepare(master, change_exceptions)?;

        Ok(RecurrenceIterator::new(
            prepared.anchor,
            prepared.candidates,
            prepared.exceptions,
            prepared.materializer,
            filter,
        ))
    }

    /// ## Summary
    /// Lists the recurrence ids of the series' remaining slots.
    ///
    /// ## Errors
    /// Same as [`Self::calculate_instances_respect_exceptions`].
    pub fn iterate_recurrence_ids<'a>(
        &self,
        master: &'a MasterEvent,
        range_start: Option<DateTime<Utc>>,
        range_end: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> ServiceResult<impl Iterator<Item = RecurrenceId> + use<'a>> {
        Ok(self
            .calculate_instances_respect_exceptions(master, range_start, range_end, limit, &[])?
            .map(|occurrence| occurrence.recurrence_id))
    }

    /// ## Summary
    /// Returns the 1-based position of `recurrence_id` in the raw series, or
    /// `None` if it matches no slot.
    ///
    /// ## Errors
    /// Returns an error if the rule is malformed or a timezone is unknown.
    pub fn calculate_recurrence_position(
        &self,
        master: &MasterEvent,
        recurrence_id: &RecurrenceId,
    ) -> ServiceResult<Option<usize>> {
        let mut resolver = TimeZoneResolver::new();
        let prepared = self.prepare(master, &[])?;
        let target = prepared.anchor.key_of(recurrence_id.value(), &mut resolver)?;

        for (idx, candidate) in prepared.candidates.enumerate() {
            if candidate.key == target {
                return Ok(Some(idx + 1));
            }
            if candidate.key > target {
                break;
            }
        }
        Ok(None)
    }

    /// ## Summary
    /// Looks up the single occurrence at `recurrence_id`.
    ///
    /// Returns `None` when the slot was deleted or is not part of the series.
    ///
    /// ## Errors
    /// Returns an error if the rule is malformed or a timezone is unknown.
    pub fn calculate_occurrence(
        &self,
        master: &MasterEvent,
        recurrence_id: &RecurrenceId,
        change_exceptions: &[ChangeException],
    ) -> ServiceResult<Option<Occurrence>> {
        let mut resolver = TimeZoneResolver::new();
        let prepared = self.prepare(master, change_exceptions)?;
        let target = prepared.anchor.key_of(recurrence_id.value(), &mut resolver)?;

        for (idx, candidate) in prepared.candidates.enumerate() {
            if candidate.key > target {
                break;
            }
            if candidate.key < target {
                continue;
            }
            let position = idx + 1;
            return Ok(match prepared.exceptions.resolve(&candidate.key) {
                Resolution::Deleted => None,
                Resolution::Changed(exception) => {
                    Some(prepared.materializer.exception(exception, position))
                }
                Resolution::Regular => Some(prepared.materializer.regular(
                    candidate.key,
                    candidate.local,
                    position,
                )),
            });
        }
        Ok(None)
    }

    /// ## Summary
    /// Returns whether expanding `master` without `range_end` or `limit`
    /// would never finish.
    ///
    /// ## Errors
    /// Returns an error if the rule is malformed.
    pub fn is_open_ended(
        &self,
        master: &MasterEvent,
        range_end: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> ServiceResult<bool> {
        if range_end.is_some() || limit.is_some() {
            return Ok(false);
        }
        let rule = parse_rrule(&master.rrule).map_err(RfcError::from)?;
        Ok(!rule.is_bounded())
    }

    /// ## Summary
    /// Returns the end of the last raw slot of a bounded series.
    ///
    /// Delete exceptions are not taken into account. Returns `None` for
    /// series without COUNT or UNTIL and for series without any slot.
    ///
    /// ## Errors
    /// Returns an error if the rule is malformed or a timezone is unknown.
    pub fn calculate_series_end(&self, master: &MasterEvent) -> ServiceResult<Option<DateTime<Utc>>> {
        let rule = parse_rrule(&master.rrule).map_err(RfcError::from)?;
        if !rule.is_bounded() {
            return Ok(None);
        }

        let prepared = self.prepare(master, &[])?;
        let anchor = prepared.anchor;
        Ok(prepared
            .candidates
            .last()
            .map(|candidate| anchor.slot_bounds(candidate.key).1))
    }
}
