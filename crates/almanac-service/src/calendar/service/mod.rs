//! Calendar facade combining an event source with the recurrence engine.

mod source;

pub use source::{EventSource, InMemoryEventSource};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::calendar::model::{ChangeException, MasterEvent, Occurrence, RecurrenceId};
use crate::calendar::recurrence::{RecurrenceIterator, RecurrenceService};
use crate::error::{ServiceError, ServiceResult};

/// A master event loaded together with its change exceptions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSeries {
    pub master: MasterEvent,
    pub change_exceptions: Vec<ChangeException>,
}

/// Answers occurrence queries for series stored in an [`EventSource`].
#[derive(Debug, Clone)]
pub struct CalendarService<S> {
    source: S,
    recurrence: RecurrenceService,
}

impl<S: EventSource> CalendarService<S> {
    #[must_use]
    pub fn new(source: S, recurrence: RecurrenceService) -> Self {
        Self { source, recurrence }
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// ## Summary
    /// Returns the ids of all series in the source.
    ///
    /// ## Errors
    /// Returns an error if the source cannot be read.
    pub fn series_ids(&self) -> ServiceResult<Vec<Uuid>> {
        self.source.series_ids()
    }

    /// ## Summary
    /// Loads a series and its change exceptions.
    ///
    /// ## Errors
    /// Returns `NotFound` for an unknown series, or the source's read error.
    pub fn load_series(&self, series_id: Uuid) -> ServiceResult<LoadedSeries> {
        let master = self
            .source
            .load_master(series_id)?
            .ok_or_else(|| ServiceError::NotFound(format!("series {series_id}")))?;
        let change_exceptions = self.source.load_change_exceptions(series_id)?;

        Ok(LoadedSeries {
            master,
            change_exceptions,
        })
    }

    /// ## Summary
    /// Lazily expands a loaded series within an optional window and limit.
    ///
    /// ## Errors
    /// Returns `UnboundedQuery` when the rule has neither COUNT nor UNTIL
    /// and neither `range_end` nor `limit` is given, or any error of
    /// [`RecurrenceService::calculate_instances_respect_exceptions`].
    pub fn expand<'a>(
        &self,
        series: &'a LoadedSeries,
        range_start: Option<DateTime<Utc>>,
        range_end: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> ServiceResult<RecurrenceIterator<'a>> {
        if self
            .recurrence
            .is_open_ended(&series.master, range_end, limit)?
        {
            return Err(ServiceError::UnboundedQuery(series.master.uid.clone()));
        }

        self.recurrence.calculate_instances_respect_exceptions(
            &series.master,
            range_start,
            range_end,
            limit,
            &series.change_exceptions,
        )
    }

    /// ## Summary
    /// Expands one series within an optional window and limit and collects
    /// the result.
    ///
    /// ## Errors
    /// Returns `NotFound` for an unknown series, or any error of
    /// [`Self::expand`].
    #[tracing::instrument(skip(self))]
    pub fn occurrences(
        &self,
        series_id: Uuid,
        range_start: Option<DateTime<Utc>>,
        range_end: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> ServiceResult<Vec<Occurrence>> {
        let series = self.load_series(series_id)?;
        let occurrences: Vec<Occurrence> = self
            .expand(&series, range_start, range_end, limit)?
            .collect();

        tracing::debug!(count = occurrences.len(), "Expanded series");
        Ok(occurrences)
    }

    /// ## Summary
    /// Looks up the occurrence of a series at `recurrence_id`.
    ///
    /// ## Errors
    /// Returns `NotFound` for an unknown series, or any error of
    /// [`RecurrenceService::calculate_occurrence`].
    pub fn occurrence(
        &self,
        series_id: Uuid,
        recurrence_id: &RecurrenceId,
    ) -> ServiceResult<Option<Occurrence>> {
        let series = self.load_series(series_id)?;

        self.recurrence
            .calculate_occurrence(&series.master, recurrence_id, &series.change_exceptions)
    }
}
