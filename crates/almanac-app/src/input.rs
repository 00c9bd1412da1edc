//! JSON calendar files read by the command line tool.
//!
//! Date and date-time values use iCalendar notation (`20081001`,
//! `20081001T144500`, `20081001T124500Z`) and are read in the entry's `tzid`
//! when one is given.

use almanac_rfc::rfc::ical::core::EventTime;
use almanac_rfc::rfc::ical::parse::parse_event_time;
use almanac_service::calendar::model::{ChangeException, EventFields, MasterEvent, RecurrenceId};
use almanac_service::calendar::service::InMemoryEventSource;
use serde::Deserialize;
use std::path::Path;
use uuid::Uuid;

use crate::error::AppResult;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarFile {
    #[serde(default)]
    pub series: Vec<SeriesEntry>,
}

/// One recurring series with its exceptions.
#[derive(Debug, Clone, Deserialize)]
pub struct SeriesEntry {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub uid: String,
    pub rrule: String,
    pub dtstart: String,
    pub dtend: String,
    #[serde(default)]
    pub tzid: Option<String>,
    #[serde(default)]
    pub exdate: Vec<String>,
    #[serde(default)]
    pub rdate: Vec<String>,
    #[serde(flatten)]
    pub fields: EventFields,
    #[serde(default)]
    pub exceptions: Vec<ExceptionEntry>,
}

/// A modified occurrence, identified by the original start.
#[derive(Debug, Clone, Deserialize)]
pub struct ExceptionEntry {
    pub recurrence_id: String,
    pub dtstart: String,
    pub dtend: String,
    #[serde(default)]
    pub tzid: Option<String>,
    #[serde(flatten)]
    pub fields: EventFields,
}

impl CalendarFile {
    /// ## Summary
    /// Parses a calendar file from JSON text.
    ///
    /// ## Errors
    /// Returns an error if the JSON does not match the file layout.
    pub fn from_json(contents: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    /// ## Summary
    /// Reads and parses a calendar file.
    ///
    /// ## Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn read(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let file = Self::from_json(&contents)?;
        tracing::debug!(path = %path.display(), series = file.series.len(), "Calendar file loaded");
        Ok(file)
    }

    /// ## Summary
    /// Converts every entry and stores it in an in-memory source.
    ///
    /// ## Errors
    /// Returns an error if a date or date-time value is malformed.
    pub fn into_source(self) -> AppResult<InMemoryEventSource> {
        let mut source = InMemoryEventSource::new();
        for entry in &self.series {
            let (master, exceptions) = entry.to_series()?;
            source.insert(master, exceptions);
        }
        Ok(source)
    }
}

impl SeriesEntry {
    /// ## Summary
    /// Builds the master event and its change exceptions.
    ///
    /// ## Errors
    /// Returns an error if a date or date-time value is malformed.
    pub fn to_series(&self) -> AppResult<(MasterEvent, Vec<ChangeException>)> {
        let tzid = self.tzid.as_deref();
        let mut master = MasterEvent::new(
            self.uid.clone(),
            self.rrule.clone(),
            parse_event_time(&self.dtstart, tzid)?,
            parse_event_time(&self.dtend, tzid)?,
        )
        .with_fields(self.fields.clone());
        if let Some(id) = self.id {
            master.id = id;
        }

        for value in &self.exdate {
            master.add_delete_exception(RecurrenceId::new(parse_event_time(value, tzid)?));
        }
        for value in &self.rdate {
            master.add_recurrence_date(parse_event_time(value, tzid)?);
        }

        let exceptions = self
            .exceptions
            .iter()
            .map(|entry| entry.to_exception(tzid))
            .collect::<AppResult<Vec<_>>>()?;

        Ok((master, exceptions))
    }
}

impl ExceptionEntry {
    fn to_exception(&self, series_tzid: Option<&str>) -> AppResult<ChangeException> {
        let tzid = self.tzid.as_deref().or(series_tzid);
        let recurrence_id: EventTime = parse_event_time(&self.recurrence_id, series_tzid)?;
        Ok(ChangeException::new(
            recurrence_id,
            parse_event_time(&self.dtstart, tzid)?,
            parse_event_time(&self.dtend, tzid)?,
        )
        .with_fields(self.fields.clone()))
    }
}
