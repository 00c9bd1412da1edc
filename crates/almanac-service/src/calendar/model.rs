//! Event data handled by the recurrence engine.

use almanac_core::types::OccurrenceKind;
use almanac_rfc::rfc::ical::core::EventTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Event status (RFC 5545 §3.8.1.11).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Tentative,
    Confirmed,
    Cancelled,
}

/// Time transparency (RFC 5545 §3.8.2.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transparency {
    Opaque,
    Transparent,
}

/// Descriptive fields of an event.
///
/// On a change exception every `None` field inherits the master's value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transparency: Option<Transparency>,
}

impl EventFields {
    /// Creates fields carrying only a summary.
    #[must_use]
    pub fn with_summary(summary: impl Into<String>) -> Self {
        Self {
            summary: Some(summary.into()),
            ..Self::default()
        }
    }

    /// ## Summary
    /// Applies `self` as overrides on top of `base`.
    ///
    /// Fields set on `self` win, unset fields are taken from `base`.
    #[must_use]
    pub fn merged_over(&self, base: &Self) -> Self {
        Self {
            summary: self.summary.clone().or_else(|| base.summary.clone()),
            description: self.description.clone().or_else(|| base.description.clone()),
            location: self.location.clone().or_else(|| base.location.clone()),
            categories: self.categories.clone().or_else(|| base.categories.clone()),
            status: self.status.or(base.status),
            transparency: self.transparency.or(base.transparency),
        }
    }
}

/// Original start of one occurrence of a series (RECURRENCE-ID).
///
/// Values written in different forms can denote the same occurrence; they are
/// compared through the series' slot keys, not through this type's `Eq`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecurrenceId(EventTime);

impl RecurrenceId {
    #[must_use]
    pub fn new(value: EventTime) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn value(&self) -> &EventTime {
        &self.0
    }
}

impl From<EventTime> for RecurrenceId {
    fn from(value: EventTime) -> Self {
        Self(value)
    }
}

impl fmt::Display for RecurrenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The master event of a recurring series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterEvent {
    pub id: Uuid,
    pub uid: String,
    /// RRULE value, with or without the `RRULE:` prefix.
    pub rrule: String,
    pub start: EventTime,
    pub end: EventTime,
    /// Deleted occurrences (EXDATE), kept in insertion order without duplicates.
    #[serde(default)]
    pub delete_exceptions: Vec<RecurrenceId>,
    /// Additional occurrence starts (RDATE).
    #[serde(default)]
    pub recurrence_dates: Vec<EventTime>,
    #[serde(default)]
    pub fields: EventFields,
}

impl MasterEvent {
    /// Creates a master event with a fresh id and no exceptions.
    #[must_use]
    pub fn new(
        uid: impl Into<String>,
        rrule: impl Into<String>,
        start: EventTime,
        end: EventTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            uid: uid.into(),
            rrule: rrule.into(),
            start,
            end,
            delete_exceptions: Vec::new(),
            recurrence_dates: Vec::new(),
            fields: EventFields::default(),
        }
    }

    #[must_use]
    pub fn with_fields(mut self, fields: EventFields) -> Self {
        self.fields = fields;
        self
    }

    /// Marks the occurrence at `recurrence_id` as deleted.
    ///
    /// Adding an id that is already present has no effect.
    pub fn add_delete_exception(&mut self, recurrence_id: RecurrenceId) {
        if !self.delete_exceptions.contains(&recurrence_id) {
            self.delete_exceptions.push(recurrence_id);
        }
    }

    /// Adds an extra occurrence start.
    pub fn add_recurrence_date(&mut self, start: EventTime) {
        self.recurrence_dates.push(start);
    }
}

/// A modified occurrence of a series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeException {
    pub id: Uuid,
    pub recurrence_id: RecurrenceId,
    pub start: EventTime,
    pub end: EventTime,
    #[serde(default)]
    pub fields: EventFields,
}

impl ChangeException {
    /// Creates a change exception with a fresh id and no field overrides.
    #[must_use]
    pub fn new(recurrence_id: impl Into<RecurrenceId>, start: EventTime, end: EventTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            recurrence_id: recurrence_id.into(),
            start,
            end,
            fields: EventFields::default(),
        }
    }

    #[must_use]
    pub fn with_fields(mut self, fields: EventFields) -> Self {
        self.fields = fields;
        self
    }
}

/// A concrete occurrence of a series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    pub series_id: Uuid,
    pub uid: String,
    pub recurrence_id: RecurrenceId,
    pub start: EventTime,
    pub end: EventTime,
    pub kind: OccurrenceKind,
    /// 1-based position of the original slot in the raw series.
    pub position: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception_id: Option<Uuid>,
    pub fields: EventFields,
}

impl Occurrence {
    #[must_use]
    pub fn is_exception(&self) -> bool {
        self.kind.is_exception()
    }
}
