//! Recurrence expansion with exception handling.
//!
//! A series is expanded in four steps:
//! - the rule (plus extra dates) yields raw slots in order
//! - each slot is normalized to a [`SlotKey`] and checked against the range
//! - delete and change exceptions are looked up by slot key
//! - the surviving slot is turned into an [`Occurrence`](crate::calendar::model::Occurrence)

mod candidates;
mod engine;
mod exception;
mod iterator;
mod materialize;
mod range;
mod slot;

pub use candidates::{Candidate, Candidates};
pub use engine::{RecurrenceOptions, RecurrenceService};
pub use exception::{ExceptionIndex, Resolution};
pub use iterator::RecurrenceIterator;
pub use materialize::Materializer;
pub use range::{Membership, RangeFilter};
pub use slot::{SeriesAnchor, SlotKey, place};
