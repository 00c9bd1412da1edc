//! Calendar event model, recurrence expansion and the event-source facade.

pub mod model;
pub mod recurrence;
pub mod service;
