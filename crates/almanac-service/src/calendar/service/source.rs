//! Event storage boundary.

use std::collections::HashMap;
use uuid::Uuid;

use crate::calendar::model::{ChangeException, MasterEvent};
use crate::error::ServiceResult;

/// Source of recurring series and their change exceptions.
pub trait EventSource {
    /// ## Summary
    /// Returns the ids of all stored series, in storage order.
    ///
    /// ## Errors
    /// Returns an error if the backing store cannot be read.
    fn series_ids(&self) -> ServiceResult<Vec<Uuid>>;

    /// ## Summary
    /// Loads the master event of a series.
    ///
    /// ## Errors
    /// Returns an error if the backing store cannot be read.
    fn load_master(&self, series_id: Uuid) -> ServiceResult<Option<MasterEvent>>;

    /// ## Summary
    /// Loads the change exceptions attached to a series.
    ///
    /// ## Errors
    /// Returns an error if the backing store cannot be read.
    fn load_change_exceptions(&self, series_id: Uuid) -> ServiceResult<Vec<ChangeException>>;
}

/// Series held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventSource {
    order: Vec<Uuid>,
    masters: HashMap<Uuid, MasterEvent>,
    exceptions: HashMap<Uuid, Vec<ChangeException>>,
}

impl InMemoryEventSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a series, replacing any series with the same id.
    pub fn insert(&mut self, master: MasterEvent, change_exceptions: Vec<ChangeException>) {
        let id = master.id;
        if self.masters.insert(id, master).is_none() {
            self.order.push(id);
        }
        self.exceptions.insert(id, change_exceptions);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl EventSource for InMemoryEventSource {
    fn series_ids(&self) -> ServiceResult<Vec<Uuid>> {
        Ok(self.order.clone())
    }

    fn load_master(&self, series_id: Uuid) -> ServiceResult<Option<MasterEvent>> {
        Ok(self.masters.get(&series_id).cloned())
    }

    fn load_change_exceptions(&self, series_id: Uuid) -> ServiceResult<Vec<ChangeException>> {
        Ok(self.exceptions.get(&series_id).cloned().unwrap_or_default())
    }
}
