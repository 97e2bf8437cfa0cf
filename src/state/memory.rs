/// In-memory review store for exercising the review loop without a database
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use super::data::{RecordId, ReviewRecord, StatusChange};
use super::store::ReviewStore;
use crate::error::ReviewError;

/// Clones share the same records, so a test can keep a handle
/// and inspect the statuses after the session consumed the store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<Vec<ReviewRecord>>>,
    /// Records that fail to parse, reported as malformed while pending
    malformed: Arc<Mutex<Vec<RecordId>>>,
    writes: Arc<Mutex<usize>>,
}

impl MemoryStore {
    pub fn new(records: Vec<ReviewRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            ..Default::default()
        }
    }

    pub fn with_malformed(self, id: RecordId) -> Self {
        self.malformed.lock().unwrap().push(id);
        self
    }

    pub fn record(&self, id: &RecordId) -> Option<ReviewRecord> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|record| record.id == *id)
            .cloned()
    }

    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }
}

#[async_trait]
impl ReviewStore for MemoryStore {
    async fn next_pending(
        &self,
        excluded: &HashSet<RecordId>,
    ) -> Result<Option<ReviewRecord>, ReviewError> {
        if let Some(id) = self
            .malformed
            .lock()
            .unwrap()
            .iter()
            .find(|id| !excluded.contains(id))
        {
            return Err(ReviewError::malformed(id.clone(), "missing field `image`"));
        }

        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|record| record.status.is_pending() && !excluded.contains(&record.id))
            .cloned())
    }

    async fn apply_decision(
        &self,
        id: &RecordId,
        change: &StatusChange,
    ) -> Result<(), ReviewError> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|record| record.id == *id)
            .ok_or_else(|| ReviewError::database("update status", format!("no record {}", id)))?;

        change.apply_to(&mut record.status);
        *self.writes.lock().unwrap() += 1;
        Ok(())
    }
}
