//! Testing utilities for the OpsBoard workspace
//!
//! Shared fixtures: pinned clocks, drafts, and stores over in-memory or
//! failing backends.

#![allow(missing_docs)]

use chrono::{DateTime, TimeZone, Utc};
use opsboard_model::{FixedClock, PersonDraft, RequestDraft};
use opsboard_store::{DashboardStore, KeyValueStore, MemoryStore, PersistError, StoreConfig};
use std::sync::Arc;

/// 2025-05-12 09:00 UTC, a Monday in week bucket 19
pub fn reference_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 12, 9, 0, 0).unwrap()
}

pub fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(reference_instant()))
}

pub fn fixed_clock_at(instant: DateTime<Utc>) -> Arc<FixedClock> {
    Arc::new(FixedClock::new(instant))
}

pub fn request_draft(text: &str) -> RequestDraft {
    RequestDraft::new(text, "Jordan Lee", "jordan.lee@example.com", "2025-05-20")
}

pub fn joiner_draft(name: &str) -> PersonDraft {
    PersonDraft::new(name, "Acme Inc.", format!("{}@acme.com", name.to_lowercase().replace(' ', ".")))
}

/// Config with the default roster and no sample records
pub fn empty_config() -> StoreConfig {
    StoreConfig::default().with_sample_data(false)
}

/// Store over a shared [`MemoryStore`], returned so tests can inspect documents
pub fn memory_store(config: StoreConfig, clock: Arc<FixedClock>) -> (DashboardStore, Arc<MemoryStore>) {
    let backend = Arc::new(MemoryStore::new());
    let store = DashboardStore::open(config, Arc::clone(&backend), clock);
    (store, backend)
}

/// Empty store on [`fixed_clock`]
pub fn empty_store() -> DashboardStore {
    memory_store(empty_config(), fixed_clock()).0
}

/// Backend that rejects every read and write
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn load_raw(&self, key: &str) -> Result<Option<String>, PersistError> {
        Err(PersistError::Unavailable(format!("read {key}")))
    }

    fn save_raw(&self, key: &str, _value: &str) -> Result<(), PersistError> {
        Err(PersistError::Unavailable(format!("write {key}")))
    }
}
