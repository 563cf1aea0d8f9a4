//! Persistence adapter
//!
//! Each board collection is stored as one JSON document under its own key.
//! [`KeyValueStore`] is the raw backend seam; [`Persistence`] layers typed
//! load/save on top and swallows every failure: reads fall back to the
//! caller's default, writes are skipped. Both outcomes are logged.
//!
//! Collections persist independently. A crash between two writes of the same
//! mutation (a request moving lanes, say) can leave the documents out of step
//! until the next mutation rewrites them.

use crate::error::PersistError;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Storage key for one board collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollectionKey {
    NewRequests,
    RequestsInProcess,
    NewJoiners,
    Nominations,
    FulfillRequests,
    MotiusAsks,
    OnboardingList,
    FulfilledRequests,
    RecentJoiners,
    ResponsiblePersons,
    WeeklyNudges,
    WeeklyStats,
    TotalRequestsGranted,
    NewsItems,
    CustomSectionItems,
    PriorityNudgingItems,
}

impl CollectionKey {
    /// Every key, in write order
    pub const ALL: [CollectionKey; 16] = [
        CollectionKey::NewRequests,
        CollectionKey::RequestsInProcess,
        CollectionKey::NewJoiners,
        CollectionKey::Nominations,
        CollectionKey::FulfillRequests,
        CollectionKey::MotiusAsks,
        CollectionKey::OnboardingList,
        CollectionKey::FulfilledRequests,
        CollectionKey::RecentJoiners,
        CollectionKey::ResponsiblePersons,
        CollectionKey::WeeklyNudges,
        CollectionKey::WeeklyStats,
        CollectionKey::TotalRequestsGranted,
        CollectionKey::NewsItems,
        CollectionKey::CustomSectionItems,
        CollectionKey::PriorityNudgingItems,
    ];

    /// Key string as stored
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CollectionKey::NewRequests => "newRequests",
            CollectionKey::RequestsInProcess => "requestsInProcess",
            CollectionKey::NewJoiners => "newJoiners",
            CollectionKey::Nominations => "nominations",
            CollectionKey::FulfillRequests => "fulfillRequests",
            CollectionKey::MotiusAsks => "motiusAsks",
            CollectionKey::OnboardingList => "onboardingList",
            CollectionKey::FulfilledRequests => "fulfilledRequests",
            CollectionKey::RecentJoiners => "recentJoiners",
            CollectionKey::ResponsiblePersons => "responsiblePersons",
            CollectionKey::WeeklyNudges => "weeklyNudges",
            CollectionKey::WeeklyStats => "weeklyStats",
            CollectionKey::TotalRequestsGranted => "totalRequestsGranted",
            CollectionKey::NewsItems => "newsItems",
            CollectionKey::CustomSectionItems => "customSectionItems",
            CollectionKey::PriorityNudgingItems => "priorityNudgingItems",
        }
    }
}

impl fmt::Display for CollectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw string key-value backend
///
/// Implementations only move strings; encoding lives in [`Persistence`].
pub trait KeyValueStore: Send + Sync {
    /// Stored document for `key`, `None` if never written
    ///
    /// # Errors
    /// Backend-specific read failures.
    fn load_raw(&self, key: &str) -> Result<Option<String>, PersistError>;

    /// Replace the document for `key`
    ///
    /// # Errors
    /// Backend-specific write failures.
    fn save_raw(&self, key: &str, value: &str) -> Result<(), PersistError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn load_raw(&self, key: &str) -> Result<Option<String>, PersistError> {
        (**self).load_raw(key)
    }

    fn save_raw(&self, key: &str, value: &str) -> Result<(), PersistError> {
        (**self).save_raw(key, value)
    }
}

/// In-process backend
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw document for `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    /// Overwrite a raw document, bypassing encoding
    pub fn insert(&self, key: &str, value: impl Into<String>) {
        self.entries.lock().insert(key.to_string(), value.into());
    }

    /// Number of stored keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// No key stored yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn load_raw(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.get(key))
    }

    fn save_raw(&self, key: &str, value: &str) -> Result<(), PersistError> {
        self.insert(key, value);
        Ok(())
    }
}

/// Directory backend: one `<key>.json` file per collection
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// document is either the old or the new version, never a torn mix.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    /// Open `root`, creating it if needed
    ///
    /// # Errors
    /// Returns [`PersistError::Io`] when the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, PersistError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| PersistError::io(&root, e))?;
        Ok(Self { root })
    }

    /// Backing directory
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl KeyValueStore for JsonDirStore {
    fn load_raw(&self, key: &str) -> Result<Option<String>, PersistError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PersistError::io(path, e)),
        }
    }

    fn save_raw(&self, key: &str, value: &str) -> Result<(), PersistError> {
        let path = self.path_for(key);
        let tmp = self.root.join(format!(".{key}.json.tmp"));
        std::fs::write(&tmp, value).map_err(|e| PersistError::io(&tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| PersistError::io(&path, e))
    }
}

/// Typed, failure-swallowing access to a [`KeyValueStore`]
pub struct Persistence {
    backend: Box<dyn KeyValueStore>,
}

impl fmt::Debug for Persistence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Persistence").finish_non_exhaustive()
    }
}

impl Persistence {
    /// Wrap a backend
    pub fn new(backend: impl KeyValueStore + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Decode the document for `key`, or `default` when missing or unusable
    pub fn load<T: DeserializeOwned>(&self, key: CollectionKey, default: T) -> T {
        match self.try_load(key) {
            Ok(Some(value)) => value,
            Ok(None) => {
                tracing::debug!("No stored {}, using default", key);
                default
            }
            Err(e) => {
                tracing::warn!("Falling back to default for {}: {}", key, e);
                default
            }
        }
    }

    /// Like [`Persistence::load`] but distinguishes "missing" from "present"
    ///
    /// # Errors
    /// Backend read failures and undecodable documents.
    pub fn try_load<T: DeserializeOwned>(&self, key: CollectionKey) -> Result<Option<T>, PersistError> {
        let Some(raw) = self.backend.load_raw(key.as_str())? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| PersistError::Decode {
                key: key.as_str().to_string(),
                source,
            })
    }

    /// Encode and store `value`; failures are logged and dropped
    pub fn save<T: Serialize + ?Sized>(&self, key: CollectionKey, value: &T) {
        if let Err(e) = self.try_save(key, value) {
            tracing::warn!("Dropping write of {}: {}", key, e);
        }
    }

    /// Encode and store `value`
    ///
    /// # Errors
    /// Encoding or backend write failures.
    pub fn try_save<T: Serialize + ?Sized>(&self, key: CollectionKey, value: &T) -> Result<(), PersistError> {
        let raw = serde_json::to_string(value).map_err(|source| PersistError::Encode {
            key: key.as_str().to_string(),
            source,
        })?;
        self.backend.save_raw(key.as_str(), &raw)
    }
}
