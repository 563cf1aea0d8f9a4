//! OpsBoard Store
//!
//! Single-writer entity store for the operations board:
//! - Request lifecycle across New, InProcess, MotiusAsk and Fulfilled
//! - The fulfill shadow index regenerated from the open request lanes
//! - Joiner archiving once both notifications are sent
//! - Nominations, onboarding contacts, custom items and news
//! - Weekly nudge buckets, counters and progress trackers
//! - Per-collection JSON persistence behind a [`KeyValueStore`]
//!
//! # Example
//!
//! ```rust
//! use opsboard_model::{RequestDraft, RequestStage, SystemClock};
//! use opsboard_store::{DashboardStore, MemoryStore, StoreConfig};
//! use std::sync::Arc;
//!
//! let store = DashboardStore::open(StoreConfig::default(), MemoryStore::new(), Arc::new(SystemClock));
//! let request = store.add_request(RequestDraft::new("Laptop", "Ann", "ann@example.com", "2025-05-20"));
//! assert_eq!(
//!     store.assign_responsible_to_request(&request.id, &"1".into()),
//!     Some(RequestStage::InProcess)
//! );
//! assert!(store.mark_request_fulfilled(&request.id));
//! assert_eq!(store.stats().total_requests_granted, 1);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod persistence;
pub mod progress;
pub mod seed;
pub mod state;
pub mod store;
pub mod test_harness;

// Re-exports
pub use config::{ProgressGoals, StoreConfig};
pub use error::{ConfigError, PersistError, StoreError};
pub use persistence::{CollectionKey, JsonDirStore, KeyValueStore, MemoryStore, Persistence};
pub use progress::{percent, BoardStats, NudgeProgress, ProgressReport, Tracker};
pub use state::BoardState;
pub use store::DashboardStore;
pub use test_harness::{run_simulator, SimulatorConfig, SimulatorReport, TestHarness};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
