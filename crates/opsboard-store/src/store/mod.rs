//! The dashboard store
//!
//! [`DashboardStore`] owns the [`BoardState`] behind a single `RwLock`. Every
//! mutation runs under the write lock: it edits the state, reconciles the
//! fulfill shadow index when New or InProcess changed, then writes each
//! touched collection before the lock is released.
//!
//! Lookup misses are no-ops. Operations report what happened through their
//! return value (`bool`, the resulting stage, or the created record) rather
//! than through errors.

mod items;
mod people;
mod requests;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::persistence::{CollectionKey, JsonDirStore, KeyValueStore, Persistence};
use crate::progress::{BoardStats, ProgressReport};
use crate::state::BoardState;
use opsboard_model::{
    week_bucket, Clock, JoinerItem, Lane, RecordId, RequestStage, ResponsiblePerson, SystemClock,
    WeeklyNudge,
};
use parking_lot::RwLock;
use rand::seq::IndexedRandom;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

/// Collections written by one mutation
#[derive(Debug, Default)]
pub(crate) struct Touched(BTreeSet<CollectionKey>);

impl Touched {
    pub(crate) fn mark(&mut self, key: CollectionKey) {
        self.0.insert(key);
    }

    fn shadow_sources_changed(&self) -> bool {
        RequestStage::ALL
            .into_iter()
            .filter(|stage| stage.is_shadowed())
            .any(|stage| self.0.contains(&BoardState::request_key(stage)))
    }
}

/// Operations board store
pub struct DashboardStore {
    state: RwLock<BoardState>,
    persistence: Persistence,
    clock: Arc<dyn Clock>,
    config: StoreConfig,
}

impl std::fmt::Debug for DashboardStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DashboardStore {
    /// Load every collection from `backend`
    ///
    /// Missing or unreadable collections start from their defaults. Request
    /// documents are repaired, the shadow index is reconciled once, and every
    /// collection either step changed is written back.
    pub fn open(config: StoreConfig, backend: impl KeyValueStore + 'static, clock: Arc<dyn Clock>) -> Self {
        let persistence = Persistence::new(backend);
        let mut state = BoardState::load(&persistence, &config);
        let mut repaired = state.normalize();
        if state.reconcile_fulfill_requests() {
            tracing::info!("Fulfill index rebuilt on open: {} entries", state.fulfill_requests.len());
            repaired.insert(CollectionKey::FulfillRequests);
        }
        for key in &repaired {
            state.save(&persistence, *key);
        }
        tracing::info!(
            "Opened board: {} new, {} in process, {} asks, {} joiners",
            state.new_requests.len(),
            state.requests_in_process.len(),
            state.motius_asks.len(),
            state.new_joiners.len()
        );
        Self {
            state: RwLock::new(state),
            persistence,
            clock,
            config,
        }
    }

    /// Validate `config` and open a [`JsonDirStore`] at `dir` on the wall clock
    ///
    /// # Errors
    /// Invalid configuration or a data directory that cannot be created.
    pub fn open_dir(dir: impl AsRef<Path>, config: StoreConfig) -> Result<Self, StoreError> {
        config.validate()?;
        let backend = JsonDirStore::open(dir.as_ref())?;
        Ok(Self::open(config, backend, Arc::new(SystemClock)))
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Run one mutation under the write lock and flush what it touched
    pub(crate) fn mutate<R>(&self, op: &str, f: impl FnOnce(&mut BoardState, &mut Touched) -> R) -> R {
        let mut state = self.state.write();
        let mut touched = Touched::default();
        let out = f(&mut state, &mut touched);

        if touched.shadow_sources_changed() && state.reconcile_fulfill_requests() {
            touched.mark(CollectionKey::FulfillRequests);
        }
        if touched.0.is_empty() {
            tracing::debug!("{}: nothing changed", op);
        }
        for key in &touched.0 {
            state.save(&self.persistence, *key);
        }
        out
    }

    /// Current instant formatted for record dates
    pub(crate) fn now_string(&self) -> String {
        opsboard_model::format_record_date(self.clock.now())
    }

    // ---- queries ----

    /// Borrow the state for a read-only computation
    pub fn read<R>(&self, f: impl FnOnce(&BoardState) -> R) -> R {
        f(&self.state.read())
    }

    /// Clone of the full state
    #[must_use]
    pub fn snapshot(&self) -> BoardState {
        self.state.read().clone()
    }

    /// Ids in a kanban lane, in display order
    #[must_use]
    pub fn lane(&self, lane: Lane) -> Vec<RecordId> {
        self.state.read().lane_ids(lane)
    }

    /// Item count per lane
    #[must_use]
    pub fn lane_counts(&self) -> BTreeMap<Lane, usize> {
        self.state.read().lane_counts()
    }

    /// Aggregate counters
    #[must_use]
    pub fn stats(&self) -> BoardStats {
        let state = self.state.read();
        BoardStats {
            total_requests_granted: state.total_requests_granted,
            weekly_stats: state.weekly_stats,
        }
    }

    /// Progress trackers for the current week
    #[must_use]
    pub fn progress(&self) -> ProgressReport {
        let bucket = week_bucket(self.clock.now());
        let state = self.state.read();
        let stats = BoardStats {
            total_requests_granted: state.total_requests_granted,
            weekly_stats: state.weekly_stats,
        };
        ProgressReport::build(stats, &state.weekly_nudges, bucket, &self.config.goals)
    }

    /// Whether the email notification for `joiner` may be sent yet
    #[must_use]
    pub fn email_notification_unlocked(&self, joiner: &JoinerItem) -> bool {
        opsboard_model::email_notification_unlocked(&joiner.creation_date, self.clock.now())
    }

    // ---- weekly nudges ----

    /// Count one nudge in the current week bucket
    pub fn add_weekly_nudge(&self) -> WeeklyNudge {
        let (week, year) = week_bucket(self.clock.now());
        self.mutate("add_weekly_nudge", |state, touched| {
            touched.mark(CollectionKey::WeeklyNudges);
            let nudge = match state
                .weekly_nudges
                .iter_mut()
                .find(|n| n.week == week && n.year == year)
            {
                Some(existing) => {
                    existing.count += 1;
                    *existing
                }
                None => {
                    let fresh = WeeklyNudge { week, year, count: 1 };
                    state.weekly_nudges.push(fresh);
                    fresh
                }
            };
            tracing::info!("Nudge {} in week {}/{}", nudge.count, week, year);
            nudge
        })
    }

    // ---- responsible person registry ----

    /// Registered person by id
    #[must_use]
    pub fn responsible_person(&self, id: &RecordId) -> Option<ResponsiblePerson> {
        self.state.read().person(id).cloned()
    }

    /// Every registered person
    #[must_use]
    pub fn responsible_persons(&self) -> Vec<ResponsiblePerson> {
        self.state.read().responsible_persons.clone()
    }

    /// Register a person with a random palette color
    pub fn add_custom_responsible_person(&self, name: impl Into<String>) -> ResponsiblePerson {
        let color = self
            .config
            .palette
            .choose(&mut rand::rng())
            .cloned()
            .unwrap_or_else(|| crate::seed::DEFAULT_PALETTE[0].to_string());
        let person = ResponsiblePerson::new(RecordId::generate(), name, color);
        self.mutate("add_custom_responsible_person", |state, touched| {
            state.responsible_persons.push(person.clone());
            touched.mark(CollectionKey::ResponsiblePersons);
        });
        tracing::info!("Registered responsible person {} ({})", person.name, person.id);
        person
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use chrono::{Duration, TimeZone, Utc};
    use opsboard_model::FixedClock;

    fn store_at(clock: Arc<FixedClock>) -> (DashboardStore, Arc<MemoryStore>) {
        let backend = Arc::new(MemoryStore::new());
        let store = DashboardStore::open(StoreConfig::default(), Arc::clone(&backend), clock);
        (store, backend)
    }

    #[test]
    fn open_writes_reconciled_shadow_index() {
        let clock = Arc::new(FixedClock::new(Utc::now()));
        let (store, backend) = store_at(clock);
        assert_eq!(store.lane(Lane::FulfillRequests).len(), 2);
        assert!(backend.get("fulfillRequests").is_some());
        assert!(backend.get("newRequests").is_none());
    }

    #[test]
    fn open_persists_repaired_requests() {
        let backend = Arc::new(MemoryStore::new());
        backend.insert(
            "motiusAsks",
            r#"[{"id":"1","requestText":"Status","personName":"Team","email":"t@x.com","date":"2025-05-18"}]"#,
        );
        let clock = Arc::new(FixedClock::new(Utc::now()));
        let store = DashboardStore::open(StoreConfig::default(), Arc::clone(&backend), clock.clone());

        let ask = store.snapshot().motius_asks[0].clone();
        assert_ne!(ask.id, RecordId::from("1"));
        assert_eq!(store.request_stage(&"1".into()), Some(RequestStage::New));
        assert_eq!(store.request_stage(&ask.id), Some(RequestStage::MotiusAsk));

        let reopened = DashboardStore::open(StoreConfig::default(), backend, clock);
        assert_eq!(reopened.snapshot().motius_asks, vec![ask]);
    }

    #[test]
    fn nudges_bucket_by_week() {
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2025, 1, 10, 12, 0, 0).unwrap()));
        let (store, backend) = store_at(Arc::clone(&clock));

        assert_eq!(store.add_weekly_nudge().count, 1);
        assert_eq!(store.add_weekly_nudge().count, 2);
        clock.advance(Duration::days(7));
        let next = store.add_weekly_nudge();
        assert_eq!((next.week, next.count), (3, 1));

        let stored: Vec<WeeklyNudge> = serde_json::from_str(&backend.get("weeklyNudges").unwrap()).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(store.progress().current_week.tracker.value, 1);
        assert_eq!(store.progress().previous_weeks.len(), 1);
    }

    #[test]
    fn custom_person_gets_palette_color() {
        let clock = Arc::new(FixedClock::new(Utc::now()));
        let (store, backend) = store_at(clock);
        let person = store.add_custom_responsible_person("Zed");
        assert!(store.config().palette.contains(&person.color));
        assert_eq!(store.responsible_person(&person.id), Some(person.clone()));
        assert_eq!(store.responsible_persons().len(), 6);
        assert!(backend.get("responsiblePersons").unwrap().contains("Zed"));
    }

    #[test]
    fn email_unlock_follows_clock() {
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2025, 5, 12, 9, 0, 0).unwrap()));
        let (store, _) = store_at(Arc::clone(&clock));
        let joiner = store.snapshot().new_joiners[0].clone();
        assert!(!store.email_notification_unlocked(&joiner));
        clock.advance(Duration::days(1));
        assert!(store.email_notification_unlocked(&joiner));
    }
}
