//! In-memory board state
//!
//! [`BoardState`] is the plain data behind
//! [`DashboardStore`](crate::DashboardStore): one vector per collection plus
//! the aggregate counters. Lookups and the fulfill shadow reconciliation live
//! here; the lifecycle rules live on the store.

use crate::config::StoreConfig;
use crate::persistence::{CollectionKey, Persistence};
use crate::seed;
use opsboard_model::{
    CustomSectionItem, FulfillRequestItem, JoinerItem, JoinerStage, Lane, NewsItem,
    NominationItem, OnboardingContact, PriorityNudgingItem, RecordId, RequestItem, RequestOrigin,
    RequestStage, ResponsiblePerson, WeeklyNudge, WeeklyStats, MAX_REQUEST_RESPONSIBLES,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Every collection held by the store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardState {
    pub new_requests: Vec<RequestItem>,
    pub requests_in_process: Vec<RequestItem>,
    pub motius_asks: Vec<RequestItem>,
    pub fulfilled_requests: Vec<RequestItem>,
    pub fulfill_requests: Vec<FulfillRequestItem>,
    pub new_joiners: Vec<JoinerItem>,
    pub recent_joiners: Vec<JoinerItem>,
    pub nominations: Vec<NominationItem>,
    pub onboarding_list: Vec<OnboardingContact>,
    pub custom_section_items: Vec<CustomSectionItem>,
    pub news_items: Vec<NewsItem>,
    pub priority_nudging_items: Vec<PriorityNudgingItem>,
    pub responsible_persons: Vec<ResponsiblePerson>,
    pub weekly_nudges: Vec<WeeklyNudge>,
    pub weekly_stats: WeeklyStats,
    pub total_requests_granted: u64,
}

impl BoardState {
    /// Load every collection, substituting defaults for missing or corrupt
    /// documents
    ///
    /// Documents are taken as stored; see [`BoardState::normalize`].
    pub fn load(persistence: &Persistence, config: &StoreConfig) -> Self {
        let sample = config.seed_sample_data;
        let or_sample = |items: fn() -> Vec<RequestItem>| if sample { items() } else { Vec::new() };

        Self {
            new_requests: persistence.load(CollectionKey::NewRequests, or_sample(seed::sample_new_requests)),
            requests_in_process: persistence.load(CollectionKey::RequestsInProcess, Vec::new()),
            motius_asks: persistence.load(CollectionKey::MotiusAsks, or_sample(seed::sample_motius_asks)),
            fulfilled_requests: persistence.load(CollectionKey::FulfilledRequests, Vec::new()),
            fulfill_requests: persistence.load(CollectionKey::FulfillRequests, Vec::new()),
            new_joiners: persistence.load(
                CollectionKey::NewJoiners,
                if sample { seed::sample_new_joiners() } else { Vec::new() },
            ),
            recent_joiners: persistence.load(CollectionKey::RecentJoiners, Vec::new()),
            nominations: persistence.load(CollectionKey::Nominations, Vec::new()),
            onboarding_list: persistence.load(CollectionKey::OnboardingList, Vec::new()),
            custom_section_items: persistence.load(CollectionKey::CustomSectionItems, Vec::new()),
            news_items: persistence.load(CollectionKey::NewsItems, Vec::new()),
            priority_nudging_items: persistence.load(CollectionKey::PriorityNudgingItems, Vec::new()),
            responsible_persons: persistence.load(CollectionKey::ResponsiblePersons, config.roster.clone()),
            weekly_nudges: persistence.load(CollectionKey::WeeklyNudges, Vec::new()),
            weekly_stats: persistence.load(CollectionKey::WeeklyStats, WeeklyStats::default()),
            total_requests_granted: persistence.load(CollectionKey::TotalRequestsGranted, 0),
        }
    }

    /// Write one collection
    pub fn save(&self, persistence: &Persistence, key: CollectionKey) {
        match key {
            CollectionKey::NewRequests => persistence.save(key, &self.new_requests),
            CollectionKey::RequestsInProcess => persistence.save(key, &self.requests_in_process),
            CollectionKey::NewJoiners => persistence.save(key, &self.new_joiners),
            CollectionKey::Nominations => persistence.save(key, &self.nominations),
            CollectionKey::FulfillRequests => persistence.save(key, &self.fulfill_requests),
            CollectionKey::MotiusAsks => persistence.save(key, &self.motius_asks),
            CollectionKey::OnboardingList => persistence.save(key, &self.onboarding_list),
            CollectionKey::FulfilledRequests => persistence.save(key, &self.fulfilled_requests),
            CollectionKey::RecentJoiners => persistence.save(key, &self.recent_joiners),
            CollectionKey::ResponsiblePersons => persistence.save(key, &self.responsible_persons),
            CollectionKey::WeeklyNudges => persistence.save(key, &self.weekly_nudges),
            CollectionKey::WeeklyStats => persistence.save(key, &self.weekly_stats),
            CollectionKey::TotalRequestsGranted => persistence.save(key, &self.total_requests_granted),
            CollectionKey::NewsItems => persistence.save(key, &self.news_items),
            CollectionKey::CustomSectionItems => persistence.save(key, &self.custom_section_items),
            CollectionKey::PriorityNudgingItems => persistence.save(key, &self.priority_nudging_items),
        }
    }

    /// Repair loaded request documents that break the lifecycle rules
    ///
    /// The holding collection is authoritative: unassigned requests take
    /// their origin from it and the fulfilled flag follows it. An id already
    /// seen in an earlier collection is replaced by a fresh one, and
    /// over-assigned requests keep their first persons. Returns the
    /// collections that changed.
    pub fn normalize(&mut self) -> BTreeSet<CollectionKey> {
        let mut repaired = BTreeSet::new();
        let mut seen = HashSet::new();
        for stage in RequestStage::ALL {
            let key = Self::request_key(stage);
            let origin = match stage {
                RequestStage::New => Some(RequestOrigin::Board),
                RequestStage::MotiusAsk => Some(RequestOrigin::MotiusAsk),
                RequestStage::InProcess | RequestStage::Fulfilled => None,
            };
            let fulfilled = stage == RequestStage::Fulfilled;

            for request in self.requests_mut(stage) {
                if !seen.insert(request.id.clone()) {
                    let fresh = RecordId::generate();
                    tracing::warn!(
                        "Request {} in {} duplicates an earlier id, reassigned to {}",
                        request.id,
                        key,
                        fresh
                    );
                    request.id = fresh.clone();
                    seen.insert(fresh);
                    repaired.insert(key);
                }
                if let Some(origin) = origin.filter(|o| *o != request.origin) {
                    tracing::debug!("Request {} origin set to {:?} from {}", request.id, origin, key);
                    request.origin = origin;
                    repaired.insert(key);
                }
                if request.is_fulfilled != fulfilled {
                    request.is_fulfilled = fulfilled;
                    repaired.insert(key);
                }
                if request.responsible_persons.len() > MAX_REQUEST_RESPONSIBLES {
                    tracing::warn!(
                        "Request {} had {} responsible persons, keeping the first {}",
                        request.id,
                        request.responsible_persons.len(),
                        MAX_REQUEST_RESPONSIBLES
                    );
                    request.responsible_persons.truncate(MAX_REQUEST_RESPONSIBLES);
                    repaired.insert(key);
                }
            }
        }
        repaired
    }

    /// Collection backing a request stage
    #[must_use]
    pub fn requests(&self, stage: RequestStage) -> &Vec<RequestItem> {
        match stage {
            RequestStage::New => &self.new_requests,
            RequestStage::InProcess => &self.requests_in_process,
            RequestStage::MotiusAsk => &self.motius_asks,
            RequestStage::Fulfilled => &self.fulfilled_requests,
        }
    }

    /// Mutable collection backing a request stage
    pub fn requests_mut(&mut self, stage: RequestStage) -> &mut Vec<RequestItem> {
        match stage {
            RequestStage::New => &mut self.new_requests,
            RequestStage::InProcess => &mut self.requests_in_process,
            RequestStage::MotiusAsk => &mut self.motius_asks,
            RequestStage::Fulfilled => &mut self.fulfilled_requests,
        }
    }

    /// Storage key of a request stage
    #[must_use]
    pub fn request_key(stage: RequestStage) -> CollectionKey {
        match stage {
            RequestStage::New => CollectionKey::NewRequests,
            RequestStage::InProcess => CollectionKey::RequestsInProcess,
            RequestStage::MotiusAsk => CollectionKey::MotiusAsks,
            RequestStage::Fulfilled => CollectionKey::FulfilledRequests,
        }
    }

    /// Stage currently holding request `id`
    #[must_use]
    pub fn request_stage(&self, id: &RecordId) -> Option<RequestStage> {
        RequestStage::ALL
            .into_iter()
            .find(|stage| self.requests(*stage).iter().any(|r| &r.id == id))
    }

    /// Request `id`, wherever it lives
    #[must_use]
    pub fn request(&self, id: &RecordId) -> Option<&RequestItem> {
        let stage = self.request_stage(id)?;
        self.requests(stage).iter().find(|r| &r.id == id)
    }

    /// Remove request `id` from `stage`
    pub fn take_request(&mut self, stage: RequestStage, id: &RecordId) -> Option<RequestItem> {
        let list = self.requests_mut(stage);
        let pos = list.iter().position(|r| &r.id == id)?;
        Some(list.remove(pos))
    }

    /// Stage currently holding joiner `id`
    #[must_use]
    pub fn joiner_stage(&self, id: &RecordId) -> Option<JoinerStage> {
        if self.new_joiners.iter().any(|j| &j.id == id) {
            Some(JoinerStage::Active)
        } else if self.recent_joiners.iter().any(|j| &j.id == id) {
            Some(JoinerStage::Archived)
        } else {
            None
        }
    }

    /// Registry lookup
    #[must_use]
    pub fn person(&self, id: &RecordId) -> Option<&ResponsiblePerson> {
        self.responsible_persons.iter().find(|p| &p.id == id)
    }

    /// Resolve an optional person id to a snapshot; unknown ids resolve to `None`
    #[must_use]
    pub fn resolve_person(&self, id: Option<&RecordId>) -> Option<ResponsiblePerson> {
        id.and_then(|id| self.person(id)).cloned()
    }

    /// Rebuild the fulfill shadow index from New ∪ InProcess
    ///
    /// Derived entries come first (New, then InProcess); entries whose id is
    /// absent from both collections follow in their previous order. Returns
    /// whether the index changed.
    pub fn reconcile_fulfill_requests(&mut self) -> bool {
        let sources: Vec<&RequestItem> = RequestStage::ALL
            .into_iter()
            .filter(|stage| stage.is_shadowed())
            .flat_map(|stage| self.requests(stage).iter())
            .collect();
        let source_ids: HashSet<&RecordId> = sources.iter().map(|r| &r.id).collect();

        let mut next: Vec<FulfillRequestItem> =
            sources.iter().map(|r| FulfillRequestItem::from(*r)).collect();
        next.extend(
            self.fulfill_requests
                .iter()
                .filter(|item| !source_ids.contains(&item.id))
                .cloned(),
        );

        if next == self.fulfill_requests {
            return false;
        }
        self.fulfill_requests = next;
        true
    }

    /// Ids shown in a kanban lane, in display order
    #[must_use]
    pub fn lane_ids(&self, lane: Lane) -> Vec<RecordId> {
        macro_rules! ids {
            ($items:expr) => {
                $items.iter().map(|item| item.id.clone()).collect()
            };
        }
        match lane {
            Lane::NewRequests => ids!(self.new_requests),
            Lane::RequestsInProcess => ids!(self.requests_in_process),
            Lane::MotiusAsks => ids!(self.motius_asks),
            Lane::FulfilledRequests => ids!(self.fulfilled_requests),
            Lane::FulfillRequests => ids!(self.fulfill_requests),
            Lane::NewJoiners => ids!(self.new_joiners),
            Lane::RecentJoiners => ids!(self.recent_joiners),
            Lane::Nominations => ids!(self.nominations),
            Lane::Onboarding => ids!(self.onboarding_list),
            Lane::CustomSection => ids!(self.custom_section_items),
            Lane::PriorityNudging => ids!(self.priority_nudging_items),
            Lane::News => ids!(self.news_items),
        }
    }

    /// Number of items in a lane
    #[must_use]
    pub fn lane_len(&self, lane: Lane) -> usize {
        match lane {
            Lane::NewRequests => self.new_requests.len(),
            Lane::RequestsInProcess => self.requests_in_process.len(),
            Lane::MotiusAsks => self.motius_asks.len(),
            Lane::FulfilledRequests => self.fulfilled_requests.len(),
            Lane::FulfillRequests => self.fulfill_requests.len(),
            Lane::NewJoiners => self.new_joiners.len(),
            Lane::RecentJoiners => self.recent_joiners.len(),
            Lane::Nominations => self.nominations.len(),
            Lane::Onboarding => self.onboarding_list.len(),
            Lane::CustomSection => self.custom_section_items.len(),
            Lane::PriorityNudging => self.priority_nudging_items.len(),
            Lane::News => self.news_items.len(),
        }
    }

    /// Count per lane
    #[must_use]
    pub fn lane_counts(&self) -> BTreeMap<Lane, usize> {
        Lane::ALL.into_iter().map(|lane| (lane, self.lane_len(lane))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use opsboard_model::{RequestDraft, RequestOrigin};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn request(id: &str, name: &str) -> RequestItem {
        RequestItem::from_draft(
            RecordId::from(id),
            RequestDraft::new(format!("text {id}"), name, format!("{name}@x.com"), "2025-01-01"),
            RequestOrigin::Board,
        )
    }

    #[test]
    fn empty_backend_loads_seed_data() {
        let persistence = Persistence::new(MemoryStore::new());
        let state = BoardState::load(&persistence, &StoreConfig::default());
        assert_eq!(state.new_requests.len(), 2);
        assert_eq!(state.motius_asks.len(), 1);
        assert_eq!(state.new_joiners.len(), 2);
        assert_eq!(state.responsible_persons.len(), 5);
        assert_eq!(state.total_requests_granted, 0);
    }

    #[test]
    fn seeding_can_be_disabled() {
        let persistence = Persistence::new(MemoryStore::new());
        let config = StoreConfig::default().with_sample_data(false);
        let state = BoardState::load(&persistence, &config);
        assert!(state.new_requests.is_empty());
        assert!(state.motius_asks.is_empty());
        assert!(state.new_joiners.is_empty());
        assert_eq!(state.responsible_persons.len(), 5);
    }

    #[test]
    fn persisted_empty_collection_is_not_reseeded() {
        let backend = Arc::new(MemoryStore::new());
        backend.insert("newRequests", "[]");
        let state = BoardState::load(&Persistence::new(Arc::clone(&backend)), &StoreConfig::default());
        assert!(state.new_requests.is_empty());
    }

    #[test]
    fn normalize_truncates_overfull_requests() {
        let backend = Arc::new(MemoryStore::new());
        let mut overfull = request("9", "ann");
        overfull.responsible_persons = StoreConfig::default().roster[..3].to_vec();
        backend.insert(
            "requestsInProcess",
            serde_json::to_string(&vec![overfull]).unwrap(),
        );
        let mut state = BoardState::load(&Persistence::new(Arc::clone(&backend)), &StoreConfig::default());
        let repaired = state.normalize();
        assert_eq!(state.requests_in_process[0].responsible_persons.len(), 2);
        assert!(repaired.contains(&CollectionKey::RequestsInProcess));
    }

    #[test]
    fn normalize_takes_origin_from_collection() {
        let backend = Arc::new(MemoryStore::new());
        backend.insert(
            "motiusAsks",
            r#"[{"id":"9","requestText":"Status","personName":"Team","email":"t@x.com","date":"2025-05-18","responsiblePersons":[],"isFulfilled":false}]"#,
        );
        let mut state = BoardState::load(&Persistence::new(Arc::clone(&backend)), &StoreConfig::default());
        assert_eq!(state.motius_asks[0].origin, RequestOrigin::Board);

        let repaired = state.normalize();
        assert_eq!(state.motius_asks[0].origin, RequestOrigin::MotiusAsk);
        assert_eq!(repaired.into_iter().collect::<Vec<_>>(), vec![CollectionKey::MotiusAsks]);
    }

    #[test]
    fn normalize_reassigns_ids_seen_in_earlier_collections() {
        let mut ask = request("1", "team");
        ask.origin = RequestOrigin::MotiusAsk;
        let mut state = BoardState {
            new_requests: vec![request("1", "john")],
            motius_asks: vec![ask],
            ..BoardState::default()
        };

        let repaired = state.normalize();
        assert_eq!(state.new_requests[0].id, RecordId::from("1"));
        assert_ne!(state.motius_asks[0].id, RecordId::from("1"));
        assert_eq!(state.motius_asks[0].person_name, "team");
        assert_eq!(state.request_stage(&state.motius_asks[0].id), Some(RequestStage::MotiusAsk));
        assert_eq!(repaired.into_iter().collect::<Vec<_>>(), vec![CollectionKey::MotiusAsks]);
    }

    #[test]
    fn normalize_leaves_consistent_state_alone() {
        let mut state = BoardState::load(&Persistence::new(MemoryStore::new()), &StoreConfig::default());
        let before = state.clone();
        assert!(state.normalize().is_empty());
        assert_eq!(state, before);
    }

    #[test]
    fn reconcile_derives_then_preserves_orphans() {
        let mut state = BoardState {
            new_requests: vec![request("1", "a")],
            requests_in_process: vec![request("2", "b")],
            ..BoardState::default()
        };
        let mut orphan = FulfillRequestItem::from(&request("7", "kept"));
        orphan.is_completed = true;
        let mut stale = FulfillRequestItem::from(&request("1", "a"));
        stale.name = "edited".into();
        state.fulfill_requests = vec![orphan.clone(), stale];

        assert!(state.reconcile_fulfill_requests());
        let ids: Vec<_> = state.fulfill_requests.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "7"]);
        assert_eq!(state.fulfill_requests[0].name, "a");
        assert_eq!(state.fulfill_requests[2], orphan);

        assert!(!state.reconcile_fulfill_requests());
    }

    #[test]
    fn request_lookup_spans_all_stages() {
        let state = BoardState {
            fulfilled_requests: vec![request("5", "e")],
            ..BoardState::default()
        };
        assert_eq!(state.request_stage(&"5".into()), Some(RequestStage::Fulfilled));
        assert_eq!(state.request(&"5".into()).map(|r| r.person_name.as_str()), Some("e"));
        assert_eq!(state.request_stage(&"6".into()), None);
    }

    #[test]
    fn lane_counts_cover_every_lane() {
        let state = BoardState {
            new_requests: vec![request("1", "a"), request("2", "b")],
            ..BoardState::default()
        };
        let counts = state.lane_counts();
        assert_eq!(counts.len(), Lane::ALL.len());
        assert_eq!(counts[&Lane::NewRequests], 2);
        assert_eq!(state.lane_ids(Lane::NewRequests), vec![RecordId::from("1"), RecordId::from("2")]);
    }
}
