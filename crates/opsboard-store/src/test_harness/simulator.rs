//! Board simulator
//!
//! Drives a [`DashboardStore`] with a seeded stream of random operations and
//! checks the board invariants after every step. Unknown ids are mixed in on
//! purpose; they must leave the board untouched.

use crate::config::StoreConfig;
use crate::persistence::{CollectionKey, MemoryStore};
use crate::state::BoardState;
use crate::store::DashboardStore;
use chrono::{Duration, TimeZone, Utc};
use opsboard_model::{
    FixedClock, FulfillRequestItem, PersonDraft, PriorityNudgingDraft, RecordId, RequestDraft,
    RequestItem, RequestOrigin, RequestStage, MAX_REQUEST_RESPONSIBLES,
};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, HashSet};
use std::fmt::Write as _;
use std::sync::Arc;

/// Simulator configuration
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Random seed for reproducibility
    pub seed: u64,
    /// Total operations to execute
    pub total_operations: u64,
    /// Share of operations aimed at ids that do not exist
    pub unknown_id_ratio: f64,
    /// Start from the sample board instead of an empty one
    pub seed_sample_data: bool,
    pub stop_on_first_violation: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            total_operations: 2_000,
            unknown_id_ratio: 0.1,
            seed_sample_data: true,
            stop_on_first_violation: true,
        }
    }
}

/// Every operation the simulator can generate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulatedOperation {
    AddRequest,
    AddMotiusAsk,
    AssignRequest(RecordId, RecordId),
    UnassignRequest(RecordId, RecordId),
    FulfillRequest(RecordId),
    ReopenRequest(RecordId),
    EditRequest(RecordId),
    DeleteRequest(RecordId),
    EditFulfillEntry(RecordId),
    CompleteFulfillEntry(RecordId),
    AddJoiner,
    ToggleJoinerInApp(RecordId),
    ToggleJoinerEmail(RecordId),
    ReturnJoiner(RecordId),
    DeleteJoiner(RecordId),
    AddNomination,
    ToggleNomination(RecordId),
    CompleteNomination(RecordId),
    AddNudge,
    AddPriorityNudge(Option<RecordId>),
    AddPerson,
    AdvanceClock(i64),
}

impl SimulatedOperation {
    fn name(&self) -> &'static str {
        match self {
            Self::AddRequest => "add_request",
            Self::AddMotiusAsk => "add_motius_ask",
            Self::AssignRequest(..) => "assign_request",
            Self::UnassignRequest(..) => "unassign_request",
            Self::FulfillRequest(_) => "fulfill_request",
            Self::ReopenRequest(_) => "reopen_request",
            Self::EditRequest(_) => "edit_request",
            Self::DeleteRequest(_) => "delete_request",
            Self::EditFulfillEntry(_) => "edit_fulfill_entry",
            Self::CompleteFulfillEntry(_) => "complete_fulfill_entry",
            Self::AddJoiner => "add_joiner",
            Self::ToggleJoinerInApp(_) => "toggle_joiner_in_app",
            Self::ToggleJoinerEmail(_) => "toggle_joiner_email",
            Self::ReturnJoiner(_) => "return_joiner",
            Self::DeleteJoiner(_) => "delete_joiner",
            Self::AddNomination => "add_nomination",
            Self::ToggleNomination(_) => "toggle_nomination",
            Self::CompleteNomination(_) => "complete_nomination",
            Self::AddNudge => "add_nudge",
            Self::AddPriorityNudge(_) => "add_priority_nudge",
            Self::AddPerson => "add_person",
            Self::AdvanceClock(_) => "advance_clock",
        }
    }

    /// Whether an applied operation regenerates the fulfill shadow index
    fn reshapes_open_lanes(&self) -> bool {
        matches!(
            self,
            Self::AddRequest
                | Self::AssignRequest(..)
                | Self::UnassignRequest(..)
                | Self::FulfillRequest(_)
                | Self::ReopenRequest(_)
        )
    }
}

/// What an operation did to the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    NoOp,
}

/// Expected outcome for an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedResult {
    MustApply,
    MustNoOp,
    Either,
}

impl ExpectedResult {
    fn admits(self, outcome: Outcome) -> bool {
        match self {
            ExpectedResult::MustApply => outcome == Outcome::Applied,
            ExpectedResult::MustNoOp => outcome == Outcome::NoOp,
            ExpectedResult::Either => true,
        }
    }
}

/// Board invariants checked after every step
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum InvariantCheck {
    ResponsibleCapRespected,
    RequestInSingleCollection,
    RequestMatchesStage,
    ArchivedJoinersFullyNotified,
    ActiveJoinersNotFullyNotified,
    ShadowIdsUnique,
    ShadowMatchesOpenLanes,
    GrantCounterCoversFulfilled,
    PersistedStateMatches,
}

/// A broken invariant
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    pub check: InvariantCheck,
    pub details: String,
}

/// A violation detected during simulation
#[derive(Debug, Clone)]
pub enum Violation {
    /// Operation outcome didn't match expectation
    UnexpectedOutcome {
        operation_index: u64,
        operation: SimulatedOperation,
        expected: ExpectedResult,
        actual: Outcome,
    },
    Invariant {
        operation_index: u64,
        violation: InvariantViolation,
    },
}

/// Counters collected during simulation
#[derive(Debug, Clone, Default)]
pub struct OperationStats {
    pub total_operations: u64,
    pub applied_operations: u64,
    pub noop_operations: u64,
    pub operations_by_type: BTreeMap<&'static str, u64>,
}

impl OperationStats {
    fn record(&mut self, operation: &SimulatedOperation, outcome: Outcome) {
        self.total_operations += 1;
        *self.operations_by_type.entry(operation.name()).or_insert(0) += 1;
        match outcome {
            Outcome::Applied => self.applied_operations += 1,
            Outcome::NoOp => self.noop_operations += 1,
        }
    }
}

/// Final report from the simulator
#[derive(Debug, Clone)]
pub struct SimulatorReport {
    pub config: SimulatorConfig,
    pub stats: OperationStats,
    pub violations: Vec<Violation>,
    pub final_state: BoardState,
}

impl SimulatorReport {
    /// No violation was found
    #[must_use]
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    /// Human-readable summary
    #[must_use]
    pub fn generate_text(&self) -> String {
        let mut report = String::new();
        let state = &self.final_state;

        report.push_str("=== Board Simulator Report ===\n\n");
        let _ = writeln!(report, "Seed: {}", self.config.seed);
        let _ = writeln!(report, "Total Operations: {}", self.stats.total_operations);
        let _ = writeln!(report, "Applied: {}", self.stats.applied_operations);
        let _ = writeln!(report, "No-ops: {}", self.stats.noop_operations);
        let _ = writeln!(report, "Violations: {}", self.violations.len());
        let _ = writeln!(
            report,
            "Final Requests: {} new, {} in process, {} asks, {} fulfilled",
            state.new_requests.len(),
            state.requests_in_process.len(),
            state.motius_asks.len(),
            state.fulfilled_requests.len()
        );
        let _ = writeln!(
            report,
            "Final Joiners: {} active, {} archived",
            state.new_joiners.len(),
            state.recent_joiners.len()
        );

        if !self.stats.operations_by_type.is_empty() {
            report.push_str("\n=== Operations ===\n");
            for (name, count) in &self.stats.operations_by_type {
                let _ = writeln!(report, "{name}: {count}");
            }
        }

        if !self.violations.is_empty() {
            report.push_str("\n=== Violations ===\n");
            for (i, v) in self.violations.iter().enumerate() {
                let _ = writeln!(report, "{}. {:?}", i + 1, v);
            }
        }

        let _ = writeln!(
            report,
            "\n=== Result: {} ===",
            if self.passed() { "PASS" } else { "FAIL" }
        );
        report
    }
}

/// Run the board simulator
#[must_use]
pub fn run_simulator(config: SimulatorConfig) -> SimulatorReport {
    let backend = Arc::new(MemoryStore::new());
    let start = Utc
        .with_ymd_and_hms(2025, 5, 12, 9, 0, 0)
        .single()
        .unwrap_or_else(Utc::now);
    let clock = Arc::new(FixedClock::new(start));
    let store_config = StoreConfig::default().with_sample_data(config.seed_sample_data);
    let store = DashboardStore::open(store_config.clone(), Arc::clone(&backend), clock.clone());

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut stats = OperationStats::default();
    let mut violations = Vec::new();

    for i in 0..config.total_operations {
        let before = store.snapshot();
        let (operation, expected) = generate_operation(&mut rng, &config, &before);
        let outcome = execute_operation(&store, &clock, &operation, i);

        if !expected.admits(outcome) {
            violations.push(Violation::UnexpectedOutcome {
                operation_index: i,
                operation: operation.clone(),
                expected,
                actual: outcome,
            });
        }
        if outcome == Outcome::NoOp && store.snapshot() != before {
            violations.push(Violation::UnexpectedOutcome {
                operation_index: i,
                operation: operation.clone(),
                expected: ExpectedResult::MustNoOp,
                actual: Outcome::Applied,
            });
        }

        let after = store.snapshot();
        let shadow_fresh = outcome == Outcome::Applied && operation.reshapes_open_lanes();
        for violation in BoardInvariants::check_all(&after, shadow_fresh) {
            violations.push(Violation::Invariant {
                operation_index: i,
                violation,
            });
        }

        stats.record(&operation, outcome);
        if config.stop_on_first_violation && !violations.is_empty() {
            break;
        }
    }

    let final_state = store.snapshot();
    let reopened = DashboardStore::open(store_config, Arc::clone(&backend), clock);
    if let Err(violation) = BoardInvariants::check_persisted(&final_state, &reopened.snapshot()) {
        violations.push(Violation::Invariant {
            operation_index: stats.total_operations,
            violation,
        });
    }

    SimulatorReport {
        config,
        stats,
        violations,
        final_state,
    }
}

fn pick<'a, T>(rng: &mut StdRng, items: &'a [T]) -> Option<&'a T> {
    items.choose(rng)
}

/// Pick an existing id from `pool`, or a fresh unknown one
fn target_id(rng: &mut StdRng, config: &SimulatorConfig, pool: &[RecordId]) -> (RecordId, bool) {
    if rng.random_bool(config.unknown_id_ratio.clamp(0.0, 1.0)) {
        return (RecordId::generate(), false);
    }
    match pick(rng, pool) {
        Some(id) => (id.clone(), true),
        None => (RecordId::generate(), false),
    }
}

fn ids(items: &[RequestItem]) -> Vec<RecordId> {
    items.iter().map(|r| r.id.clone()).collect()
}

fn generate_operation(
    rng: &mut StdRng,
    config: &SimulatorConfig,
    state: &BoardState,
) -> (SimulatedOperation, ExpectedResult) {
    let assignable: Vec<RecordId> = state
        .new_requests
        .iter()
        .chain(state.motius_asks.iter())
        .chain(state.requests_in_process.iter())
        .map(|r| r.id.clone())
        .collect();
    let in_process = ids(&state.requests_in_process);
    let fulfilled = ids(&state.fulfilled_requests);
    let all_requests: Vec<RecordId> = RequestStage::ALL
        .into_iter()
        .flat_map(|stage| ids(state.requests(stage)))
        .collect();
    let shadow: Vec<RecordId> = state.fulfill_requests.iter().map(|f| f.id.clone()).collect();
    let active: Vec<RecordId> = state.new_joiners.iter().map(|j| j.id.clone()).collect();
    let archived: Vec<RecordId> = state.recent_joiners.iter().map(|j| j.id.clone()).collect();
    let nominations: Vec<RecordId> = state.nominations.iter().map(|n| n.id.clone()).collect();
    let persons: Vec<RecordId> = state.responsible_persons.iter().map(|p| p.id.clone()).collect();

    // Known ids may still no-op (full request, fulfilled target); unknown ones never apply.
    let expect = |known: bool| if known { ExpectedResult::Either } else { ExpectedResult::MustNoOp };

    match rng.random_range(0..22) {
        0 | 1 => (SimulatedOperation::AddRequest, ExpectedResult::MustApply),
        2 => (SimulatedOperation::AddMotiusAsk, ExpectedResult::MustApply),
        3..=5 => {
            let (request, known_request) = target_id(rng, config, &assignable);
            let (person, known_person) = target_id(rng, config, &persons);
            (
                SimulatedOperation::AssignRequest(request, person),
                expect(known_request && known_person),
            )
        }
        6 | 7 => {
            let (request, known) = target_id(rng, config, &in_process);
            let person = state
                .request(&request)
                .and_then(|r| pick(rng, &r.responsible_persons))
                .map_or_else(RecordId::generate, |p| p.id.clone());
            (SimulatedOperation::UnassignRequest(request, person), expect(known))
        }
        8 => {
            let (id, known) = target_id(rng, config, &in_process);
            let expected = if known { ExpectedResult::MustApply } else { ExpectedResult::MustNoOp };
            (SimulatedOperation::FulfillRequest(id), expected)
        }
        9 => {
            let (id, known) = target_id(rng, config, &fulfilled);
            let expected = if known { ExpectedResult::MustApply } else { ExpectedResult::MustNoOp };
            (SimulatedOperation::ReopenRequest(id), expected)
        }
        10 => {
            let (id, known) = target_id(rng, config, &all_requests);
            (SimulatedOperation::EditRequest(id), expect(known))
        }
        11 => {
            let (id, known) = target_id(rng, config, &all_requests);
            (SimulatedOperation::DeleteRequest(id), expect(known))
        }
        12 => {
            let (id, known) = target_id(rng, config, &shadow);
            (SimulatedOperation::EditFulfillEntry(id), expect(known))
        }
        13 => {
            let (id, known) = target_id(rng, config, &shadow);
            (SimulatedOperation::CompleteFulfillEntry(id), expect(known))
        }
        14 => (SimulatedOperation::AddJoiner, ExpectedResult::MustApply),
        15 => {
            let (id, known) = target_id(rng, config, &active);
            let op = if rng.random_bool(0.5) {
                SimulatedOperation::ToggleJoinerInApp(id)
            } else {
                SimulatedOperation::ToggleJoinerEmail(id)
            };
            (op, expect(known))
        }
        16 => {
            let (id, known) = target_id(rng, config, &archived);
            let op = if rng.random_bool(0.8) {
                SimulatedOperation::ReturnJoiner(id)
            } else {
                SimulatedOperation::DeleteJoiner(id)
            };
            // Archived joiners cannot be deleted.
            let expected = match (&op, known) {
                (SimulatedOperation::DeleteJoiner(_), _) | (_, false) => ExpectedResult::MustNoOp,
                _ => ExpectedResult::MustApply,
            };
            (op, expected)
        }
        17 => {
            if nominations.is_empty() || rng.random_bool(0.4) {
                (SimulatedOperation::AddNomination, ExpectedResult::MustApply)
            } else {
                let (id, known) = target_id(rng, config, &nominations);
                let op = if rng.random_bool(0.7) {
                    SimulatedOperation::ToggleNomination(id)
                } else {
                    SimulatedOperation::CompleteNomination(id)
                };
                (op, expect(known))
            }
        }
        18 => (SimulatedOperation::AddNudge, ExpectedResult::MustApply),
        19 => (SimulatedOperation::AddPerson, ExpectedResult::MustApply),
        20 => {
            let (person, known) = target_id(rng, config, &persons);
            let owner = (known || rng.random_bool(0.5)).then_some(person);
            (SimulatedOperation::AddPriorityNudge(owner), ExpectedResult::MustApply)
        }
        _ => (
            SimulatedOperation::AdvanceClock(rng.random_range(1..=72)),
            ExpectedResult::Either,
        ),
    }
}

fn applied(done: bool) -> Outcome {
    if done {
        Outcome::Applied
    } else {
        Outcome::NoOp
    }
}

fn execute_operation(store: &DashboardStore, clock: &FixedClock, operation: &SimulatedOperation, index: u64) -> Outcome {
    let draft = || {
        RequestDraft::new(
            format!("Request #{index}"),
            format!("Person {index}"),
            format!("person{index}@example.com"),
            "2025-05-20",
        )
    };
    let person = || PersonDraft::new(format!("Joiner {index}"), "Simco", format!("joiner{index}@example.com"));

    match operation {
        SimulatedOperation::AddRequest => {
            store.add_request(draft());
            Outcome::Applied
        }
        SimulatedOperation::AddMotiusAsk => {
            store.add_motius_ask(draft());
            Outcome::Applied
        }
        SimulatedOperation::AssignRequest(request, person) => {
            applied(store.assign_responsible_to_request(request, person).is_some())
        }
        SimulatedOperation::UnassignRequest(request, person) => {
            applied(store.remove_responsible_from_request(request, person).is_some())
        }
        SimulatedOperation::FulfillRequest(id) => applied(store.mark_request_fulfilled(id)),
        SimulatedOperation::ReopenRequest(id) => applied(store.return_request_to_process(id)),
        SimulatedOperation::EditRequest(id) => {
            let Some(mut request) = store.request(id) else {
                return Outcome::NoOp;
            };
            request.note = format!("edited at {index}");
            request.responsible_persons.clear();
            request.origin = match request.origin {
                RequestOrigin::Board => RequestOrigin::MotiusAsk,
                RequestOrigin::MotiusAsk => RequestOrigin::Board,
            };
            applied(store.update_request(&request))
        }
        SimulatedOperation::DeleteRequest(id) => applied(store.delete_request(id)),
        SimulatedOperation::EditFulfillEntry(id) => {
            let entry = store.read(|s| s.fulfill_requests.iter().find(|f| &f.id == id).cloned());
            let Some(mut entry) = entry else {
                return Outcome::NoOp;
            };
            entry.is_completed = !entry.is_completed;
            applied(store.update_fulfill_request(&entry))
        }
        SimulatedOperation::CompleteFulfillEntry(id) => applied(store.complete_fulfill_request(id)),
        SimulatedOperation::AddJoiner => {
            store.add_joiner(person());
            Outcome::Applied
        }
        SimulatedOperation::ToggleJoinerInApp(id) => {
            applied(store.toggle_joiner_in_app_notification(id).is_some())
        }
        SimulatedOperation::ToggleJoinerEmail(id) => {
            applied(store.toggle_joiner_email_notification(id).is_some())
        }
        SimulatedOperation::ReturnJoiner(id) => applied(store.return_joiner_to_board(id)),
        SimulatedOperation::DeleteJoiner(id) => applied(store.delete_joiner(id)),
        SimulatedOperation::AddNomination => {
            store.add_nomination(person());
            Outcome::Applied
        }
        SimulatedOperation::ToggleNomination(id) => {
            applied(store.toggle_nomination_in_app_notification(id).is_some())
        }
        SimulatedOperation::CompleteNomination(id) => applied(store.complete_nomination(id)),
        SimulatedOperation::AddNudge => {
            store.add_weekly_nudge();
            Outcome::Applied
        }
        SimulatedOperation::AddPriorityNudge(owner) => {
            store.add_priority_nudging_item(PriorityNudgingDraft {
                name: format!("Nudge {index}"),
                email: None,
                note: String::new(),
                responsible_person_id: owner.clone(),
            });
            Outcome::Applied
        }
        SimulatedOperation::AddPerson => {
            store.add_custom_responsible_person(format!("Helper {index}"));
            Outcome::Applied
        }
        SimulatedOperation::AdvanceClock(hours) => {
            clock.advance(Duration::hours(*hours));
            Outcome::NoOp
        }
    }
}

/// Board invariant checks
pub struct BoardInvariants;

impl BoardInvariants {
    /// Run every structural check; `shadow_fresh` adds the shadow regeneration check
    #[must_use]
    pub fn check_all(state: &BoardState, shadow_fresh: bool) -> Vec<InvariantViolation> {
        let mut checks = vec![
            Self::check_responsible_cap(state),
            Self::check_single_collection(state),
            Self::check_request_stages(state),
            Self::check_joiners(state),
            Self::check_shadow_ids(state),
            Self::check_grant_counter(state),
        ];
        if shadow_fresh {
            checks.push(Self::check_shadow_matches(state));
        }
        checks.into_iter().filter_map(Result::err).collect()
    }

    /// No request carries more than two responsible persons
    pub fn check_responsible_cap(state: &BoardState) -> Result<(), InvariantViolation> {
        for stage in RequestStage::ALL {
            if let Some(r) = state
                .requests(stage)
                .iter()
                .find(|r| r.responsible_persons.len() > MAX_REQUEST_RESPONSIBLES)
            {
                return Err(InvariantViolation {
                    check: InvariantCheck::ResponsibleCapRespected,
                    details: format!("request {} has {} persons", r.id, r.responsible_persons.len()),
                });
            }
        }
        Ok(())
    }

    /// Each request id lives in exactly one lifecycle collection
    pub fn check_single_collection(state: &BoardState) -> Result<(), InvariantViolation> {
        let mut seen = HashSet::new();
        for stage in RequestStage::ALL {
            for r in state.requests(stage) {
                if !seen.insert(&r.id) {
                    return Err(InvariantViolation {
                        check: InvariantCheck::RequestInSingleCollection,
                        details: format!("request {} appears twice (again in {})", r.id, stage),
                    });
                }
            }
        }
        Ok(())
    }

    /// Record fields agree with the collection holding the record
    pub fn check_request_stages(state: &BoardState) -> Result<(), InvariantViolation> {
        for stage in RequestStage::ALL {
            for r in state.requests(stage) {
                let ok = match stage {
                    RequestStage::New => r.origin == RequestOrigin::Board && r.responsible_persons.is_empty(),
                    RequestStage::MotiusAsk => {
                        r.origin == RequestOrigin::MotiusAsk && r.responsible_persons.is_empty()
                    }
                    RequestStage::InProcess => !r.responsible_persons.is_empty() && !r.is_fulfilled,
                    RequestStage::Fulfilled => r.is_fulfilled,
                };
                let ok = ok && (stage == RequestStage::Fulfilled || !r.is_fulfilled);
                if !ok {
                    return Err(InvariantViolation {
                        check: InvariantCheck::RequestMatchesStage,
                        details: format!("request {} is inconsistent with stage {}", r.id, stage),
                    });
                }
            }
        }
        Ok(())
    }

    /// Archived joiners have both flags, active ones never do
    pub fn check_joiners(state: &BoardState) -> Result<(), InvariantViolation> {
        if let Some(j) = state.recent_joiners.iter().find(|j| !j.fully_notified()) {
            return Err(InvariantViolation {
                check: InvariantCheck::ArchivedJoinersFullyNotified,
                details: format!("archived joiner {} is missing a notification", j.id),
            });
        }
        if let Some(j) = state.new_joiners.iter().find(|j| j.fully_notified()) {
            return Err(InvariantViolation {
                check: InvariantCheck::ActiveJoinersNotFullyNotified,
                details: format!("active joiner {} should have been archived", j.id),
            });
        }
        Ok(())
    }

    /// Shadow entries never share an id
    pub fn check_shadow_ids(state: &BoardState) -> Result<(), InvariantViolation> {
        let mut seen = HashSet::new();
        match state.fulfill_requests.iter().find(|f| !seen.insert(&f.id)) {
            Some(dup) => Err(InvariantViolation {
                check: InvariantCheck::ShadowIdsUnique,
                details: format!("shadow entry {} duplicated", dup.id),
            }),
            None => Ok(()),
        }
    }

    /// Shadow index starts with one fresh entry per New then InProcess request
    pub fn check_shadow_matches(state: &BoardState) -> Result<(), InvariantViolation> {
        let derived: Vec<FulfillRequestItem> = state
            .new_requests
            .iter()
            .chain(state.requests_in_process.iter())
            .map(FulfillRequestItem::from)
            .collect();
        if state.fulfill_requests.len() < derived.len() || state.fulfill_requests[..derived.len()] != derived[..] {
            return Err(InvariantViolation {
                check: InvariantCheck::ShadowMatchesOpenLanes,
                details: format!(
                    "expected {} derived entries at the head of {} shadow entries",
                    derived.len(),
                    state.fulfill_requests.len()
                ),
            });
        }
        Ok(())
    }

    /// Grants are never undone, so the counter covers every fulfilled request
    pub fn check_grant_counter(state: &BoardState) -> Result<(), InvariantViolation> {
        let fulfilled = state.fulfilled_requests.len() as u64;
        if state.total_requests_granted < fulfilled {
            return Err(InvariantViolation {
                check: InvariantCheck::GrantCounterCoversFulfilled,
                details: format!("{} granted but {} fulfilled", state.total_requests_granted, fulfilled),
            });
        }
        Ok(())
    }

    /// A store reopened from the same backend sees the same board
    ///
    /// Opening reconciles the shadow index, so `live` is compared after the
    /// same reconciliation.
    pub fn check_persisted(live: &BoardState, reopened: &BoardState) -> Result<(), InvariantViolation> {
        let mut expected = live.clone();
        expected.reconcile_fulfill_requests();
        if &expected == reopened {
            return Ok(());
        }
        let (Ok(a), Ok(b)) = (serde_json::to_value(&expected), serde_json::to_value(reopened)) else {
            return Err(InvariantViolation {
                check: InvariantCheck::PersistedStateMatches,
                details: "reopened board differs".to_string(),
            });
        };
        let differing: Vec<&str> = CollectionKey::ALL
            .into_iter()
            .map(CollectionKey::as_str)
            .filter(|key| a.get(key) != b.get(key))
            .collect();
        Err(InvariantViolation {
            check: InvariantCheck::PersistedStateMatches,
            details: format!("reopened board differs in {differing:?}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_run_passes() {
        let report = run_simulator(SimulatorConfig {
            total_operations: 500,
            ..SimulatorConfig::default()
        });
        assert!(report.passed(), "{}", report.generate_text());
        assert_eq!(report.stats.total_operations, 500);
    }

    #[test]
    fn same_seed_same_board_shape() {
        let config = SimulatorConfig {
            seed: 7,
            total_operations: 300,
            ..SimulatorConfig::default()
        };
        let a = run_simulator(config.clone());
        let b = run_simulator(config);
        assert_eq!(a.stats.operations_by_type, b.stats.operations_by_type);
        assert_eq!(a.final_state.lane_counts(), b.final_state.lane_counts());
    }

    #[test]
    fn invariants_flag_overfull_request() {
        let mut state = BoardState::default();
        let mut request = RequestItem::from_draft(
            RecordId::from("1"),
            RequestDraft::new("a", "b", "c", "2025-01-01"),
            RequestOrigin::Board,
        );
        request.responsible_persons = crate::seed::initial_roster();
        state.requests_in_process.push(request);
        let checks: Vec<_> = BoardInvariants::check_all(&state, false)
            .into_iter()
            .map(|v| v.check)
            .collect();
        assert!(checks.contains(&InvariantCheck::ResponsibleCapRespected));
    }

    #[test]
    fn report_text_mentions_result() {
        let report = run_simulator(SimulatorConfig {
            total_operations: 20,
            ..SimulatorConfig::default()
        });
        let text = report.generate_text();
        assert!(text.contains("Seed: 42"));
        assert!(text.contains("Result: PASS"));
    }
}
