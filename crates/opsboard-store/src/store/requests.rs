//! Request lifecycle and the fulfill shadow index

use super::{DashboardStore, Touched};
use crate::persistence::CollectionKey;
use crate::state::BoardState;
use opsboard_model::{
    FulfillRequestItem, RecordId, RequestDraft, RequestItem, RequestOrigin, RequestStage,
    MAX_REQUEST_RESPONSIBLES,
};

/// Move request `id` from `from` to the end of `to`, editing it on the way
fn move_request(
    state: &mut BoardState,
    touched: &mut Touched,
    id: &RecordId,
    from: RequestStage,
    to: RequestStage,
    edit: impl FnOnce(&mut RequestItem),
) -> bool {
    debug_assert!(from.can_transition_to(to), "illegal request move {from} -> {to}");
    let Some(mut request) = state.take_request(from, id) else {
        return false;
    };
    edit(&mut request);
    state.requests_mut(to).push(request);
    touched.mark(BoardState::request_key(from));
    touched.mark(BoardState::request_key(to));
    tracing::info!("Request {} moved {} -> {}", id, from, to);
    true
}

impl DashboardStore {
    /// Create a board request in New
    pub fn add_request(&self, draft: RequestDraft) -> RequestItem {
        let request = RequestItem::from_draft(RecordId::generate(), draft, RequestOrigin::Board);
        self.mutate("add_request", |state, touched| {
            state.new_requests.push(request.clone());
            state.weekly_stats.new_requests += 1;
            touched.mark(CollectionKey::NewRequests);
            touched.mark(CollectionKey::WeeklyStats);
        });
        tracing::info!("Request {} added for {}", request.id, request.person_name);
        request
    }

    /// Create an unassigned Motius ask
    pub fn add_motius_ask(&self, draft: RequestDraft) -> RequestItem {
        let request = RequestItem::from_draft(RecordId::generate(), draft, RequestOrigin::MotiusAsk);
        self.mutate("add_motius_ask", |state, touched| {
            state.motius_asks.push(request.clone());
            touched.mark(CollectionKey::MotiusAsks);
        });
        tracing::info!("Motius ask {} added", request.id);
        request
    }

    /// Stage currently holding request `id`
    #[must_use]
    pub fn request_stage(&self, id: &RecordId) -> Option<RequestStage> {
        self.state.read().request_stage(id)
    }

    /// Request `id`, wherever it lives
    #[must_use]
    pub fn request(&self, id: &RecordId) -> Option<RequestItem> {
        self.state.read().request(id).cloned()
    }

    /// Add a responsible person to an open request
    ///
    /// Unassigned requests (New, MotiusAsk) move to InProcess. A request that
    /// already has [`MAX_REQUEST_RESPONSIBLES`] persons, already lists this
    /// person, or is Fulfilled is left alone. Returns the resulting stage when
    /// the assignment was applied.
    pub fn assign_responsible_to_request(&self, request_id: &RecordId, person_id: &RecordId) -> Option<RequestStage> {
        self.mutate("assign_responsible_to_request", |state, touched| {
            let Some(person) = state.person(person_id).cloned() else {
                tracing::debug!("Unknown responsible person {}", person_id);
                return None;
            };
            let stage = state.request_stage(request_id)?;
            if stage == RequestStage::Fulfilled {
                return None;
            }

            let list = state.requests_mut(stage);
            let request = list.iter_mut().find(|r| &r.id == request_id)?;
            if request.has_responsible(person_id) || request.responsible_persons.len() >= MAX_REQUEST_RESPONSIBLES {
                return None;
            }
            request.responsible_persons.push(person);
            request.responsible_persons.truncate(MAX_REQUEST_RESPONSIBLES);

            if stage == RequestStage::InProcess {
                touched.mark(CollectionKey::RequestsInProcess);
            } else {
                move_request(state, touched, request_id, stage, RequestStage::InProcess, |_| {});
            }
            Some(RequestStage::InProcess)
        })
    }

    /// Drop a responsible person from an in-process request
    ///
    /// When the last person leaves, the request returns to the lane its origin
    /// names. Returns the resulting stage when the person was removed.
    pub fn remove_responsible_from_request(&self, request_id: &RecordId, person_id: &RecordId) -> Option<RequestStage> {
        self.mutate("remove_responsible_from_request", |state, touched| {
            let request = state
                .requests_in_process
                .iter_mut()
                .find(|r| &r.id == request_id)?;
            if !request.has_responsible(person_id) {
                return None;
            }
            request.responsible_persons.retain(|p| &p.id != person_id);
            touched.mark(CollectionKey::RequestsInProcess);

            if !request.responsible_persons.is_empty() {
                return Some(RequestStage::InProcess);
            }
            let target = request.origin.unassigned_stage();
            move_request(state, touched, request_id, RequestStage::InProcess, target, |_| {}).then_some(target)
        })
    }

    /// Grant an in-process request
    pub fn mark_request_fulfilled(&self, request_id: &RecordId) -> bool {
        self.mutate("mark_request_fulfilled", |state, touched| {
            let granted = move_request(
                state,
                touched,
                request_id,
                RequestStage::InProcess,
                RequestStage::Fulfilled,
                |r| r.is_fulfilled = true,
            );
            if !granted {
                return false;
            }
            state.total_requests_granted += 1;
            state.weekly_stats.requests_granted += 1;
            touched.mark(CollectionKey::TotalRequestsGranted);
            touched.mark(CollectionKey::WeeklyStats);
            tracing::info!("Request {} fulfilled ({} granted)", request_id, state.total_requests_granted);
            true
        })
    }

    /// Reopen a fulfilled request; the grant counters stay as they are
    pub fn return_request_to_process(&self, request_id: &RecordId) -> bool {
        self.mutate("return_request_to_process", |state, touched| {
            move_request(
                state,
                touched,
                request_id,
                RequestStage::Fulfilled,
                RequestStage::InProcess,
                |r| r.is_fulfilled = false,
            )
        })
    }

    /// Copy the editable fields of `edited` onto the stored request with the
    /// same id
    pub fn update_request(&self, edited: &RequestItem) -> bool {
        self.mutate("update_request", |state, touched| {
            let Some(stage) = state.request_stage(&edited.id) else {
                return false;
            };
            let Some(request) = state.requests_mut(stage).iter_mut().find(|r| r.id == edited.id) else {
                return false;
            };
            request.apply_edit(edited);
            touched.mark(BoardState::request_key(stage));
            true
        })
    }

    /// Delete an open request and purge its shadow entry
    ///
    /// Fulfilled requests are kept, though a lingering shadow entry with the
    /// same id is still purged. Returns whether anything was removed.
    pub fn delete_request(&self, request_id: &RecordId) -> bool {
        self.mutate("delete_request", |state, touched| {
            let mut removed = false;
            for stage in [RequestStage::New, RequestStage::InProcess, RequestStage::MotiusAsk] {
                if state.take_request(stage, request_id).is_some() {
                    touched.mark(BoardState::request_key(stage));
                    tracing::info!("Request {} deleted from {}", request_id, stage);
                    removed = true;
                }
            }
            let before = state.fulfill_requests.len();
            state.fulfill_requests.retain(|f| &f.id != request_id);
            if state.fulfill_requests.len() != before {
                touched.mark(CollectionKey::FulfillRequests);
                removed = true;
            }
            removed
        })
    }

    /// Replace a shadow entry by id
    ///
    /// The edit lasts until the next change to New or InProcess regenerates
    /// the entry, unless its request has left both lanes.
    pub fn update_fulfill_request(&self, item: &FulfillRequestItem) -> bool {
        self.mutate("update_fulfill_request", |state, touched| {
            let Some(entry) = state.fulfill_requests.iter_mut().find(|f| f.id == item.id) else {
                return false;
            };
            entry.clone_from(item);
            touched.mark(CollectionKey::FulfillRequests);
            true
        })
    }

    /// Remove a shadow entry
    pub fn complete_fulfill_request(&self, id: &RecordId) -> bool {
        self.mutate("complete_fulfill_request", |state, touched| {
            let before = state.fulfill_requests.len();
            state.fulfill_requests.retain(|f| &f.id != id);
            let removed = state.fulfill_requests.len() != before;
            if removed {
                touched.mark(CollectionKey::FulfillRequests);
            }
            removed
        })
    }
}
