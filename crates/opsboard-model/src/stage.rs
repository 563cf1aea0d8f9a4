//! Lifecycle stages and kanban lanes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Collection a request currently lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStage {
    /// Unassigned board request
    New,
    /// At least one responsible person assigned
    InProcess,
    /// Unassigned Motius ask
    MotiusAsk,
    /// Granted
    Fulfilled,
}

impl RequestStage {
    /// All stages in lane order
    pub const ALL: [RequestStage; 4] = [
        RequestStage::New,
        RequestStage::InProcess,
        RequestStage::MotiusAsk,
        RequestStage::Fulfilled,
    ];

    /// Stages reachable from `self` through store operations
    #[must_use]
    pub fn allowed_transitions(self) -> &'static [RequestStage] {
        match self {
            RequestStage::New | RequestStage::MotiusAsk => &[RequestStage::InProcess],
            RequestStage::InProcess => &[RequestStage::New, RequestStage::MotiusAsk, RequestStage::Fulfilled],
            RequestStage::Fulfilled => &[RequestStage::InProcess],
        }
    }

    /// Whether `self -> to` is a legal move
    #[inline]
    #[must_use]
    pub fn can_transition_to(self, to: RequestStage) -> bool {
        self.allowed_transitions().contains(&to)
    }

    /// Whether requests in this stage are mirrored by the fulfill shadow index
    #[inline]
    #[must_use]
    pub fn is_shadowed(self) -> bool {
        matches!(self, RequestStage::New | RequestStage::InProcess)
    }
}

impl fmt::Display for RequestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestStage::New => "new",
            RequestStage::InProcess => "in-process",
            RequestStage::MotiusAsk => "motius-ask",
            RequestStage::Fulfilled => "fulfilled",
        };
        f.write_str(name)
    }
}

/// Where a request was created, and where it falls back when unassigned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestOrigin {
    /// Regular board request
    #[default]
    Board,
    /// Motius ask
    MotiusAsk,
}

impl RequestOrigin {
    /// Stage an unassigned request of this origin lives in
    #[inline]
    #[must_use]
    pub fn unassigned_stage(self) -> RequestStage {
        match self {
            RequestOrigin::Board => RequestStage::New,
            RequestOrigin::MotiusAsk => RequestStage::MotiusAsk,
        }
    }
}

/// Collection a joiner currently lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinerStage {
    /// Waiting for notifications (`newJoiners`)
    Active,
    /// Both notifications sent (`recentJoiners`)
    Archived,
}

/// Kanban column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Lane {
    NewRequests,
    RequestsInProcess,
    MotiusAsks,
    FulfillRequests,
    NewJoiners,
    Nominations,
    Onboarding,
    CustomSection,
    PriorityNudging,
    FulfilledRequests,
    RecentJoiners,
    News,
}

impl Lane {
    /// Every lane, board lanes first, backend lanes last
    pub const ALL: [Lane; 12] = [
        Lane::NewRequests,
        Lane::RequestsInProcess,
        Lane::MotiusAsks,
        Lane::FulfillRequests,
        Lane::NewJoiners,
        Lane::Nominations,
        Lane::Onboarding,
        Lane::CustomSection,
        Lane::PriorityNudging,
        Lane::FulfilledRequests,
        Lane::RecentJoiners,
        Lane::News,
    ];

    /// Column heading
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Lane::NewRequests => "New Requests",
            Lane::RequestsInProcess => "Requests in Process",
            Lane::MotiusAsks => "Motius Asks",
            Lane::FulfillRequests => "Fulfill Requests",
            Lane::NewJoiners => "New Joiners",
            Lane::Nominations => "Nominations",
            Lane::Onboarding => "Onboarding",
            Lane::CustomSection => "Custom Section",
            Lane::PriorityNudging => "Priority Nudging",
            Lane::FulfilledRequests => "Fulfilled Requests",
            Lane::RecentJoiners => "Recent Joiners",
            Lane::News => "News",
        }
    }
}

impl From<RequestStage> for Lane {
    fn from(stage: RequestStage) -> Self {
        match stage {
            RequestStage::New => Lane::NewRequests,
            RequestStage::InProcess => Lane::RequestsInProcess,
            RequestStage::MotiusAsk => Lane::MotiusAsks,
            RequestStage::Fulfilled => Lane::FulfilledRequests,
        }
    }
}

impl From<JoinerStage> for Lane {
    fn from(stage: JoinerStage) -> Self {
        match stage {
            JoinerStage::Active => Lane::NewJoiners,
            JoinerStage::Archived => Lane::RecentJoiners,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unassigned_requests_only_move_to_in_process() {
        assert!(RequestStage::New.can_transition_to(RequestStage::InProcess));
        assert!(RequestStage::MotiusAsk.can_transition_to(RequestStage::InProcess));
        assert!(!RequestStage::New.can_transition_to(RequestStage::Fulfilled));
        assert!(!RequestStage::MotiusAsk.can_transition_to(RequestStage::New));
    }

    #[test]
    fn fulfilled_only_returns_to_process() {
        assert_eq!(RequestStage::Fulfilled.allowed_transitions(), &[RequestStage::InProcess]);
    }

    #[test]
    fn origin_maps_to_unassigned_stage() {
        assert_eq!(RequestOrigin::Board.unassigned_stage(), RequestStage::New);
        assert_eq!(RequestOrigin::MotiusAsk.unassigned_stage(), RequestStage::MotiusAsk);
    }

    #[test]
    fn shadowed_stages() {
        let shadowed: Vec<_> = RequestStage::ALL.into_iter().filter(|s| s.is_shadowed()).collect();
        assert_eq!(shadowed, vec![RequestStage::New, RequestStage::InProcess]);
    }
}
