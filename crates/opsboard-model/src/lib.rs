//! OpsBoard Model
//!
//! Record types and lifecycle vocabulary for the operations board.
//!
//! # Overview
//!
//! - **Records**: requests, joiners, nominations, onboarding contacts, custom
//!   items, news, priority nudges, weekly nudges and the fulfill shadow entries
//! - **Stages**: [`RequestStage`], [`RequestOrigin`], [`JoinerStage`] and the
//!   kanban [`Lane`]s they map to
//! - **Time**: the injected [`Clock`] and the elapsed-week [`week_bucket`]
//!
//! # Example
//!
//! ```rust
//! use opsboard_model::{RecordId, RequestDraft, RequestItem, RequestOrigin};
//!
//! let draft = RequestDraft::new("Laptop", "Ann", "ann@example.com", "2025-01-01");
//! let request = RequestItem::from_draft(RecordId::generate(), draft, RequestOrigin::Board);
//! assert!(request.responsible_persons.is_empty());
//! ```

#![allow(missing_docs)]

pub mod id;
pub mod records;
pub mod route;
pub mod stage;
pub mod time;

// Re-exports
pub use id::RecordId;
pub use records::{
    ContactDraft, CustomItemDraft, CustomSectionItem, FulfillRequestItem, JoinerItem, NewsDraft,
    NewsItem, NominationItem, OnboardingContact, PersonDraft, PriorityNudgingDraft,
    PriorityNudgingItem, RequestDraft, RequestItem, ResponsiblePerson, WeeklyNudge, WeeklyStats,
    MAX_REQUEST_RESPONSIBLES,
};
pub use route::Route;
pub use stage::{JoinerStage, Lane, RequestOrigin, RequestStage};
pub use time::{
    email_notification_unlocked, format_record_date, parse_record_date, week_bucket, Clock,
    FixedClock, SystemClock,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
