//! Board record types
//!
//! Plain data records held by the store. Field names serialize in camelCase so
//! persisted documents keep the dashboard's original layout.
//!
//! Responsible persons are embedded by value: a record keeps the snapshot it
//! was assigned, and renaming a person in the registry never rewrites it.

use crate::id::RecordId;
use crate::stage::RequestOrigin;
use serde::{Deserialize, Serialize};

/// Maximum number of responsible persons on a request
pub const MAX_REQUEST_RESPONSIBLES: usize = 2;

/// Named, colored ownership label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsiblePerson {
    /// Registry id
    pub id: RecordId,
    /// Display name
    pub name: String,
    /// CSS color, e.g. `#3E7BFA`
    pub color: String,
}

impl ResponsiblePerson {
    /// Create a person with a fixed id
    #[must_use]
    pub fn new(id: impl Into<RecordId>, name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
        }
    }
}

/// A request tracked through the New / InProcess / Fulfilled lanes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestItem {
    pub id: RecordId,
    pub request_text: String,
    pub person_name: String,
    pub email: String,
    #[serde(default)]
    pub note: String,
    pub date: String,
    #[serde(default)]
    pub responsible_persons: Vec<ResponsiblePerson>,
    #[serde(default)]
    pub is_fulfilled: bool,
    /// Lane the request returns to once it has no responsible person left
    ///
    /// Older documents omit it; the store repairs unassigned requests from
    /// the collection holding them on load.
    #[serde(default)]
    pub origin: RequestOrigin,
}

impl RequestItem {
    /// Build a fresh request from a draft
    #[must_use]
    pub fn from_draft(id: RecordId, draft: RequestDraft, origin: RequestOrigin) -> Self {
        Self {
            id,
            request_text: draft.request_text,
            person_name: draft.person_name,
            email: draft.email,
            note: draft.note,
            date: draft.date,
            responsible_persons: Vec::new(),
            is_fulfilled: false,
            origin,
        }
    }

    /// Whether `person_id` is already among the responsible persons
    #[inline]
    #[must_use]
    pub fn has_responsible(&self, person_id: &RecordId) -> bool {
        self.responsible_persons.iter().any(|p| &p.id == person_id)
    }

    /// Copy the user-editable fields from `other`
    ///
    /// Lifecycle fields (responsible persons, fulfilment, origin) are left
    /// untouched.
    pub fn apply_edit(&mut self, other: &RequestItem) {
        self.request_text.clone_from(&other.request_text);
        self.person_name.clone_from(&other.person_name);
        self.email.clone_from(&other.email);
        self.note.clone_from(&other.note);
        self.date.clone_from(&other.date);
    }
}

/// User input for a new request or Motius ask
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDraft {
    pub request_text: String,
    pub person_name: String,
    pub email: String,
    #[serde(default)]
    pub note: String,
    pub date: String,
}

impl RequestDraft {
    /// Create a draft with an empty note
    #[must_use]
    pub fn new(
        request_text: impl Into<String>,
        person_name: impl Into<String>,
        email: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            request_text: request_text.into(),
            person_name: person_name.into(),
            email: email.into(),
            note: String::new(),
            date: date.into(),
        }
    }

    /// With note
    #[inline]
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }
}

/// A new hire moving from the board to the archive once notified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinerItem {
    pub id: RecordId,
    pub name: String,
    pub company: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_person: Option<ResponsiblePerson>,
    #[serde(default)]
    pub is_in_app_notification_sent: bool,
    #[serde(default)]
    pub is_email_notification_sent: bool,
    #[serde(default)]
    pub creation_date: String,
}

impl JoinerItem {
    /// Both notifications have gone out
    #[inline]
    #[must_use]
    pub fn fully_notified(&self) -> bool {
        self.is_in_app_notification_sent && self.is_email_notification_sent
    }

    /// Copy the user-editable fields from `other`
    pub fn apply_edit(&mut self, other: &JoinerItem) {
        self.name.clone_from(&other.name);
        self.company.clone_from(&other.company);
        self.email.clone_from(&other.email);
        self.responsible_person.clone_from(&other.responsible_person);
    }
}

/// A nomination; same shape as a joiner but never archived
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NominationItem {
    pub id: RecordId,
    pub name: String,
    pub company: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_person: Option<ResponsiblePerson>,
    #[serde(default)]
    pub is_in_app_notification_sent: bool,
    #[serde(default)]
    pub is_email_notification_sent: bool,
    #[serde(default)]
    pub creation_date: String,
}

impl NominationItem {
    /// Copy the user-editable fields from `other`
    pub fn apply_edit(&mut self, other: &NominationItem) {
        self.name.clone_from(&other.name);
        self.company.clone_from(&other.company);
        self.email.clone_from(&other.email);
        self.responsible_person.clone_from(&other.responsible_person);
    }
}

/// User input shared by joiners and nominations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonDraft {
    pub name: String,
    pub company: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub responsible_person_id: Option<RecordId>,
}

impl PersonDraft {
    /// Create a draft without a responsible person
    #[must_use]
    pub fn new(name: impl Into<String>, company: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            company: company.into(),
            email: email.into(),
            responsible_person_id: None,
        }
    }

    /// With responsible person id, resolved by the store at creation
    #[inline]
    #[must_use]
    pub fn with_responsible(mut self, person_id: impl Into<RecordId>) -> Self {
        self.responsible_person_id = Some(person_id.into());
        self
    }
}

/// Checklist entry shadowing a request that still needs fulfilment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillRequestItem {
    pub id: RecordId,
    pub name: String,
    pub request_text: String,
    pub email: String,
    #[serde(default)]
    pub is_completed: bool,
}

impl From<&RequestItem> for FulfillRequestItem {
    fn from(request: &RequestItem) -> Self {
        Self {
            id: request.id.clone(),
            name: request.person_name.clone(),
            request_text: request.request_text.clone(),
            email: request.email.clone(),
            is_completed: false,
        }
    }
}

/// Contact waiting to be onboarded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingContact {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub company: String,
    #[serde(default, alias = "notes")]
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_person: Option<ResponsiblePerson>,
    #[serde(default)]
    pub is_completed: bool,
}

/// User input for an onboarding contact
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDraft {
    pub name: String,
    pub email: String,
    pub company: String,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub responsible_person_id: Option<RecordId>,
}

/// Free-form item in the custom section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomSectionItem {
    pub id: RecordId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_person: Option<ResponsiblePerson>,
}

/// User input for a custom section item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomItemDraft {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub responsible_person_id: Option<RecordId>,
}

/// News entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub id: RecordId,
    pub person_name: String,
    pub content: String,
    pub date: String,
}

/// User input for a news entry; `date` defaults to now when absent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsDraft {
    pub person_name: String,
    pub content: String,
    #[serde(default)]
    pub date: Option<String>,
}

/// Person flagged for a priority nudge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityNudgingItem {
    pub id: RecordId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_person: Option<ResponsiblePerson>,
    #[serde(default)]
    pub creation_date: String,
}

/// User input for a priority nudging item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityNudgingDraft {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub responsible_person_id: Option<RecordId>,
}

/// Nudge count for one elapsed-week bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyNudge {
    pub week: u32,
    pub year: i32,
    pub count: u32,
}

/// Weekly counters shown by the progress trackers
///
/// Monotonic; nothing in the store resets them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStats {
    pub new_requests: u64,
    pub new_joiners: u64,
    pub requests_granted: u64,
}
