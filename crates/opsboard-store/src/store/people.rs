//! Joiners and nominations

use super::DashboardStore;
use crate::persistence::CollectionKey;
use opsboard_model::{JoinerItem, JoinerStage, NominationItem, PersonDraft, RecordId};

/// Which notification flag a toggle flips
#[derive(Debug, Clone, Copy)]
enum Notification {
    InApp,
    Email,
}

impl DashboardStore {
    // ---- joiners ----

    /// Register a new joiner on the board
    pub fn add_joiner(&self, draft: PersonDraft) -> JoinerItem {
        let creation_date = self.now_string();
        self.mutate("add_joiner", |state, touched| {
            let joiner = JoinerItem {
                id: RecordId::generate(),
                responsible_person: state.resolve_person(draft.responsible_person_id.as_ref()),
                name: draft.name,
                company: draft.company,
                email: draft.email,
                is_in_app_notification_sent: false,
                is_email_notification_sent: false,
                creation_date,
            };
            state.new_joiners.push(joiner.clone());
            state.weekly_stats.new_joiners += 1;
            touched.mark(CollectionKey::NewJoiners);
            touched.mark(CollectionKey::WeeklyStats);
            tracing::info!("Joiner {} added ({})", joiner.id, joiner.name);
            joiner
        })
    }

    /// Flip the in-app flag of an active joiner; archives once both flags are set
    pub fn toggle_joiner_in_app_notification(&self, id: &RecordId) -> Option<JoinerStage> {
        self.toggle_joiner(id, Notification::InApp)
    }

    /// Flip the email flag of an active joiner; archives once both flags are set
    pub fn toggle_joiner_email_notification(&self, id: &RecordId) -> Option<JoinerStage> {
        self.toggle_joiner(id, Notification::Email)
    }

    fn toggle_joiner(&self, id: &RecordId, flag: Notification) -> Option<JoinerStage> {
        self.mutate("toggle_joiner_notification", |state, touched| {
            let pos = state.new_joiners.iter().position(|j| &j.id == id)?;
            let joiner = &mut state.new_joiners[pos];
            match flag {
                Notification::InApp => joiner.is_in_app_notification_sent ^= true,
                Notification::Email => joiner.is_email_notification_sent ^= true,
            }
            touched.mark(CollectionKey::NewJoiners);

            if !joiner.fully_notified() {
                return Some(JoinerStage::Active);
            }
            let archived = state.new_joiners.remove(pos);
            state.recent_joiners.push(archived);
            touched.mark(CollectionKey::RecentJoiners);
            tracing::info!("Joiner {} archived", id);
            Some(JoinerStage::Archived)
        })
    }

    /// Set the responsible person of an active joiner
    pub fn assign_responsible_to_joiner(&self, id: &RecordId, person_id: &RecordId) -> bool {
        self.mutate("assign_responsible_to_joiner", |state, touched| {
            let Some(person) = state.person(person_id).cloned() else {
                return false;
            };
            let Some(joiner) = state.new_joiners.iter_mut().find(|j| &j.id == id) else {
                return false;
            };
            joiner.responsible_person = Some(person);
            touched.mark(CollectionKey::NewJoiners);
            true
        })
    }

    /// Copy the editable fields of `edited` onto the active joiner with the same id
    pub fn update_joiner(&self, edited: &JoinerItem) -> bool {
        self.mutate("update_joiner", |state, touched| {
            let Some(joiner) = state.new_joiners.iter_mut().find(|j| j.id == edited.id) else {
                return false;
            };
            joiner.apply_edit(edited);
            touched.mark(CollectionKey::NewJoiners);
            true
        })
    }

    /// Remove an active joiner
    pub fn delete_joiner(&self, id: &RecordId) -> bool {
        self.mutate("delete_joiner", |state, touched| {
            let before = state.new_joiners.len();
            state.new_joiners.retain(|j| &j.id != id);
            let removed = state.new_joiners.len() != before;
            if removed {
                touched.mark(CollectionKey::NewJoiners);
            }
            removed
        })
    }

    /// Move an archived joiner back to the board with both flags cleared
    pub fn return_joiner_to_board(&self, id: &RecordId) -> bool {
        self.mutate("return_joiner_to_board", |state, touched| {
            let Some(pos) = state.recent_joiners.iter().position(|j| &j.id == id) else {
                return false;
            };
            let mut joiner = state.recent_joiners.remove(pos);
            joiner.is_in_app_notification_sent = false;
            joiner.is_email_notification_sent = false;
            state.new_joiners.push(joiner);
            touched.mark(CollectionKey::RecentJoiners);
            touched.mark(CollectionKey::NewJoiners);
            tracing::info!("Joiner {} returned to board", id);
            true
        })
    }

    /// Stage currently holding joiner `id`
    #[must_use]
    pub fn joiner_stage(&self, id: &RecordId) -> Option<JoinerStage> {
        self.state.read().joiner_stage(id)
    }

    // ---- nominations ----

    /// Add a nomination
    pub fn add_nomination(&self, draft: PersonDraft) -> NominationItem {
        let creation_date = self.now_string();
        self.mutate("add_nomination", |state, touched| {
            let nomination = NominationItem {
                id: RecordId::generate(),
                responsible_person: state.resolve_person(draft.responsible_person_id.as_ref()),
                name: draft.name,
                company: draft.company,
                email: draft.email,
                is_in_app_notification_sent: false,
                is_email_notification_sent: false,
                creation_date,
            };
            state.nominations.push(nomination.clone());
            touched.mark(CollectionKey::Nominations);
            tracing::info!("Nomination {} added ({})", nomination.id, nomination.name);
            nomination
        })
    }

    /// Flip the in-app flag; returns the new value
    pub fn toggle_nomination_in_app_notification(&self, id: &RecordId) -> Option<bool> {
        self.toggle_nomination(id, Notification::InApp)
    }

    /// Flip the email flag; returns the new value
    pub fn toggle_nomination_email_notification(&self, id: &RecordId) -> Option<bool> {
        self.toggle_nomination(id, Notification::Email)
    }

    fn toggle_nomination(&self, id: &RecordId, flag: Notification) -> Option<bool> {
        self.mutate("toggle_nomination_notification", |state, touched| {
            let nomination = state.nominations.iter_mut().find(|n| &n.id == id)?;
            let value = match flag {
                Notification::InApp => &mut nomination.is_in_app_notification_sent,
                Notification::Email => &mut nomination.is_email_notification_sent,
            };
            *value = !*value;
            touched.mark(CollectionKey::Nominations);
            Some(*value)
        })
    }

    /// Set the responsible person of a nomination
    pub fn assign_responsible_to_nomination(&self, id: &RecordId, person_id: &RecordId) -> bool {
        self.mutate("assign_responsible_to_nomination", |state, touched| {
            let Some(person) = state.person(person_id).cloned() else {
                return false;
            };
            let Some(nomination) = state.nominations.iter_mut().find(|n| &n.id == id) else {
                return false;
            };
            nomination.responsible_person = Some(person);
            touched.mark(CollectionKey::Nominations);
            true
        })
    }

    /// Copy the editable fields of `edited` onto the nomination with the same id
    pub fn update_nomination(&self, edited: &NominationItem) -> bool {
        self.mutate("update_nomination", |state, touched| {
            let Some(nomination) = state.nominations.iter_mut().find(|n| n.id == edited.id) else {
                return false;
            };
            nomination.apply_edit(edited);
            touched.mark(CollectionKey::Nominations);
            true
        })
    }

    /// Remove a nomination
    pub fn delete_nomination(&self, id: &RecordId) -> bool {
        self.remove_nomination("delete_nomination", id)
    }

    /// Close a nomination; it is removed like a delete
    pub fn complete_nomination(&self, id: &RecordId) -> bool {
        self.remove_nomination("complete_nomination", id)
    }

    fn remove_nomination(&self, op: &str, id: &RecordId) -> bool {
        self.mutate(op, |state, touched| {
            let before = state.nominations.len();
            state.nominations.retain(|n| &n.id != id);
            let removed = state.nominations.len() != before;
            if removed {
                touched.mark(CollectionKey::Nominations);
                tracing::info!("{}: nomination {}", op, id);
            }
            removed
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::persistence::MemoryStore;
    use chrono::{TimeZone, Utc};
    use opsboard_model::FixedClock;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn empty_store() -> DashboardStore {
        DashboardStore::open(
            StoreConfig::default().with_sample_data(false),
            MemoryStore::new(),
            Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2025, 6, 2, 8, 30, 0).unwrap())),
        )
    }

    #[test]
    fn joiner_gets_creation_date_and_responsible_snapshot() {
        let store = empty_store();
        let joiner = store.add_joiner(PersonDraft::new("Kim", "Acme", "kim@acme.com").with_responsible("3"));
        assert_eq!(joiner.creation_date, "2025-06-02T08:30:00.000Z");
        assert_eq!(joiner.responsible_person.map(|p| p.name), Some("Carol Davis".to_string()));
        assert_eq!(store.stats().weekly_stats.new_joiners, 1);
    }

    #[test]
    fn unknown_responsible_resolves_to_none() {
        let store = empty_store();
        let joiner = store.add_joiner(PersonDraft::new("Kim", "Acme", "kim@acme.com").with_responsible("42"));
        assert!(joiner.responsible_person.is_none());
    }

    #[test]
    fn single_flag_toggle_is_idempotent_pair() {
        let store = empty_store();
        let joiner = store.add_joiner(PersonDraft::new("Lee", "Beta", "lee@beta.io"));
        assert_eq!(store.toggle_joiner_in_app_notification(&joiner.id), Some(JoinerStage::Active));
        assert_eq!(store.toggle_joiner_in_app_notification(&joiner.id), Some(JoinerStage::Active));
        assert_eq!(store.snapshot().new_joiners[0], joiner);
    }

    #[test]
    fn both_flags_archive_and_return_resets() {
        let store = empty_store();
        let joiner = store.add_joiner(PersonDraft::new("Lee", "Beta", "lee@beta.io"));
        store.toggle_joiner_email_notification(&joiner.id);
        assert_eq!(store.toggle_joiner_in_app_notification(&joiner.id), Some(JoinerStage::Archived));
        assert_eq!(store.joiner_stage(&joiner.id), Some(JoinerStage::Archived));

        assert_eq!(store.toggle_joiner_in_app_notification(&joiner.id), None);
        assert!(!store.delete_joiner(&joiner.id));

        assert!(store.return_joiner_to_board(&joiner.id));
        let back = store.snapshot().new_joiners[0].clone();
        assert!(!back.is_in_app_notification_sent && !back.is_email_notification_sent);
    }

    #[test]
    fn nominations_never_archive() {
        let store = empty_store();
        let nomination = store.add_nomination(PersonDraft::new("Ola", "Gamma", ""));
        assert_eq!(store.toggle_nomination_in_app_notification(&nomination.id), Some(true));
        assert_eq!(store.toggle_nomination_email_notification(&nomination.id), Some(true));
        assert_eq!(store.snapshot().nominations.len(), 1);

        assert!(store.assign_responsible_to_nomination(&nomination.id, &"5".into()));
        let mut edited = store.snapshot().nominations[0].clone();
        edited.company = "Delta".into();
        assert!(store.update_nomination(&edited));
        assert_eq!(store.snapshot().nominations[0].company, "Delta");

        assert!(store.complete_nomination(&nomination.id));
        assert!(!store.delete_nomination(&nomination.id));
    }
}
