//! Onboarding contacts, custom section items, news and priority nudges

use super::DashboardStore;
use crate::persistence::CollectionKey;
use opsboard_model::{
    ContactDraft, CustomItemDraft, CustomSectionItem, NewsDraft, NewsItem, OnboardingContact,
    PriorityNudgingDraft, PriorityNudgingItem, RecordId,
};

/// Replace the element of `items` whose id matches, keeping its position
macro_rules! replace_by_id {
    ($items:expr, $edited:expr) => {
        match $items.iter_mut().find(|item| item.id == $edited.id) {
            Some(slot) => {
                slot.clone_from($edited);
                true
            }
            None => false,
        }
    };
}

/// Remove the element of `items` with id `$id`
macro_rules! remove_by_id {
    ($items:expr, $id:expr) => {{
        let before = $items.len();
        $items.retain(|item| &item.id != $id);
        $items.len() != before
    }};
}

impl DashboardStore {
    // ---- onboarding ----

    /// Add a contact to the onboarding list
    pub fn add_onboarding_contact(&self, draft: ContactDraft) -> OnboardingContact {
        self.mutate("add_onboarding_contact", |state, touched| {
            let contact = OnboardingContact {
                id: RecordId::generate(),
                responsible_person: state.resolve_person(draft.responsible_person_id.as_ref()),
                name: draft.name,
                email: draft.email,
                company: draft.company,
                note: draft.note,
                is_completed: false,
            };
            state.onboarding_list.push(contact.clone());
            touched.mark(CollectionKey::OnboardingList);
            tracing::info!("Onboarding contact {} added", contact.id);
            contact
        })
    }

    /// Replace the stored contact with the same id
    pub fn update_onboarding_contact(&self, edited: &OnboardingContact) -> bool {
        self.mutate("update_onboarding_contact", |state, touched| {
            let replaced = replace_by_id!(state.onboarding_list, edited);
            if replaced {
                touched.mark(CollectionKey::OnboardingList);
            }
            replaced
        })
    }

    /// Remove a contact
    pub fn delete_onboarding_contact(&self, id: &RecordId) -> bool {
        self.mutate("delete_onboarding_contact", |state, touched| {
            let removed = remove_by_id!(state.onboarding_list, id);
            if removed {
                touched.mark(CollectionKey::OnboardingList);
            }
            removed
        })
    }

    /// Finish onboarding a contact; it leaves the list
    pub fn complete_onboarding_contact(&self, id: &RecordId) -> bool {
        self.mutate("complete_onboarding_contact", |state, touched| {
            let removed = remove_by_id!(state.onboarding_list, id);
            if removed {
                touched.mark(CollectionKey::OnboardingList);
                tracing::info!("Onboarding contact {} completed", id);
            }
            removed
        })
    }

    // ---- custom section ----

    /// Add a custom section item
    pub fn add_custom_section_item(&self, draft: CustomItemDraft) -> CustomSectionItem {
        self.mutate("add_custom_section_item", |state, touched| {
            let item = CustomSectionItem {
                id: RecordId::generate(),
                responsible_person: state.resolve_person(draft.responsible_person_id.as_ref()),
                name: draft.name,
                email: draft.email,
                note: draft.note,
            };
            state.custom_section_items.push(item.clone());
            touched.mark(CollectionKey::CustomSectionItems);
            item
        })
    }

    /// Replace the stored custom item with the same id
    pub fn update_custom_section_item(&self, edited: &CustomSectionItem) -> bool {
        self.mutate("update_custom_section_item", |state, touched| {
            let replaced = replace_by_id!(state.custom_section_items, edited);
            if replaced {
                touched.mark(CollectionKey::CustomSectionItems);
            }
            replaced
        })
    }

    /// Remove a custom item
    pub fn delete_custom_section_item(&self, id: &RecordId) -> bool {
        self.mutate("delete_custom_section_item", |state, touched| {
            let removed = remove_by_id!(state.custom_section_items, id);
            if removed {
                touched.mark(CollectionKey::CustomSectionItems);
            }
            removed
        })
    }

    // ---- news ----

    /// Publish a news item, dated now unless the draft says otherwise
    pub fn add_news_item(&self, draft: NewsDraft) -> NewsItem {
        let date = draft.date.unwrap_or_else(|| self.now_string());
        let item = NewsItem {
            id: RecordId::generate(),
            person_name: draft.person_name,
            content: draft.content,
            date,
        };
        self.mutate("add_news_item", |state, touched| {
            state.news_items.push(item.clone());
            touched.mark(CollectionKey::NewsItems);
        });
        tracing::info!("News item {} added", item.id);
        item
    }

    /// Replace the stored news item with the same id
    pub fn update_news_item(&self, edited: &NewsItem) -> bool {
        self.mutate("update_news_item", |state, touched| {
            let replaced = replace_by_id!(state.news_items, edited);
            if replaced {
                touched.mark(CollectionKey::NewsItems);
            }
            replaced
        })
    }

    /// Remove a news item
    pub fn delete_news_item(&self, id: &RecordId) -> bool {
        self.mutate("delete_news_item", |state, touched| {
            let removed = remove_by_id!(state.news_items, id);
            if removed {
                touched.mark(CollectionKey::NewsItems);
            }
            removed
        })
    }

    // ---- priority nudging ----

    /// Flag a person for a priority nudge, created now
    ///
    /// A blank email is stored as absent; an unknown person id leaves the
    /// item unassigned.
    pub fn add_priority_nudging_item(&self, draft: PriorityNudgingDraft) -> PriorityNudgingItem {
        let creation_date = self.now_string();
        let item = self.mutate("add_priority_nudging_item", |state, touched| {
            let item = PriorityNudgingItem {
                id: RecordId::generate(),
                responsible_person: state.resolve_person(draft.responsible_person_id.as_ref()),
                name: draft.name,
                email: draft.email.filter(|email| !email.trim().is_empty()),
                note: draft.note,
                creation_date,
            };
            state.priority_nudging_items.push(item.clone());
            touched.mark(CollectionKey::PriorityNudgingItems);
            item
        });
        tracing::info!("Priority nudge {} added for {}", item.id, item.name);
        item
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::persistence::MemoryStore;
    use chrono::{TimeZone, Utc};
    use opsboard_model::{FixedClock, Lane};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn store_with_backend() -> (DashboardStore, Arc<MemoryStore>) {
        let backend = Arc::new(MemoryStore::new());
        let store = DashboardStore::open(
            StoreConfig::default().with_sample_data(false),
            Arc::clone(&backend),
            Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2025, 3, 3, 10, 0, 0).unwrap())),
        );
        (store, backend)
    }

    #[test]
    fn responsible_snapshot_ignores_later_renames() {
        let (store, _) = store_with_backend();
        let contact = store.add_onboarding_contact(ContactDraft {
            name: "Rae".into(),
            email: "rae@x.com".into(),
            company: "Zeta".into(),
            note: String::new(),
            responsible_person_id: Some("2".into()),
        });
        assert_eq!(contact.responsible_person.as_ref().map(|p| p.color.as_str()), Some("#10B981"));

        let mut renamed = contact.clone();
        renamed.name = "Rae Q".into();
        assert!(store.update_onboarding_contact(&renamed));
        assert_eq!(store.snapshot().onboarding_list, vec![renamed]);

        assert!(store.complete_onboarding_contact(&contact.id));
        assert!(!store.delete_onboarding_contact(&contact.id));
    }

    #[test]
    fn news_date_defaults_to_now() {
        let (store, backend) = store_with_backend();
        let dated = store.add_news_item(NewsDraft {
            person_name: "Ann".into(),
            content: "Hello".into(),
            date: Some("2025-01-01".into()),
        });
        let undated = store.add_news_item(NewsDraft {
            person_name: "Bo".into(),
            content: "Hi".into(),
            date: None,
        });
        assert_eq!(dated.date, "2025-01-01");
        assert_eq!(undated.date, "2025-03-03T10:00:00.000Z");
        assert!(backend.get("newsItems").unwrap().contains("Hello"));

        assert!(store.delete_news_item(&dated.id));
        assert_eq!(store.snapshot().news_items, vec![undated]);
    }

    #[test]
    fn custom_items_crud() {
        let (store, _) = store_with_backend();
        let item = store.add_custom_section_item(CustomItemDraft {
            name: "Swag".into(),
            ..CustomItemDraft::default()
        });
        assert!(item.email.is_none());

        let mut edited = item.clone();
        edited.email = Some("swag@x.com".into());
        assert!(store.update_custom_section_item(&edited));
        assert!(!store.update_custom_section_item(&CustomSectionItem {
            id: "nope".into(),
            ..edited.clone()
        }));
        assert!(store.delete_custom_section_item(&item.id));
        assert!(store.snapshot().custom_section_items.is_empty());
    }

    #[test]
    fn priority_nudge_resolves_person_and_dates_now() {
        let (store, backend) = store_with_backend();
        let owned = store.add_priority_nudging_item(PriorityNudgingDraft {
            name: "Lea".into(),
            email: Some("lea@x.com".into()),
            note: "Chase the contract".into(),
            responsible_person_id: Some("3".into()),
        });
        let unowned = store.add_priority_nudging_item(PriorityNudgingDraft {
            name: "Max".into(),
            email: Some("  ".into()),
            responsible_person_id: Some("404".into()),
            ..PriorityNudgingDraft::default()
        });

        assert_eq!(owned.responsible_person.map(|p| p.name), Some("Carol Davis".to_string()));
        assert_eq!(owned.creation_date, "2025-03-03T10:00:00.000Z");
        assert_eq!(unowned.responsible_person, None);
        assert_eq!(unowned.email, None);
        assert_eq!(store.lane(Lane::PriorityNudging), vec![owned.id, unowned.id]);
        assert!(backend.get("priorityNudgingItems").unwrap().contains("Chase the contract"));
    }
}
