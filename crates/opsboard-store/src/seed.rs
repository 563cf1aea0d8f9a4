//! Built-in defaults used when a collection has never been persisted

use opsboard_model::{
    JoinerItem, RecordId, RequestDraft, RequestItem, RequestOrigin, ResponsiblePerson,
};

/// Palette for custom responsible persons
pub const DEFAULT_PALETTE: [&str; 8] = [
    "#3E7BFA", "#10B981", "#F59E0B", "#EC4899", "#8B5CF6", "#EF4444", "#14B8A6", "#6366F1",
];

/// The five people every fresh board starts with
#[must_use]
pub fn initial_roster() -> Vec<ResponsiblePerson> {
    vec![
        ResponsiblePerson::new("1", "Alice Johnson", "#3E7BFA"),
        ResponsiblePerson::new("2", "Bob Smith", "#10B981"),
        ResponsiblePerson::new("3", "Carol Davis", "#F59E0B"),
        ResponsiblePerson::new("4", "Dave Wilson", "#EC4899"),
        ResponsiblePerson::new("5", "Eve Brown", "#8B5CF6"),
    ]
}

pub(crate) fn sample_new_requests() -> Vec<RequestItem> {
    vec![
        RequestItem::from_draft(
            RecordId::from("1"),
            RequestDraft::new(
                "Access to Design System",
                "John Doe",
                "john.doe@example.com",
                "2025-05-15",
            )
            .with_note("Needs access to Figma workspace"),
            RequestOrigin::Board,
        ),
        RequestItem::from_draft(
            RecordId::from("2"),
            RequestDraft::new(
                "New Laptop Setup",
                "Sarah Miller",
                "sarah.miller@example.com",
                "2025-05-17",
            )
            .with_note("M1 MacBook Pro with dev tools"),
            RequestOrigin::Board,
        ),
    ]
}

pub(crate) fn sample_motius_asks() -> Vec<RequestItem> {
    // Request ids are unique across lanes; the ask continues the numbering.
    vec![RequestItem::from_draft(
        RecordId::from("3"),
        RequestDraft::new(
            "Weekly Project Update",
            "Motius Team",
            "team@motius.com",
            "2025-05-18",
        )
        .with_note("Send progress report by Friday"),
        RequestOrigin::MotiusAsk,
    )]
}

pub(crate) fn sample_new_joiners() -> Vec<JoinerItem> {
    let joiner = |id: &str, name: &str, company: &str, email: &str| JoinerItem {
        id: RecordId::from(id),
        name: name.to_string(),
        company: company.to_string(),
        email: email.to_string(),
        responsible_person: None,
        is_in_app_notification_sent: false,
        is_email_notification_sent: false,
        creation_date: "2025-05-10T09:00:00.000Z".to_string(),
    };
    vec![
        joiner("1", "Mike Robinson", "Acme Inc.", "mike.robinson@acme.com"),
        joiner("2", "Lisa Chen", "Global Tech", "lisa.chen@globaltech.com"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn sample_request_ids_do_not_collide() {
        let ids: HashSet<_> = sample_new_requests()
            .into_iter()
            .chain(sample_motius_asks())
            .map(|r| r.id)
            .collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn roster_colors_come_from_palette() {
        for person in initial_roster() {
            assert!(DEFAULT_PALETTE.contains(&person.color.as_str()));
        }
    }
}
