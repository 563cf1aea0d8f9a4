use opsboard_model::{JoinerStage, Lane, RecordId, RequestDraft, RequestStage};
use opsboard_test_utils::{empty_store, joiner_draft, request_draft};
use pretty_assertions::assert_eq;

#[test]
fn test_request_scenario() {
    let store = empty_store();
    let request = store.add_request(RequestDraft::new("X", "A", "a@x.com", "2025-01-01"));

    assert_eq!(store.request_stage(&request.id), Some(RequestStage::New));
    let stored = store.request(&request.id).unwrap();
    assert!(stored.responsible_persons.is_empty());
    assert!(!stored.is_fulfilled);

    store.assign_responsible_to_request(&request.id, &"1".into());
    assert_eq!(store.request_stage(&request.id), Some(RequestStage::InProcess));
    let ids: Vec<RecordId> = store
        .request(&request.id)
        .unwrap()
        .responsible_persons
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, vec![RecordId::from("1")]);

    store.assign_responsible_to_request(&request.id, &"2".into());
    assert_eq!(store.request(&request.id).unwrap().responsible_persons.len(), 2);

    store.assign_responsible_to_request(&request.id, &"3".into());
    let stored = store.request(&request.id).unwrap();
    assert_eq!(stored.responsible_persons.len(), 2);
    assert!(!stored.has_responsible(&"3".into()));

    store.remove_responsible_from_request(&request.id, &"1".into());
    store.remove_responsible_from_request(&request.id, &"2".into());
    assert_eq!(store.request_stage(&request.id), Some(RequestStage::New));
    assert!(store.request(&request.id).unwrap().responsible_persons.is_empty());

    assert!(!store.mark_request_fulfilled(&request.id));
    assert_eq!(store.request_stage(&request.id), Some(RequestStage::New));
}

#[test]
fn test_assign_remove_round_trip() {
    let store = empty_store();
    let request = store.add_request(request_draft("Monitor"));
    let ask = store.add_motius_ask(request_draft("Status mail"));

    for (item, origin) in [(&request, RequestStage::New), (&ask, RequestStage::MotiusAsk)] {
        store.assign_responsible_to_request(&item.id, &"4".into());
        assert_eq!(
            store.remove_responsible_from_request(&item.id, &"4".into()),
            Some(origin)
        );
        assert_eq!(store.request(&item.id).as_ref(), Some(item));
    }
}

#[test]
fn test_remove_keeps_request_with_other_person() {
    let store = empty_store();
    let request = store.add_request(request_draft("Keys"));
    store.assign_responsible_to_request(&request.id, &"1".into());
    store.assign_responsible_to_request(&request.id, &"2".into());

    assert_eq!(
        store.remove_responsible_from_request(&request.id, &"1".into()),
        Some(RequestStage::InProcess)
    );
    assert_eq!(store.remove_responsible_from_request(&request.id, &"1".into()), None);
    assert_eq!(store.request_stage(&request.id), Some(RequestStage::InProcess));
}

#[test]
fn test_counters_follow_lifecycle() {
    let store = empty_store();
    let a = store.add_request(request_draft("A"));
    store.add_request(request_draft("B"));
    store.add_motius_ask(request_draft("C"));
    store.add_joiner(joiner_draft("Mia Park"));

    store.assign_responsible_to_request(&a.id, &"1".into());
    store.mark_request_fulfilled(&a.id);
    store.return_request_to_process(&a.id);
    store.mark_request_fulfilled(&a.id);

    let stats = store.stats();
    assert_eq!(stats.total_requests_granted, 2);
    assert_eq!(stats.weekly_stats.requests_granted, 2);
    assert_eq!(stats.weekly_stats.new_requests, 2);
    assert_eq!(stats.weekly_stats.new_joiners, 1);
    assert_eq!(store.progress().overall.percent, 7);
}

#[test]
fn test_joiner_toggle_idempotence() {
    let store = empty_store();
    let joiner = store.add_joiner(joiner_draft("Noah Kim"));

    store.toggle_joiner_in_app_notification(&joiner.id);
    store.toggle_joiner_in_app_notification(&joiner.id);
    assert_eq!(store.joiner_stage(&joiner.id), Some(JoinerStage::Active));
    assert_eq!(store.snapshot().new_joiners, vec![joiner.clone()]);

    store.toggle_joiner_in_app_notification(&joiner.id);
    assert_eq!(
        store.toggle_joiner_email_notification(&joiner.id),
        Some(JoinerStage::Archived)
    );
    assert_eq!(store.lane(Lane::RecentJoiners), vec![joiner.id.clone()]);
    assert!(store.lane(Lane::NewJoiners).is_empty());
}

#[test]
fn test_joiner_edits_only_on_board() {
    let store = empty_store();
    let joiner = store.add_joiner(joiner_draft("Ivy Chen"));
    assert!(store.assign_responsible_to_joiner(&joiner.id, &"2".into()));

    let mut edited = store.snapshot().new_joiners[0].clone();
    edited.company = "Globex".into();
    edited.is_email_notification_sent = true;
    assert!(store.update_joiner(&edited));
    let stored = store.snapshot().new_joiners[0].clone();
    assert_eq!(stored.company, "Globex");
    assert!(!stored.is_email_notification_sent);
    assert_eq!(stored.responsible_person.map(|p| p.name), Some("Bob Smith".to_string()));

    assert!(!store.assign_responsible_to_joiner(&joiner.id, &"404".into()));
    assert!(store.delete_joiner(&joiner.id));
    assert_eq!(store.joiner_stage(&joiner.id), None);
}

#[test]
fn test_lane_counts_track_board() {
    let store = empty_store();
    store.add_request(request_draft("one"));
    store.add_motius_ask(request_draft("two"));
    store.add_nomination(joiner_draft("Omar Ali"));

    let counts = store.lane_counts();
    assert_eq!(counts[&Lane::NewRequests], 1);
    assert_eq!(counts[&Lane::MotiusAsks], 1);
    assert_eq!(counts[&Lane::FulfillRequests], 1);
    assert_eq!(counts[&Lane::Nominations], 1);
    assert_eq!(counts[&Lane::News], 0);
}
