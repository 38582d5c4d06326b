#![allow(clippy::unwrap_used, clippy::panic)]

use super::*;
use crate::auth::Principal;
use crate::persistence::{MemoryDatabase, PersistenceError, Repository};
use crate::records::{Event, NewEventParams, NewOrganizerParams, Organizer, UpdateEventParams};
use crate::types::{EventStatus, UserId};
use chrono::NaiveDate;
use optimistic_core::effect::Effect;
use optimistic_core::reducer::Reducer;
use optimistic_core::{OptimisticAction, RecordId, RowStatus};
use optimistic_testing::assertions::{
    assert_derived_ids, assert_effects_count, assert_has_future_effect, assert_no_effects,
};
use optimistic_testing::{ReducerTest, test_clock};
use serde_json::json;
use std::sync::Arc;

fn principal() -> Principal {
    Principal::new(UserId::new(), "organizer@example.com")
}

fn environment_with(db: &Arc<MemoryDatabase>, principal: Principal) -> ResourceEnvironment<Event> {
    ResourceEnvironment::new(
        Arc::clone(db) as Arc<dyn Repository<Event>>,
        Arc::clone(db) as Arc<dyn crate::persistence::ReferenceSource<Organizer>>,
        principal,
        Arc::new(test_clock()),
    )
}

fn environment() -> ResourceEnvironment<Event> {
    let db = Arc::new(MemoryDatabase::new(Arc::new(test_clock())));
    environment_with(&db, principal())
}

fn event(id: &str, name: &str) -> Event {
    Event {
        id: RecordId::new(id),
        event_name: name.to_string(),
        date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        location: None,
        description: "Open air".to_string(),
        status: EventStatus::Unpublic,
        organizer_id: RecordId::new("org-1"),
        user_id: None,
        created_at: None,
        updated_at: None,
        organizer: None,
    }
}

fn draft(name: &str) -> NewEventParams {
    NewEventParams {
        event_name: name.to_string(),
        date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
        location: None,
        description: "Indoor".to_string(),
        organizer_id: RecordId::new("org-1"),
    }
}

fn rename(id: &str, name: &str) -> ResourceAction<Event> {
    ResourceAction::Update {
        id: RecordId::new(id),
        params: UpdateEventParams {
            event_name: Some(name.to_string()),
            ..UpdateEventParams::default()
        },
    }
}

fn seeded() -> ResourceState<Event> {
    ResourceState::new(vec![event("evt-1", "Festival")])
}

async fn run(effect: Effect<ResourceAction<Event>>) -> Option<ResourceAction<Event>> {
    match effect {
        Effect::Future(future) => future.await,
        other => panic!("expected a future effect, got {other:?}"),
    }
}

#[test]
fn invalid_create_reopens_editor_and_leaves_list_alone() {
    ReducerTest::new(ResourceReducer::new())
        .with_env(environment())
        .given_state(seeded())
        .when_action(ResourceAction::Create { params: draft("") })
        .then_state(|state| {
            assert_derived_ids(&state.reconciler, &["evt-1"]);
            let errors = state.editor.errors().unwrap();
            assert_eq!(errors.messages("eventName"), ["Required"]);
            assert!(matches!(
                state.editor.attempted(),
                Some(OptimisticAction::Create(params)) if params.event_name.is_empty()
            ));
            assert_eq!(state.sequencer.in_flight(), 0);
        })
        .then_effects(assert_no_effects)
        .run();
}

#[test]
fn valid_create_appends_optimistic_row_and_persists() {
    ReducerTest::new(ResourceReducer::new())
        .with_env(environment())
        .given_state(seeded())
        .when_action(ResourceAction::OpenEditor { attempted: None })
        .when_action(ResourceAction::Create {
            params: draft("Concert"),
        })
        .then_state(|state| {
            assert_derived_ids(&state.reconciler, &["evt-1", "optimistic"]);
            assert_eq!(state.reconciler.authoritative().len(), 1);
            assert!(!state.editor.is_open());
            assert_eq!(state.sequencer.in_flight(), 1);
            let statuses: Vec<RowStatus> = state.rows().map(|(_, status)| status).collect();
            assert_eq!(statuses, [RowStatus::Confirmed, RowStatus::Creating]);
        })
        .then_effects(|effects| {
            assert_effects_count(effects, 1);
            assert_has_future_effect(effects);
        })
        .run();
}

#[test]
fn rows_still_being_saved_cannot_be_edited() {
    ReducerTest::new(ResourceReducer::new())
        .with_env(environment())
        .given_state(seeded())
        .when_action(rename("optimistic", "Renamed"))
        .then_state(|state| {
            let errors = state.editor.errors().unwrap();
            assert_eq!(errors.messages("id"), ["Still being saved, try again shortly"]);
        })
        .then_effects(assert_no_effects)
        .run();
}

#[test]
fn delete_marks_row_until_reseed() {
    ReducerTest::new(ResourceReducer::new())
        .with_env(environment())
        .given_state(seeded())
        .when_action(ResourceAction::Delete {
            id: RecordId::new("evt-1"),
        })
        .then_state(|state| {
            assert_derived_ids(&state.reconciler, &["delete"]);
            assert_eq!(state.derived()[0].event_name, "Festival");
        })
        .then_effects(assert_has_future_effect)
        .run();
}

#[test]
fn successful_delete_notifies_navigates_and_reseeds() {
    let mutation = OptimisticAction::Delete {
        id: RecordId::new("evt-1"),
    };

    ReducerTest::new(ResourceReducer::new())
        .with_env(environment())
        .given_state(seeded())
        .when_action(ResourceAction::Submit {
            action: mutation.clone(),
        })
        .when_action(ResourceAction::MutationSucceeded {
            mutation,
            token: RequestToken::new(1),
        })
        .then_state(|state| {
            let notification = state.latest_notification().unwrap();
            assert_eq!(notification.level, NotificationLevel::Success);
            assert_eq!(notification.title, "Event deleted!");
            assert_eq!(state.navigation.as_deref(), Some("/events"));
            assert!(state.loading);
        })
        .then_effects(|effects| {
            assert_effects_count(effects, 1);
            assert_has_future_effect(effects);
        })
        .run();
}

#[test]
fn failed_update_reports_and_reopens_editor_with_values() {
    let mutation = OptimisticAction::Update {
        id: RecordId::new("evt-1"),
        patch: UpdateEventParams {
            event_name: Some("Renamed".to_string()),
            ..UpdateEventParams::default()
        },
    };

    ReducerTest::new(ResourceReducer::new())
        .with_env(environment())
        .given_state(seeded())
        .when_action(ResourceAction::Submit {
            action: mutation.clone(),
        })
        .when_action(ResourceAction::MutationFailed {
            mutation: mutation.clone(),
            error: PersistenceError::Unavailable(String::new()),
            token: RequestToken::new(1),
        })
        .then_state(move |state| {
            let notification = state.latest_notification().unwrap();
            assert_eq!(notification.level, NotificationLevel::Error);
            assert_eq!(notification.title, "Failed to update");
            assert_eq!(notification.description.as_deref(), Some("Error, please try again."));
            assert_eq!(state.editor.attempted(), Some(&mutation));
            assert!(state.editor.errors().is_none());
            assert_eq!(state.last_error.as_deref(), Some("Error, please try again."));
            assert!(state.navigation.is_none());
        })
        .then_effects(assert_has_future_effect)
        .run();
}

#[test]
fn stale_mutation_response_only_rereads_the_list() {
    let first = OptimisticAction::Update {
        id: RecordId::new("evt-1"),
        patch: UpdateEventParams {
            event_name: Some("First".to_string()),
            ..UpdateEventParams::default()
        },
    };

    ReducerTest::new(ResourceReducer::new())
        .with_env(environment())
        .given_state(seeded())
        .when_action(ResourceAction::Submit {
            action: first.clone(),
        })
        .when_action(rename("evt-1", "Second"))
        .when_action(ResourceAction::MutationFailed {
            mutation: first,
            error: PersistenceError::Unavailable("timeout".to_string()),
            token: RequestToken::new(1),
        })
        .then_state(|state| {
            assert!(state.notifications.is_empty());
            assert!(!state.editor.is_open());
            assert!(state.last_error.is_none());
            assert!(state.loading);
            assert_eq!(state.derived()[0].event_name, "Second");
            assert_eq!(state.sequencer.in_flight(), 1);
        })
        .then_effects(assert_has_future_effect)
        .run();
}

#[test]
fn without_sequencing_every_response_is_applied() {
    let first = OptimisticAction::Update {
        id: RecordId::new("evt-1"),
        patch: UpdateEventParams {
            event_name: Some("First".to_string()),
            ..UpdateEventParams::default()
        },
    };

    ReducerTest::new(ResourceReducer::new())
        .with_env(environment().with_sequencing(false))
        .given_state(seeded())
        .when_action(ResourceAction::Submit {
            action: first.clone(),
        })
        .when_action(rename("evt-1", "Second"))
        .when_action(ResourceAction::MutationSucceeded {
            mutation: first,
            token: RequestToken::new(1),
        })
        .then_state(|state| {
            assert_eq!(state.latest_notification().unwrap().title, "Event updated!");
        })
        .then_effects(assert_has_future_effect)
        .run();
}

#[test]
fn later_list_read_wins() {
    ReducerTest::new(ResourceReducer::new())
        .with_env(environment())
        .given_state(seeded())
        .when_action(ResourceAction::Load)
        .when_action(ResourceAction::Load)
        .when_action(ResourceAction::Reseeded {
            rows: vec![event("evt-2", "Late read")],
            token: RequestToken::new(2),
        })
        .when_action(ResourceAction::Reseeded {
            rows: vec![event("evt-3", "Early read")],
            token: RequestToken::new(1),
        })
        .then_state(|state| {
            assert_derived_ids(&state.reconciler, &["evt-2"]);
            assert!(!state.loading);
        })
        .then_effects(assert_no_effects)
        .run();
}

#[test]
fn unrecognized_wire_action_is_ignored() {
    ReducerTest::new(ResourceReducer::new())
        .with_env(environment())
        .given_state(seeded())
        .when_action(ResourceAction::from_wire(json!({ "action": "archive", "data": {} })))
        .then_state(|state| {
            assert_derived_ids(&state.reconciler, &["evt-1"]);
            assert!(state.is_settled());
        })
        .then_effects(assert_no_effects)
        .run();
}

#[test]
fn wire_update_is_applied_optimistically() {
    ReducerTest::new(ResourceReducer::new())
        .with_env(environment())
        .given_state(seeded())
        .when_action(ResourceAction::from_wire(json!({
            "action": "update",
            "data": { "id": "evt-1", "location": "Harbour" }
        })))
        .then_state(|state| {
            assert_eq!(state.derived()[0].location.as_deref(), Some("Harbour"));
            assert_eq!(state.derived()[0].event_name, "Festival");
        })
        .then_effects(assert_has_future_effect)
        .run();
}

#[test]
fn editor_and_navigation_commands() {
    ReducerTest::new(ResourceReducer::new())
        .with_env(environment())
        .given_state(ResourceState {
            navigation: Some("/events".to_string()),
            ..seeded()
        })
        .when_action(ResourceAction::OpenEditor { attempted: None })
        .when_action(ResourceAction::CloseEditor)
        .when_action(ResourceAction::Navigated)
        .then_state(|state| {
            assert_eq!(state.editor, EditSurface::Closed);
            assert!(state.navigation.is_none());
        })
        .run();
}

#[tokio::test]
async fn create_round_trip_through_repository() {
    let db = Arc::new(MemoryDatabase::new(Arc::new(test_clock())));
    let principal = principal();
    let organizer = Repository::<Organizer>::create(
        db.as_ref(),
        &principal,
        NewOrganizerParams {
            organizer_name: "Acme".to_string(),
            trusted_contact: "acme@example.com".to_string(),
        },
    )
    .await
    .unwrap();

    let env = environment_with(&db, principal);
    let reducer = ResourceReducer::new();
    let mut state = ResourceState::default();

    let mut effects = reducer.reduce(&mut state, ResourceAction::LoadReferences, &env);
    let loaded = run(effects.remove(0)).await.unwrap();
    reducer.reduce(&mut state, loaded, &env);
    assert_eq!(state.reconciler.references().len(), 1);

    let params = NewEventParams {
        organizer_id: organizer.id.clone(),
        ..draft("Concert")
    };
    let mut effects = reducer.reduce(&mut state, ResourceAction::Create { params }, &env);
    assert_eq!(
        state.derived()[0].organizer.as_ref().map(|o| o.organizer_name.as_str()),
        Some("Acme")
    );

    let response = run(effects.remove(0)).await.unwrap();
    assert!(matches!(response, ResourceAction::MutationSucceeded { .. }));

    let mut effects = reducer.reduce(&mut state, response, &env);
    assert_eq!(state.latest_notification().unwrap().title, "Event created!");

    let reseeded = run(effects.remove(0)).await.unwrap();
    let effects = reducer.reduce(&mut state, reseeded, &env);
    assert!(effects.is_empty());
    assert!(state.is_settled());
    assert!(!state.derived()[0].id.is_sentinel());
    assert_eq!(state.derived()[0].event_name, "Concert");
}

#[tokio::test]
async fn constraint_failure_surfaces_after_optimistic_patch() {
    let db = Arc::new(MemoryDatabase::new(Arc::new(test_clock())));
    let env = environment_with(&db, principal());
    let reducer = ResourceReducer::new();
    let mut state = ResourceState::default();

    let mut effects = reducer.reduce(
        &mut state,
        ResourceAction::Create {
            params: draft("Orphan"),
        },
        &env,
    );
    assert_derived_ids(&state.reconciler, &["optimistic"]);

    let response = run(effects.remove(0)).await.unwrap();
    let mut effects = reducer.reduce(&mut state, response, &env);
    let notification = state.latest_notification().unwrap();
    assert_eq!(notification.title, "Failed to create");
    assert_eq!(notification.description.as_deref(), Some("Organizer org-1 does not exist"));
    assert!(state.editor.is_open());

    let reseeded = run(effects.remove(0)).await.unwrap();
    reducer.reduce(&mut state, reseeded, &env);
    assert!(state.derived().is_empty());
}
