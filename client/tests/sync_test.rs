//! Sync coordinator against a mocked REST API

mod common;

use common::{new_exercise, new_program, new_workout, SyncHarness};
use fitforge_client::{ClientError, Operation, SyncOutcome, SyncState, Variant};
use fitforge_shared::{EntityKind, Exercise, Workout, WorkoutProgram, WorkoutProgramPatch};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn created(id: i64) -> ResponseTemplate {
    ResponseTemplate::new(201).set_body_json(json!({ "id": id }))
}

fn rejected(status: u16, code: &str, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "error": { "code": code, "message": message }
    }))
}

#[tokio::test]
async fn test_offline_trigger_reports_and_keeps_queue() {
    let server = MockServer::start().await;
    let h = SyncHarness::new(&server.uri()).await;
    h.mirror.add::<WorkoutProgram>(new_program(1, "A")).await.unwrap();
    h.connectivity.set_online(false);

    let outcome = h.sync.trigger_sync().await.unwrap();
    assert_eq!(outcome, SyncOutcome::Offline);

    let seen = h.notifier.take();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].title, "You're offline");
    assert_eq!(seen[0].description, "Can't sync data while offline");
    assert_eq!(seen[0].variant, Variant::Destructive);

    assert_eq!(h.mirror.queue().len().await.unwrap(), 1);
    assert_eq!(h.sync.state(), SyncState::Idle);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_replays_children_against_server_ids() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/workout-programs"))
        .respond_with(created(40))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/workouts"))
        .and(body_partial_json(json!({ "programId": 40, "name": "Legs" })))
        .respond_with(created(41))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/workout-programs/40"))
        .and(body_partial_json(json!({ "name": "Renamed" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 40 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/workouts/41"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let h = SyncHarness::new(&server.uri()).await;
    let program = h.mirror.add::<WorkoutProgram>(new_program(1, "Split")).await.unwrap();
    let workout = h
        .mirror
        .add::<Workout>(new_workout(program.id, "Legs"))
        .await
        .unwrap();
    let patch = WorkoutProgramPatch {
        name: Some("Renamed".to_string()),
        ..Default::default()
    };
    h.mirror.update::<WorkoutProgram>(program.id, patch).await.unwrap();
    h.mirror.delete::<Workout>(workout.id).await.unwrap();

    h.sync.refresh_pending().await.unwrap();
    assert!(h.sync.has_pending_sync());

    let outcome = h.sync.trigger_sync().await.unwrap();
    assert_eq!(outcome, SyncOutcome::Complete { applied: 4 });
    assert_eq!(h.sync.state(), SyncState::Idle);
    assert!(!h.mirror.queue().has_items().await.unwrap());
    assert!(!h.sync.has_pending_sync());

    let ids = h.mirror.id_map();
    assert_eq!(
        ids.server_id(EntityKind::WorkoutPrograms, program.id.into()).await.unwrap(),
        Some(40)
    );
    assert_eq!(
        ids.server_id(EntityKind::Workouts, workout.id.into()).await.unwrap(),
        Some(41)
    );

    let titles: Vec<String> = h.notifier.take().into_iter().map(|n| n.title).collect();
    assert_eq!(titles, vec!["Sync started", "Sync complete"]);
}

#[tokio::test]
async fn test_server_parent_is_kept_after_a_local_parent_was_mapped() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/workout-programs"))
        .respond_with(created(3))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/workouts"))
        .and(body_partial_json(json!({ "programId": 1, "name": "Legs on program 1" })))
        .respond_with(created(20))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/workouts"))
        .and(body_partial_json(json!({ "programId": 3, "name": "Legs on new program" })))
        .respond_with(created(21))
        .expect(1)
        .mount(&server)
        .await;

    let h = SyncHarness::new(&server.uri()).await;
    let program = h.mirror.add::<WorkoutProgram>(new_program(1, "Split")).await.unwrap();
    let outcome = h.sync.trigger_sync().await.unwrap();
    assert_eq!(outcome, SyncOutcome::Complete { applied: 1 });

    // Program 1 already lives on the server
    h.mirror
        .add::<Workout>(new_workout(1, "Legs on program 1"))
        .await
        .unwrap();
    h.mirror
        .add::<Workout>(new_workout(program.id, "Legs on new program"))
        .await
        .unwrap();

    let outcome = h.sync.trigger_sync().await.unwrap();
    assert_eq!(outcome, SyncOutcome::Complete { applied: 2 });
    assert!(program.id < 0);
}

#[tokio::test]
async fn test_aborted_drain_reports_and_keeps_queue() {
    let server = MockServer::start().await;
    let h = SyncHarness::new(&server.uri()).await;
    h.mirror.add::<WorkoutProgram>(new_program(1, "A")).await.unwrap();
    sqlx::query("INSERT INTO sync_queue (operation, store_name, data, timestamp) VALUES ('add', 'gadgets', '{\"id\":-1}', '2024-06-04T08:00:00.000000Z')")
        .execute(&sqlite_pool(&h).await)
        .await
        .unwrap();

    let err = h.sync.trigger_sync().await.unwrap_err();
    assert!(matches!(err, ClientError::MalformedOperation { .. }));
    assert!(matches!(h.sync.state(), SyncState::Failed { .. }));

    let seen = h.notifier.take();
    let last = seen.last().unwrap();
    assert_eq!(last.title, "Sync incomplete");
    assert_eq!(last.description, err.to_string());
    assert_eq!(last.variant, Variant::Destructive);

    assert_eq!(h.mirror.queue().len().await.unwrap(), 2);
    assert!(h.sync.has_pending_sync());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rejection_stops_and_trims_applied_prefix() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/workout-programs"))
        .respond_with(created(7))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/workouts"))
        .respond_with(rejected(400, "VALIDATION_ERROR", "Program ID: is required"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/exercises"))
        .respond_with(created(9))
        .expect(0)
        .mount(&server)
        .await;

    let h = SyncHarness::new(&server.uri()).await;
    let program = h.mirror.add::<WorkoutProgram>(new_program(1, "Split")).await.unwrap();
    let workout = h
        .mirror
        .add::<Workout>(new_workout(program.id, "Push"))
        .await
        .unwrap();
    h.mirror
        .add::<Exercise>(new_exercise(workout.id, "Bench"))
        .await
        .unwrap();
    let queued = h.mirror.queue().list().await.unwrap();

    let outcome = h.sync.trigger_sync().await.unwrap();
    assert_eq!(outcome, SyncOutcome::Partial { applied: 1, total: 3 });
    assert_eq!(
        h.sync.state(),
        SyncState::Conflict {
            operation_id: queued[1].id,
            message: "Program ID: is required".to_string()
        }
    );

    let remaining = h.mirror.queue().list().await.unwrap();
    assert_eq!(remaining, queued[1..].to_vec());
    assert!(h.sync.has_pending_sync());

    let seen = h.notifier.take();
    let last = seen.last().unwrap();
    assert_eq!(last.title, "Sync incomplete");
    assert_eq!(last.description, "1 of 3 changes synced");
    assert_eq!(last.variant, Variant::Destructive);
}

#[tokio::test]
async fn test_server_error_is_failed_state() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/workout-programs"))
        .respond_with(rejected(500, "DATABASE_ERROR", "A database error occurred"))
        .mount(&server)
        .await;

    let h = SyncHarness::new(&server.uri()).await;
    h.mirror.add::<WorkoutProgram>(new_program(1, "A")).await.unwrap();

    let outcome = h.sync.trigger_sync().await.unwrap();
    assert_eq!(outcome, SyncOutcome::Partial { applied: 0, total: 1 });
    assert!(matches!(h.sync.state(), SyncState::Failed { .. }));
    assert_eq!(h.mirror.queue().len().await.unwrap(), 1);
}

#[tokio::test]
async fn test_delete_already_gone_counts_as_applied() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/exercises/12"))
        .respond_with(rejected(404, "NOT_FOUND", "Exercise not found"))
        .expect(1)
        .mount(&server)
        .await;

    let h = SyncHarness::new(&server.uri()).await;
    // A record this device pulled from the server keeps the server id
    sqlx::query("INSERT INTO sync_queue (operation, store_name, data, timestamp) VALUES ('delete', 'exercises', '{\"id\":12}', '2024-06-04T08:00:00.000000Z')")
        .execute(&sqlite_pool(&h).await)
        .await
        .unwrap();

    let queued = h.mirror.queue().list().await.unwrap();
    assert_eq!(queued[0].operation, Operation::Delete);

    let outcome = h.sync.trigger_sync().await.unwrap();
    assert_eq!(outcome, SyncOutcome::Complete { applied: 1 });
    assert!(!h.mirror.queue().has_items().await.unwrap());
}

#[tokio::test]
async fn test_entries_queued_during_drain_wait_for_next_run() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/workout-programs"))
        .respond_with(created(50).set_delay(Duration::from_millis(300)))
        .mount(&server)
        .await;

    let h = SyncHarness::new(&server.uri()).await;
    h.mirror.add::<WorkoutProgram>(new_program(1, "Before")).await.unwrap();

    let sync = h.sync.clone();
    let drain = tokio::spawn(async move { sync.trigger_sync().await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    let late = h.mirror.add::<WorkoutProgram>(new_program(1, "During")).await.unwrap();

    let outcome = drain.await.unwrap().unwrap();
    assert_eq!(outcome, SyncOutcome::Complete { applied: 1 });

    let remaining = h.mirror.queue().list().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].data["id"], late.id);
    assert_eq!(remaining[0].data["name"], "During");
    assert!(h.sync.has_pending_sync());
}

#[tokio::test]
async fn test_concurrent_triggers_do_not_replay_twice() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/workout-programs"))
        .respond_with(created(60).set_delay(Duration::from_millis(200)))
        .expect(1)
        .mount(&server)
        .await;

    let h = SyncHarness::new(&server.uri()).await;
    h.mirror.add::<WorkoutProgram>(new_program(1, "Once")).await.unwrap();

    let (a, b) = tokio::join!(h.sync.trigger_sync(), h.sync.trigger_sync());
    let mut applied: Vec<SyncOutcome> = vec![a.unwrap(), b.unwrap()];
    applied.sort_by_key(|o| match o {
        SyncOutcome::Complete { applied } => *applied,
        _ => usize::MAX,
    });
    assert_eq!(
        applied,
        vec![
            SyncOutcome::Complete { applied: 0 },
            SyncOutcome::Complete { applied: 1 }
        ]
    );
}

/// Second connection to the harness database for seeding raw queue rows
async fn sqlite_pool(h: &SyncHarness) -> sqlx::SqlitePool {
    sqlx::SqlitePool::connect(&format!(
        "sqlite://{}",
        h.dir.path().join("mirror.db").display()
    ))
    .await
    .unwrap()
}

#[tokio::test]
async fn test_poller_refreshes_pending_flag() {
    let server = MockServer::start().await;
    let h = SyncHarness::new(&server.uri()).await;
    assert!(!h.sync.has_pending_sync());

    h.mirror.add::<WorkoutProgram>(new_program(1, "A")).await.unwrap();
    let mut pending = h.sync.subscribe_pending();
    let poller = h.sync.start_polling(Duration::from_secs(5));

    // The first refresh runs as soon as the poller starts
    tokio::time::timeout(Duration::from_secs(2), pending.changed())
        .await
        .unwrap()
        .unwrap();
    assert!(*pending.borrow());
    assert!(h.sync.has_pending_sync());
    poller.abort();
}
