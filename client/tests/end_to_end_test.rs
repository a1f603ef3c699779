//! Offline edits replayed into a live in-process backend

mod common;

use common::{new_exercise, new_program, new_workout, offline_client};
use fitforge_backend::{
    config::{AppConfig, CatalogConfig},
    routes,
    state::AppState,
    storage::Store,
};
use fitforge_client::{ClientError, SyncOutcome};
use fitforge_shared::{
    workout_progress, ByProgram, ByUser, ByWorkout, Exercise, ExercisePatch, Workout,
    WorkoutPatch, WorkoutProgram, WorkoutStatus,
};
use std::net::SocketAddr;

async fn spawn_backend() -> SocketAddr {
    let store = Store::seeded().unwrap();
    let config = AppConfig {
        catalog: CatalogConfig::instant(),
        ..AppConfig::default()
    };
    let app = routes::create_router(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn test_offline_program_syncs_with_translated_ids() {
    let addr = spawn_backend().await;
    let (_dir, client, notifier) = offline_client(&format!("http://{addr}")).await;
    let data = &client.data;

    // Offline: everything lands in the mirror with local ids
    let program = data
        .collection::<WorkoutProgram>()
        .create(new_program(1, "Offline Split"))
        .await
        .unwrap();
    let workout = data
        .collection::<Workout>()
        .create(new_workout(program.id, "Upper"))
        .await
        .unwrap();
    for name in ["Bench Press", "Rows"] {
        data.collection::<Exercise>()
            .create(new_exercise(workout.id, name))
            .await
            .unwrap();
    }
    assert_eq!(program.id, -1);

    let offline_workouts = data
        .collection::<Workout>()
        .list(&ByProgram { program_id: program.id })
        .await
        .unwrap();
    assert_eq!(offline_workouts.len(), 1);
    assert_eq!(
        notifier.take_titles(),
        vec!["Program created", "Workout created", "Exercise added", "Exercise added"]
    );

    // Catalog needs the network
    assert!(matches!(
        data.lookup_barcode("1234567890").await,
        Err(ClientError::Offline)
    ));

    client.connectivity.set_online(true);
    let outcome = client.sync.trigger_sync().await.unwrap();
    assert_eq!(outcome, SyncOutcome::Complete { applied: 4 });

    // The seed already holds programs 1 and 2
    let programs = data
        .collection::<WorkoutProgram>()
        .list(&ByUser { user_id: 1 })
        .await
        .unwrap();
    let synced = programs
        .iter()
        .find(|p| p.name == "Offline Split")
        .expect("program reached the server");
    assert_eq!(synced.id, 3);
    assert_eq!(synced.workouts_count, 5);

    let workouts = data
        .collection::<Workout>()
        .list(&ByProgram { program_id: synced.id })
        .await
        .unwrap();
    assert_eq!(workouts.len(), 1);
    assert_eq!(workouts[0].name, "Upper");

    let exercises = data
        .collection::<Exercise>()
        .list(&ByWorkout { workout_id: workouts[0].id })
        .await
        .unwrap();
    assert_eq!(exercises.len(), 2);
    assert_eq!(workout_progress(&exercises), 0);

    // Online: finish the workout directly against the API
    let started = data
        .collection::<Workout>()
        .update(
            workouts[0].id,
            WorkoutPatch {
                status: Some(WorkoutStatus::InProgress),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(started.status, WorkoutStatus::InProgress);

    for exercise in &exercises {
        let patch = ExercisePatch {
            completed: Some(true),
            ..Default::default()
        };
        data.collection::<Exercise>()
            .update(exercise.id, patch)
            .await
            .unwrap();
    }

    // The write dropped the cached list, so this reads the server again
    let exercises = data
        .collection::<Exercise>()
        .list(&ByWorkout { workout_id: workouts[0].id })
        .await
        .unwrap();
    assert_eq!(workout_progress(&exercises), 100);
}

#[tokio::test]
async fn test_offline_child_of_server_program_keeps_its_parent() {
    let addr = spawn_backend().await;
    let (_dir, client, _notifier) = offline_client(&format!("http://{addr}")).await;
    let data = &client.data;

    data.collection::<WorkoutProgram>()
        .create(new_program(1, "Offline Split"))
        .await
        .unwrap();
    client.connectivity.set_online(true);
    client.sync.trigger_sync().await.unwrap();

    // Seeded program 1 is a server row; the synced local program became 3
    client.connectivity.set_online(false);
    data.collection::<Workout>()
        .create(new_workout(1, "Legs on server program 1"))
        .await
        .unwrap();
    client.connectivity.set_online(true);
    let outcome = client.sync.trigger_sync().await.unwrap();
    assert_eq!(outcome, SyncOutcome::Complete { applied: 1 });

    let names = |workouts: Vec<Workout>| -> Vec<String> {
        workouts.into_iter().map(|w| w.name).collect()
    };
    let on_seeded = data
        .collection::<Workout>()
        .list(&ByProgram { program_id: 1 })
        .await
        .unwrap();
    assert!(names(on_seeded).contains(&"Legs on server program 1".to_string()));

    let on_synced = data
        .collection::<Workout>()
        .list(&ByProgram { program_id: 3 })
        .await
        .unwrap();
    assert!(names(on_synced).is_empty());
}

#[tokio::test]
async fn test_online_catalog_lookup() {
    let addr = spawn_backend().await;
    let (_dir, client, _notifier) = offline_client(&format!("http://{addr}")).await;
    client.connectivity.set_online(true);

    let product = client
        .data
        .lookup_barcode("1234567890")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(product.name, "Protein Bar");
    assert_eq!(product.calories, 220);
    assert_eq!(product.serving_size, "1 bar (68g)");

    assert!(client.data.lookup_barcode("0000000000").await.unwrap().is_none());

    let results = client.data.search_foods("yogurt").await.unwrap();
    assert_eq!(results.len(), 3);
}

#[tokio::test]
async fn test_online_duplicate_username_surfaces_conflict() {
    let addr = spawn_backend().await;
    let (_dir, client, notifier) = offline_client(&format!("http://{addr}")).await;
    client.connectivity.set_online(true);

    let new = fitforge_shared::NewUser {
        username: "demo".to_string(),
        password: "secret".to_string(),
        name: "Someone".to_string(),
        weight: None,
        weight_goal: None,
        daily_calories: None,
        protein_target: None,
        workouts_per_week: None,
        profile_type: None,
    };
    let err = client
        .data
        .collection::<fitforge_shared::User>()
        .create(new)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Http { status: 409, .. }));

    let seen = notifier.take();
    assert_eq!(seen[0].title, "Creation failed");
    assert_eq!(seen[0].description, "Username already exists");
}
