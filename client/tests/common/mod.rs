//! Common test utilities for client integration tests

#![allow(dead_code)]

use fitforge_client::{
    ApiClient, ClientConfig, Connectivity, FitForge, LocalStore, MemoryNotifier, SyncCoordinator,
};
use fitforge_shared::{Difficulty, NewExercise, NewWorkout, NewWorkoutProgram, WorkoutStatus};
use std::sync::Arc;
use tempfile::TempDir;

/// Mirror in a temporary directory; keep the `TempDir` alive with it
pub async fn open_mirror() -> (TempDir, LocalStore) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let store = LocalStore::open(dir.path().join("mirror.db"))
        .await
        .expect("Failed to open mirror");
    (dir, store)
}

pub struct SyncHarness {
    pub dir: TempDir,
    pub mirror: LocalStore,
    pub connectivity: Connectivity,
    pub notifier: Arc<MemoryNotifier>,
    pub sync: SyncCoordinator,
}

impl SyncHarness {
    pub async fn new(base_url: &str) -> Self {
        let (dir, mirror) = open_mirror().await;
        let connectivity = Connectivity::new(true);
        let notifier = Arc::new(MemoryNotifier::new());
        let sync = SyncCoordinator::new(
            mirror.clone(),
            ApiClient::new(base_url),
            connectivity.clone(),
            notifier.clone(),
        );
        Self {
            dir,
            mirror,
            connectivity,
            notifier,
            sync,
        }
    }
}

/// Full client against `base_url`, starting offline
pub async fn offline_client(base_url: &str) -> (TempDir, FitForge, Arc<MemoryNotifier>) {
    let (dir, mirror) = open_mirror().await;
    let config = ClientConfig {
        api_base_url: base_url.to_string(),
        database_path: dir.path().join("mirror.db"),
        ..ClientConfig::default()
    };
    let notifier = Arc::new(MemoryNotifier::new());
    let client = FitForge::new(&config, mirror, Connectivity::new(false), notifier.clone());
    (dir, client, notifier)
}

pub fn new_program(user_id: i32, name: &str) -> NewWorkoutProgram {
    NewWorkoutProgram {
        user_id,
        name: name.to_string(),
        description: Some("Built offline".to_string()),
        difficulty: Difficulty::Intermediate,
        workouts_count: 5,
        tags: vec!["Strength".to_string()],
    }
}

pub fn new_workout(program_id: i32, name: &str) -> NewWorkout {
    NewWorkout {
        program_id,
        name: name.to_string(),
        description: None,
        duration: Some(45),
        status: WorkoutStatus::NotStarted,
        scheduled_day: Some("Monday".to_string()),
    }
}

pub fn new_exercise(workout_id: i32, name: &str) -> NewExercise {
    NewExercise {
        workout_id,
        name: name.to_string(),
        description: None,
        sets: Some(3),
        reps: Some(10),
        weight: Some(60.0),
        completed: false,
        notes: None,
    }
}
