//! Workout routes, listed by `?programId=`
//!
//! Any status change is accepted. Moves that go backwards
//! (e.g. `completed` to `not_started`) are logged.

use super::crud;
use super::extract::{EntityId, ValidatedJson};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use fitforge_shared::{Workout, WorkoutPatch};
use tracing::warn;

pub fn workout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(crud::list::<Workout>).post(crud::create::<Workout>))
        .route(
            "/:id",
            get(crud::fetch::<Workout>)
                .patch(update_workout)
                .delete(crud::delete::<Workout>),
        )
}

/// PATCH /api/workouts/:id
async fn update_workout(
    State(state): State<AppState>,
    id: EntityId<Workout>,
    ValidatedJson(patch): ValidatedJson<WorkoutPatch>,
) -> ApiResult<Json<Workout>> {
    let repo = state.store().repo::<Workout>();

    if let Some(next) = patch.status {
        let current = repo
            .get(id.id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Workout not found".to_string()))?;
        if !current.status.is_forward_transition(next) {
            warn!(
                workout_id = id.id,
                from = %current.status,
                to = %next,
                "Workout status moved backwards"
            );
        }
    }

    repo.update(id.id, patch)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Workout not found".to_string()))
}
