//! Workout program routes, listed by `?userId=`

use super::crud;
use crate::state::AppState;
use axum::{routing::get, Router};
use fitforge_shared::WorkoutProgram;

pub fn workout_program_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(crud::list::<WorkoutProgram>).post(crud::create::<WorkoutProgram>))
        .route(
            "/:id",
            get(crud::fetch::<WorkoutProgram>)
                .patch(crud::update::<WorkoutProgram>)
                .delete(crud::delete::<WorkoutProgram>),
        )
}
