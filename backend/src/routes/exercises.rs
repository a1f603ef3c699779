//! Exercise routes

use super::crud;
use crate::state::AppState;
use axum::{routing::get, Router};
use fitforge_shared::Exercise;

pub fn exercise_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(crud::list::<Exercise>).post(crud::create::<Exercise>))
        .route(
            "/:id",
            get(crud::fetch::<Exercise>)
                .patch(crud::update::<Exercise>)
                .delete(crud::delete::<Exercise>),
        )
}
