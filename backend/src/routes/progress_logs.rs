//! Progress log routes; `?userId=&startDate=&endDate=` with an inclusive day range

use super::crud;
use crate::state::AppState;
use axum::{routing::get, Router};
use fitforge_shared::ProgressLog;

pub fn progress_log_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(crud::list::<ProgressLog>).post(crud::create::<ProgressLog>))
        .route(
            "/:id",
            get(crud::fetch::<ProgressLog>)
                .patch(crud::update::<ProgressLog>)
                .delete(crud::delete::<ProgressLog>),
        )
}
