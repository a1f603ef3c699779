//! Meal log routes, listed by `?userId=` with an optional `&date=` day filter
//!
//! Totals are stored as sent. When they drift from the embedded food items
//! the write still succeeds and a warning is logged.

use super::crud;
use super::extract::{EntityId, ValidatedJson};
use crate::error::ApiResult;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use fitforge_shared::{MealLog, MealLogPatch, NewMealLog};
use tracing::warn;

pub fn meal_log_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(crud::list::<MealLog>).post(create_meal_log))
        .route(
            "/:id",
            get(crud::fetch::<MealLog>)
                .patch(update_meal_log)
                .delete(crud::delete::<MealLog>),
        )
}

fn check_totals(meal: &MealLog) {
    if let Some(drift) = meal.totals_mismatch() {
        warn!(
            meal_log_id = meal.id,
            stored_calories = drift.stored.calories,
            computed_calories = drift.computed.calories,
            "Meal log totals do not match its food items"
        );
    }
}

async fn create_meal_log(
    state: State<AppState>,
    body: ValidatedJson<NewMealLog>,
) -> ApiResult<(StatusCode, Json<MealLog>)> {
    let (status, Json(meal)) = crud::create::<MealLog>(state, body).await?;
    check_totals(&meal);
    Ok((status, Json(meal)))
}

async fn update_meal_log(
    state: State<AppState>,
    id: EntityId<MealLog>,
    body: ValidatedJson<MealLogPatch>,
) -> ApiResult<Json<MealLog>> {
    let Json(meal) = crud::update::<MealLog>(state, id, body).await?;
    check_totals(&meal);
    Ok(Json(meal))
}
