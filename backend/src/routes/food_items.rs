//! Food item routes
//!
//! `GET /api/food-items/barcode/:barcode` looks up the user's own food
//! database, unlike `/api/barcode/:code` which hits the product catalog.

use super::crud;
use super::extract::ApiQuery;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use fitforge_shared::{FoodItem, FoodItemFilter};

pub fn food_item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_food_items).post(crud::create::<FoodItem>))
        .route("/barcode/:barcode", get(find_by_barcode))
        .route(
            "/:id",
            get(crud::fetch::<FoodItem>)
                .patch(crud::update::<FoodItem>)
                .delete(crud::delete::<FoodItem>),
        )
}

/// GET /api/food-items?userId=, scoped to one owner
async fn list_food_items(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<FoodItemFilter>,
) -> ApiResult<Json<Vec<FoodItem>>> {
    if filter.user_id.is_none() {
        return Err(ApiError::BadRequest("Invalid user ID".to_string()));
    }
    let rows = state.store().repo::<FoodItem>().list(&filter).await?;
    Ok(Json(rows))
}

/// First stored food item carrying this barcode
async fn find_by_barcode(
    State(state): State<AppState>,
    Path(barcode): Path<String>,
) -> ApiResult<Json<FoodItem>> {
    let filter = FoodItemFilter {
        user_id: None,
        barcode: Some(barcode),
    };
    state
        .store()
        .repo::<FoodItem>()
        .list(&filter)
        .await?
        .into_iter()
        .next()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Food item not found".to_string()))
}
