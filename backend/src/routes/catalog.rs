//! Simulated external food database
//!
//! - `GET /api/food-search?query=` - fixed result list
//! - `GET /api/barcode/:code` - fixed barcode table

use super::extract::ApiQuery;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use fitforge_shared::{CatalogProduct, FoodSearchQuery, FoodSearchResponse};

pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/food-search", get(search_foods))
        .route("/barcode/:code", get(lookup_barcode))
}

async fn search_foods(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<FoodSearchQuery>,
) -> ApiResult<Json<FoodSearchResponse>> {
    let query = params
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Query parameter is required".to_string()))?;

    let results = state.catalog().search(&query).await;
    Ok(Json(FoodSearchResponse { results }))
}

async fn lookup_barcode(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Json<CatalogProduct>> {
    state
        .catalog()
        .lookup_barcode(&code)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))
}
