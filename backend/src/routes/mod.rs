//! Route definitions for the FitForge API
//!
//! This module organizes all API routes and applies middleware.

use crate::state::AppState;
use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod catalog;
mod crud;
mod exercises;
mod extract;
mod food_items;
mod health;
mod meal_logs;
mod progress_logs;
mod users;
mod workout_programs;
mod workouts;

pub use extract::{ApiQuery, EntityId, ValidatedJson};

/// Create the main application router with all middleware
pub fn create_router(state: AppState) -> Router {
    let timeout = state.config().request_timeout();

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .nest("/api", api_routes())
        // Apply middleware layers
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(timeout))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `/api` routes, one nested router per entity collection
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { "FitForge API" }))
        .nest("/users", users::user_routes())
        .nest("/workout-programs", workout_programs::workout_program_routes())
        .nest("/workouts", workouts::workout_routes())
        .nest("/exercises", exercises::exercise_routes())
        .nest("/food-items", food_items::food_item_routes())
        .nest("/meal-logs", meal_logs::meal_log_routes())
        .nest("/progress-logs", progress_logs::progress_log_routes())
        .merge(catalog::catalog_routes())
}
