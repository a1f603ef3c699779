//! User routes
//!
//! Creation and updates go through [`UserService`] so passwords are hashed;
//! the password never appears in a response body.

use super::crud;
use super::extract::{EntityId, ValidatedJson};
use crate::error::ApiResult;
use crate::services::UserService;
use crate::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use fitforge_shared::{NewUser, User, UserPatch};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_user))
        .route("/:id", get(crud::fetch::<User>).patch(update_user))
}

/// POST /api/users
async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(new): ValidatedJson<NewUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = UserService::create(state.store(), new).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// PATCH /api/users/:id
async fn update_user(
    State(state): State<AppState>,
    id: EntityId<User>,
    ValidatedJson(patch): ValidatedJson<UserPatch>,
) -> ApiResult<Json<User>> {
    let user = UserService::update(state.store(), id.id, patch).await?;
    Ok(Json(user))
}
