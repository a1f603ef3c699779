//! Generic CRUD handlers
//!
//! One implementation of list / get / create / update / delete shared by
//! every entity router. Handlers only translate between HTTP and the
//! [`Repository`](crate::storage::Repository) contract: `None` and `false`
//! become 404, store conflicts become 409.

use super::extract::{ApiQuery, EntityId, ValidatedJson};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::storage::{HasRepository, Store};
use axum::{extract::State, http::StatusCode, Json};
use fitforge_shared::Entity;

fn not_found<E: Entity>() -> ApiError {
    ApiError::NotFound(format!("{} not found", E::KIND.label()))
}

/// GET collection, filtered by the entity's query string
pub async fn list<E>(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<E::Filter>,
) -> ApiResult<Json<Vec<E>>>
where
    E: Entity,
    Store: HasRepository<E>,
{
    let rows = state.store().repo::<E>().list(&filter).await?;
    Ok(Json(rows))
}

/// GET by id
pub async fn fetch<E>(State(state): State<AppState>, id: EntityId<E>) -> ApiResult<Json<E>>
where
    E: Entity,
    Store: HasRepository<E>,
{
    state
        .store()
        .repo::<E>()
        .get(id.id)
        .await?
        .map(Json)
        .ok_or_else(not_found::<E>)
}

/// POST, 201 with the stored entity
pub async fn create<E>(
    State(state): State<AppState>,
    ValidatedJson(new): ValidatedJson<E::New>,
) -> ApiResult<(StatusCode, Json<E>)>
where
    E: Entity,
    Store: HasRepository<E>,
{
    let created = state.store().repo::<E>().create(new).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PATCH, shallow merge
pub async fn update<E>(
    State(state): State<AppState>,
    id: EntityId<E>,
    ValidatedJson(patch): ValidatedJson<E::Patch>,
) -> ApiResult<Json<E>>
where
    E: Entity,
    Store: HasRepository<E>,
{
    state
        .store()
        .repo::<E>()
        .update(id.id, patch)
        .await?
        .map(Json)
        .ok_or_else(not_found::<E>)
}

/// DELETE, 204 on success
pub async fn delete<E>(State(state): State<AppState>, id: EntityId<E>) -> ApiResult<StatusCode>
where
    E: Entity,
    Store: HasRepository<E>,
{
    if state.store().repo::<E>().delete(id.id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found::<E>())
    }
}
