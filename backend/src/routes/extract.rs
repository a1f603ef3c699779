//! Request extractors
//!
//! Wrap axum's `Json`, `Query` and `Path` so that every rejection is rendered
//! as an [`ApiError`] body instead of axum's plain-text default.

use crate::error::ApiError;
use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Json,
};
use fitforge_shared::Entity;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use validator::Validate;

/// JSON body that has been deserialized and validated
///
/// Malformed JSON is `BAD_REQUEST`; a body that parses but breaks a field
/// rule is `VALIDATION_ERROR` with the offending field.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Query string deserialized into a filter type
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                ApiError::BadRequest(format!("Invalid query: {}", rejection.body_text()))
            })?;
        Ok(Self(value))
    }
}

/// Integer id from the `:id` path segment of an entity route
#[derive(Debug)]
pub struct EntityId<E> {
    pub id: i32,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> EntityId<E> {
    fn parse(raw: &str) -> Result<Self, ApiError> {
        let id = raw.trim().parse::<i32>().map_err(|_| {
            ApiError::BadRequest(format!("Invalid {} ID", E::KIND.label().to_lowercase()))
        })?;
        Ok(Self {
            id,
            _entity: PhantomData,
        })
    }
}

#[axum::async_trait]
impl<E, S> FromRequestParts<S> for EntityId<E>
where
    E: Entity,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        Self::parse(&raw)
    }
}
