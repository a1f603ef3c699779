//! REST client for the FitForge API
//!
//! Typed calls for the data access layer and JSON-level calls for replay,
//! which only has the queued payload. Non-success responses become
//! [`ClientError::Http`] carrying the server's error message.

use crate::error::{ClientError, ClientResult};
use fitforge_shared::{
    CatalogProduct, Entity, EntityKind, FoodSearchQuery, FoodSearchResponse, FoodSearchResult,
};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn collection_path(kind: EntityKind) -> String {
        format!("/api/{}", kind.api_path())
    }

    pub fn item_path(kind: EntityKind, id: i64) -> String {
        format!("/api/{}/{}", kind.api_path(), id)
    }

    /// Cache key of a collection listing: its path and encoded query
    pub fn list_key<E: Entity>(filter: &E::Filter) -> ClientResult<String> {
        let collection = Self::collection_path(E::KIND);
        let query = serde_urlencoded::to_string(filter)?;
        Ok(if query.is_empty() {
            collection
        } else {
            format!("{collection}?{query}")
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!(%method, path, "API request");
        self.http.request(method, self.url(path))
    }

    async fn execute(request: RequestBuilder) -> ClientResult<Response> {
        let response = request.send().await?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from(response).await)
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let response = Self::execute(self.request(Method::GET, path)).await?;
        Ok(response.json().await?)
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> ClientResult<Response> {
        Self::execute(self.request(method, path).json(body)).await
    }

    pub async fn list<E: Entity>(&self, filter: &E::Filter) -> ClientResult<Vec<E>> {
        let request = self
            .request(Method::GET, &Self::collection_path(E::KIND))
            .query(filter);
        Ok(Self::execute(request).await?.json().await?)
    }

    /// `None` on 404
    pub async fn get<E: Entity>(&self, id: i32) -> ClientResult<Option<E>> {
        match self.get_json(&Self::item_path(E::KIND, id.into())).await {
            Ok(entity) => Ok(Some(entity)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn create<E: Entity>(&self, new: &E::New) -> ClientResult<E> {
        let path = Self::collection_path(E::KIND);
        let response = self.send_json(Method::POST, &path, new).await?;
        Ok(response.json().await?)
    }

    /// `None` on 404
    pub async fn update<E: Entity>(&self, id: i32, patch: &E::Patch) -> ClientResult<Option<E>> {
        let path = Self::item_path(E::KIND, id.into());
        match self.send_json(Method::PATCH, &path, patch).await {
            Ok(response) => Ok(Some(response.json().await?)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// `false` on 404
    pub async fn delete<E: Entity>(&self, id: i32) -> ClientResult<bool> {
        self.delete_raw(E::KIND, id.into()).await
    }

    /// POST an untyped payload, returning the stored record
    pub async fn create_raw(&self, kind: EntityKind, payload: &Value) -> ClientResult<Value> {
        let path = Self::collection_path(kind);
        let response = self.send_json(Method::POST, &path, payload).await?;
        Ok(response.json().await?)
    }

    pub async fn update_raw(&self, kind: EntityKind, id: i64, payload: &Value) -> ClientResult<Value> {
        let path = Self::item_path(kind, id);
        let response = self.send_json(Method::PATCH, &path, payload).await?;
        Ok(response.json().await?)
    }

    pub async fn delete_raw(&self, kind: EntityKind, id: i64) -> ClientResult<bool> {
        let request = self.request(Method::DELETE, &Self::item_path(kind, id));
        match Self::execute(request).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Simulated catalog lookup; `None` when the code is unknown
    pub async fn lookup_barcode(&self, code: &str) -> ClientResult<Option<CatalogProduct>> {
        let path = format!("/api/barcode/{}", urlencoding::encode(code));
        match self.get_json(&path).await {
            Ok(product) => Ok(Some(product)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn search_foods(&self, query: &str) -> ClientResult<Vec<FoodSearchResult>> {
        let params = FoodSearchQuery {
            query: Some(query.to_string()),
        };
        let request = self.request(Method::GET, "/api/food-search").query(&params);
        let response: FoodSearchResponse = Self::execute(request).await?.json().await?;
        Ok(response.results)
    }
}

async fn error_from(response: Response) -> ClientError {
    let status = response.status();
    let body: Option<Value> = response.json().await.ok();
    let message = body
        .as_ref()
        .and_then(|b| b["error"]["message"].as_str())
        .map(str::to_string)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });
    ClientError::Http {
        status: status.as_u16(),
        message,
    }
}
