//! Data access facade
//!
//! One entry point per entity store for the UI. Reads and writes go to the
//! REST API while online and to the local mirror while offline; offline
//! writes land in the pending-operation queue through the mirror. Online
//! reads are cached per request path and every online write drops the
//! cached reads of its collection.

use crate::api::ApiClient;
use crate::config::CacheConfig;
use crate::connectivity::Connectivity;
use crate::error::{ClientError, ClientResult};
use crate::mirror::LocalStore;
use crate::notify::{Notification, Notifier};
use fitforge_shared::{CatalogProduct, Entity, EntityKind, FoodSearchResult};
use lru::LruCache;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use validator::Validate;

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(500) {
    Some(n) => n,
    None => unreachable!(),
};

struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Cached responses keyed by request path and query
///
/// Least-recently-used entries are evicted once `max_entries` is reached;
/// expired ones are dropped on read and by the cleanup task.
pub struct QueryCache {
    stale_time: Duration,
    entries: RwLock<LruCache<String, CacheEntry>>,
}

impl QueryCache {
    pub fn new(stale_time: Duration, max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(DEFAULT_CAPACITY);
        Self {
            stale_time,
            entries: RwLock::new(LruCache::new(capacity)),
        }
    }

    /// Fresh entry for `key`, if any
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut entries = self.entries.write().await;
        // LruCache::get bumps recency, so this needs the write lock
        let entry = entries.get(key)?;
        if entry.is_expired() {
            entries.pop(key);
            return None;
        }
        serde_json::from_value(entry.value.clone()).ok()
    }

    pub async fn put<T: Serialize>(&self, key: &str, value: &T) {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Skipping cache write");
                return;
            }
        };
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + self.stale_time,
        };
        self.entries.write().await.push(key.to_string(), entry);
    }

    /// Drop every key of one collection (`/api/workouts`, `/api/workouts?..`,
    /// `/api/workouts/3`)
    pub async fn invalidate_collection(&self, collection: &str) {
        let mut entries = self.entries.write().await;
        let doomed: Vec<String> = entries
            .iter()
            .filter(|(key, _)| match key.strip_prefix(collection) {
                Some(rest) => rest.is_empty() || rest.starts_with('?') || rest.starts_with('/'),
                None => false,
            })
            .map(|(key, _)| key.clone())
            .collect();
        for key in &doomed {
            entries.pop(key);
        }
    }

    /// Remove expired entries, returning how many went
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();
        for key in &expired {
            entries.pop(key);
        }
        expired.len()
    }

    /// Purge expired entries every `every` until the handle is aborted
    pub fn spawn_cleanup(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        let every = every.max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let removed = cache.purge_expired().await;
                if removed > 0 {
                    debug!(removed, "Purged expired cache entries");
                }
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[derive(Clone, Copy)]
enum Mutation {
    Create,
    Update,
    Delete,
}

/// Success toast text and the failure fallback for one store and mutation
#[rustfmt::skip]
fn messages(kind: EntityKind, mutation: Mutation) -> (&'static str, &'static str, &'static str, &'static str) {
    use EntityKind::*;
    use Mutation::*;
    match (kind, mutation) {
        (Users, Create) => ("Profile created", "Your profile has been created successfully", "Creation failed", "Failed to create profile"),
        (Users, Update) => ("Profile updated", "Your profile has been updated successfully", "Update failed", "Failed to update profile"),
        (Users, Delete) => ("Profile deleted", "Your profile has been deleted", "Deletion failed", "Failed to delete profile"),
        (WorkoutPrograms, Create) => ("Program created", "Your workout program has been created successfully", "Creation failed", "Failed to create workout program"),
        (WorkoutPrograms, Update) => ("Program updated", "Your workout program has been updated successfully", "Update failed", "Failed to update workout program"),
        (WorkoutPrograms, Delete) => ("Program deleted", "Your workout program has been deleted", "Deletion failed", "Failed to delete workout program"),
        (Workouts, Create) => ("Workout created", "Your workout has been created successfully", "Creation failed", "Failed to create workout"),
        (Workouts, Update) => ("Workout updated", "Your workout has been updated successfully", "Update failed", "Failed to update workout"),
        (Workouts, Delete) => ("Workout deleted", "Your workout has been deleted", "Deletion failed", "Failed to delete workout"),
        (Exercises, Create) => ("Exercise added", "Exercise has been added to your workout", "Creation failed", "Failed to add exercise"),
        (Exercises, Update) => ("Exercise updated", "Exercise has been updated successfully", "Update failed", "Failed to update exercise"),
        (Exercises, Delete) => ("Exercise deleted", "Exercise has been removed from your workout", "Deletion failed", "Failed to delete exercise"),
        (FoodItems, Create) => ("Food item added", "Food item has been added to your database", "Creation failed", "Failed to add food item"),
        (FoodItems, Update) => ("Food item updated", "Food item has been updated successfully", "Update failed", "Failed to update food item"),
        (FoodItems, Delete) => ("Food item deleted", "Food item has been removed from your database", "Deletion failed", "Failed to delete food item"),
        (MealLogs, Create) => ("Meal logged", "Your meal has been logged successfully", "Logging failed", "Failed to log meal"),
        (MealLogs, Update) => ("Meal updated", "Your meal log has been updated successfully", "Update failed", "Failed to update meal log"),
        (MealLogs, Delete) => ("Meal deleted", "Your meal log has been deleted", "Deletion failed", "Failed to delete meal log"),
        (ProgressLogs, Create) => ("Progress logged", "Your progress has been logged successfully", "Logging failed", "Failed to log progress"),
        (ProgressLogs, Update) => ("Progress updated", "Your progress log has been updated successfully", "Update failed", "Failed to update progress log"),
        (ProgressLogs, Delete) => ("Progress log deleted", "Your progress log has been deleted", "Deletion failed", "Failed to delete progress log"),
    }
}

/// Online/offline routing over the mirror and the API
#[derive(Clone)]
pub struct DataAccess {
    mirror: LocalStore,
    api: ApiClient,
    connectivity: Connectivity,
    notifier: Arc<dyn Notifier>,
    cache: Arc<QueryCache>,
}

impl DataAccess {
    pub fn new(
        mirror: LocalStore,
        api: ApiClient,
        connectivity: Connectivity,
        notifier: Arc<dyn Notifier>,
        cache: &CacheConfig,
    ) -> Self {
        Self {
            mirror,
            api,
            connectivity,
            notifier,
            cache: Arc::new(QueryCache::new(cache.stale_time(), cache.max_entries)),
        }
    }

    pub fn collection<E: Entity>(&self) -> Collection<'_, E> {
        Collection {
            access: self,
            _entity: PhantomData,
        }
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    /// Catalog lookup; needs a connection
    pub async fn lookup_barcode(&self, code: &str) -> ClientResult<Option<CatalogProduct>> {
        if !self.is_online() {
            return Err(ClientError::Offline);
        }
        self.api.lookup_barcode(code).await
    }

    pub async fn search_foods(&self, query: &str) -> ClientResult<Vec<FoodSearchResult>> {
        if !self.is_online() {
            return Err(ClientError::Offline);
        }
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        self.api.search_foods(query).await
    }
}

/// Reads and writes for one entity store
pub struct Collection<'a, E: Entity> {
    access: &'a DataAccess,
    _entity: PhantomData<E>,
}

impl<'a, E: Entity> Collection<'a, E> {
    pub async fn list(&self, filter: &E::Filter) -> ClientResult<Vec<E>> {
        let access = self.access;
        if !access.is_online() {
            let index = E::owner_index(filter);
            let rows: Vec<E> = access.mirror.get_all(index.as_ref()).await?;
            return Ok(rows.into_iter().filter(|row| row.matches(filter)).collect());
        }

        let key = ApiClient::list_key::<E>(filter)?;
        if let Some(hit) = access.cache.get::<Vec<E>>(&key).await {
            debug!(key, "Cache hit");
            return Ok(hit);
        }
        let rows = access.api.list::<E>(filter).await?;
        access.cache.put(&key, &rows).await;
        Ok(rows)
    }

    pub async fn get(&self, id: i32) -> ClientResult<Option<E>> {
        let access = self.access;
        if !access.is_online() {
            return access.mirror.get_by_id(id).await;
        }

        let key = ApiClient::item_path(E::KIND, id.into());
        if let Some(hit) = access.cache.get::<E>(&key).await {
            return Ok(Some(hit));
        }
        let found = access.api.get::<E>(id).await?;
        if let Some(entity) = &found {
            access.cache.put(&key, entity).await;
        }
        Ok(found)
    }

    pub async fn create(&self, new: E::New) -> ClientResult<E> {
        let result = self.try_create(new).await;
        self.report(Mutation::Create, result.as_ref().map(|_| true));
        result
    }

    async fn try_create(&self, new: E::New) -> ClientResult<E> {
        new.validate()?;
        let access = self.access;
        if !access.is_online() {
            return access.mirror.add::<E>(new).await;
        }
        let created = access.api.create::<E>(&new).await?;
        access
            .cache
            .invalidate_collection(&ApiClient::collection_path(E::KIND))
            .await;
        Ok(created)
    }

    /// `None` when the record does not exist
    pub async fn update(&self, id: i32, patch: E::Patch) -> ClientResult<Option<E>> {
        let result = self.try_update(id, patch).await;
        self.report(Mutation::Update, result.as_ref().map(Option::is_some));
        result
    }

    async fn try_update(&self, id: i32, patch: E::Patch) -> ClientResult<Option<E>> {
        patch.validate()?;
        let access = self.access;
        if !access.is_online() {
            return access.mirror.update::<E>(id, patch).await;
        }
        let updated = access.api.update::<E>(id, &patch).await?;
        access
            .cache
            .invalidate_collection(&ApiClient::collection_path(E::KIND))
            .await;
        Ok(updated)
    }

    /// `false` when the record does not exist
    pub async fn delete(&self, id: i32) -> ClientResult<bool> {
        let result = self.try_delete(id).await;
        self.report(Mutation::Delete, result.as_ref().map(|removed| *removed));
        result
    }

    async fn try_delete(&self, id: i32) -> ClientResult<bool> {
        let access = self.access;
        if !access.is_online() {
            return access.mirror.delete::<E>(id).await;
        }
        let removed = access.api.delete::<E>(id).await?;
        access
            .cache
            .invalidate_collection(&ApiClient::collection_path(E::KIND))
            .await;
        Ok(removed)
    }

    /// Mutation toast; `Ok(false)` means the record was missing
    fn report(&self, mutation: Mutation, result: Result<bool, &ClientError>) {
        let (title, description, failed, fallback) = messages(E::KIND, mutation);
        let notification = match result {
            Ok(true) => Notification::new(title, description),
            Ok(false) => {
                Notification::destructive(failed, format!("{} not found", E::KIND.label()))
            }
            Err(e) => {
                let message = e.to_string();
                let description = if message.is_empty() {
                    fallback.to_string()
                } else {
                    message
                };
                Notification::destructive(failed, description)
            }
        };
        self.access.notifier.notify(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_expires_entries() {
        let cache = QueryCache::new(Duration::from_millis(0), 8);
        cache.put("/api/workouts?programId=1", &vec![1, 2]).await;
        assert_eq!(cache.get::<Vec<i32>>("/api/workouts?programId=1").await, None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_invalidate_is_scoped_to_collection() {
        let cache = QueryCache::new(Duration::from_secs(300), 8);
        cache.put("/api/workouts?programId=1", &1).await;
        cache.put("/api/workouts/4", &2).await;
        cache.put("/api/workout-programs?userId=1", &3).await;
        cache.put("/api/users/1", &4).await;

        cache.invalidate_collection("/api/workouts").await;
        assert_eq!(cache.get::<i32>("/api/workouts?programId=1").await, None);
        assert_eq!(cache.get::<i32>("/api/workouts/4").await, None);
        assert_eq!(cache.get::<i32>("/api/workout-programs?userId=1").await, Some(3));
        assert_eq!(cache.get::<i32>("/api/users/1").await, Some(4));
    }

    #[tokio::test]
    async fn test_cache_is_bounded_by_recency() {
        let cache = QueryCache::new(Duration::from_secs(300), 2);
        cache.put("/api/meal-logs?userId=1&date=2024-06-01", &1).await;
        cache.put("/api/meal-logs?userId=1&date=2024-06-02", &2).await;
        // Touch the first so the second is the eviction candidate
        assert_eq!(cache.get::<i32>("/api/meal-logs?userId=1&date=2024-06-01").await, Some(1));

        for day in 3..30 {
            let key = format!("/api/meal-logs?userId=1&date=2024-06-{day:02}");
            cache.put(&key, &day).await;
        }
        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get::<i32>("/api/meal-logs?userId=1&date=2024-06-02").await, None);
    }

    #[tokio::test]
    async fn test_cleanup_task_purges_expired() {
        let cache = Arc::new(QueryCache::new(Duration::from_millis(0), 8));
        cache.put("/api/users/1", &1).await;
        cache.put("/api/users/2", &2).await;

        // The first tick fires immediately
        let cleanup = cache.spawn_cleanup(Duration::from_secs(60));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(cache.is_empty().await);
        cleanup.abort();
    }

    #[test]
    fn test_every_store_has_messages() {
        for kind in EntityKind::ALL {
            for mutation in [Mutation::Create, Mutation::Update, Mutation::Delete] {
                let (title, description, failed, fallback) = messages(kind, mutation);
                assert!(!title.is_empty() && !description.is_empty());
                assert!(!failed.is_empty() && !fallback.is_empty());
            }
        }
    }
}
