//! Local mirror store
//!
//! On-device SQLite database holding the same seven entity stores as the
//! server, each row a JSON document under a SQLite rowid. Records created
//! here get the negated rowid as their id: local ids are always negative and
//! server ids always positive, so a reference can be told apart by sign and
//! only local ones are translated through [`IdMap`] on replay.
//!
//! Every successful `add` / `update` / `delete` appends exactly one entry
//! to the [`SyncQueue`] inside the same transaction.

use crate::error::{ClientError, ClientResult};
use chrono::Utc;
use fitforge_shared::{Entity, EntityKind, IndexQuery, IndexValue};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::SqliteConnection;
use std::path::Path;
use tracing::{debug, error, info};

mod id_map;
pub mod queue;

pub use id_map::IdMap;
pub(crate) use id_map::Mapping;
pub use queue::{Operation, PendingOperation, SyncQueue};

/// Created on this device and not yet known to the server by that id
pub fn is_local_id(id: i64) -> bool {
    id < 0
}

/// Rowid behind a local id; server ids have no row here
fn row_key(id: i32) -> Option<i64> {
    let id = i64::from(id);
    is_local_id(id).then_some(-id)
}

/// SQLite table behind each store
pub(crate) fn table(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Users => "user_profile",
        EntityKind::WorkoutPrograms => "workout_programs",
        EntityKind::Workouts => "workouts",
        EntityKind::Exercises => "exercises",
        EntityKind::FoodItems => "food_items",
        EntityKind::MealLogs => "meal_logs",
        EntityKind::ProgressLogs => "progress_logs",
    }
}

/// Overlay the fields of `patch` onto `base` (both JSON objects)
pub(crate) fn overlay(base: &mut Value, patch: Value) {
    if let (Value::Object(base), Value::Object(patch)) = (base, patch) {
        for (key, value) in patch {
            base.insert(key, value);
        }
    }
}

/// The on-device store
#[derive(Clone)]
pub struct LocalStore {
    pool: SqlitePool,
}

impl LocalStore {
    /// Open (creating if needed) and migrate the mirror database
    pub async fn open(path: impl AsRef<Path>) -> ClientResult<Self> {
        let path = path.as_ref();
        Self::connect(path).await.map_err(|e| {
            error!(path = %path.display(), error = %e, "Failed to open local store");
            ClientError::StoreInit(e.to_string())
        })
    }

    async fn connect(path: &Path) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        info!(path = %path.display(), "Local store ready");
        Ok(Self { pool })
    }

    pub fn queue(&self) -> SyncQueue {
        SyncQueue::new(self.pool.clone())
    }

    pub fn id_map(&self) -> IdMap {
        IdMap::new(self.pool.clone())
    }

    /// Insert with a locally assigned id and queue an `add`
    pub async fn add<E: Entity>(&self, new: E::New) -> ClientResult<E> {
        let table = table(E::KIND);
        let mut tx = self.pool.begin().await?;

        let row: i64 = sqlx::query_scalar(&format!(
            "INSERT INTO {table} (data) VALUES ('{{}}') RETURNING id"
        ))
        .fetch_one(&mut *tx)
        .await?;
        let id = i32::try_from(-row).map_err(|_| ClientError::MalformedOperation {
            id: row,
            reason: format!("{} rowid out of range", E::KIND),
        })?;

        // The queued payload keeps every submitted field, even ones the
        // stored entity never serializes.
        let mut payload = serde_json::to_value(&new)?;
        let entity = E::from_new(id, new, Utc::now());
        write_row(&mut tx, &entity).await?;
        overlay(&mut payload, serde_json::to_value(&entity)?);
        if let Value::Object(map) = &mut payload {
            map.insert("id".to_string(), Value::from(id));
        }

        queue::append(&mut tx, Operation::Add, E::KIND, &payload).await?;
        tx.commit().await?;

        debug!(store = %E::KIND, id, "Added to local store");
        Ok(entity)
    }

    /// All rows of the store, optionally through one of its indexes
    pub async fn get_all<E: Entity>(&self, index: Option<&IndexQuery>) -> ClientResult<Vec<E>> {
        let table = table(E::KIND);
        let rows: Vec<String> = match index {
            None => {
                sqlx::query_scalar(&format!("SELECT data FROM {table} ORDER BY id"))
                    .fetch_all(&self.pool)
                    .await?
            }
            Some(lookup) => {
                let field = E::KIND
                    .indexes()
                    .iter()
                    .find(|name| **name == lookup.index)
                    .ok_or_else(|| ClientError::UnknownIndex {
                        store: E::KIND,
                        index: lookup.index.clone(),
                    })?;
                let sql = format!(
                    "SELECT data FROM {table} WHERE json_extract(data, '$.{field}') = ? ORDER BY id"
                );
                let query = sqlx::query_scalar::<sqlx::Sqlite, String>(&sql);
                let query = match &lookup.value {
                    IndexValue::Int(v) => query.bind(*v),
                    IndexValue::Text(v) => query.bind(v.clone()),
                };
                query.fetch_all(&self.pool).await?
            }
        };

        rows.iter()
            .map(|data| serde_json::from_str(data).map_err(ClientError::from))
            .collect()
    }

    pub async fn get_by_id<E: Entity>(&self, id: i32) -> ClientResult<Option<E>> {
        let Some(key) = row_key(id) else {
            return Ok(None);
        };
        let data: Option<String> = sqlx::query_scalar(&format!(
            "SELECT data FROM {} WHERE id = ?",
            table(E::KIND)
        ))
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        data.map(|d| serde_json::from_str(&d))
            .transpose()
            .map_err(ClientError::from)
    }

    /// Shallow-merge a patch and queue an `update`; `None` when absent
    pub async fn update<E: Entity>(&self, id: i32, patch: E::Patch) -> ClientResult<Option<E>> {
        let Some(key) = row_key(id) else {
            return Ok(None);
        };
        let mut tx = self.pool.begin().await?;

        let data: Option<String> = sqlx::query_scalar(&format!(
            "SELECT data FROM {} WHERE id = ?",
            table(E::KIND)
        ))
        .bind(key)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(data) = data else {
            return Ok(None);
        };

        let mut entity: E = serde_json::from_str(&data)?;
        let patch_json = serde_json::to_value(&patch)?;
        entity.apply(patch);
        write_row(&mut tx, &entity).await?;

        let mut payload = serde_json::to_value(&entity)?;
        overlay(&mut payload, patch_json);
        queue::append(&mut tx, Operation::Update, E::KIND, &payload).await?;
        tx.commit().await?;

        debug!(store = %E::KIND, id, "Updated in local store");
        Ok(Some(entity))
    }

    /// Remove and queue a `delete`; `false` (and nothing queued) when absent
    pub async fn delete<E: Entity>(&self, id: i32) -> ClientResult<bool> {
        let Some(key) = row_key(id) else {
            return Ok(false);
        };
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", table(E::KIND)))
            .bind(key)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;
        if !removed {
            return Ok(false);
        }

        queue::append(
            &mut tx,
            Operation::Delete,
            E::KIND,
            &serde_json::json!({ "id": id }),
        )
        .await?;
        tx.commit().await?;

        debug!(store = %E::KIND, id, "Deleted from local store");
        Ok(true)
    }

    /// Retire a replayed queue entry, recording the server id of a
    /// replayed `add` in the same transaction
    pub(crate) async fn acknowledge(
        &self,
        operation_id: i64,
        created: Option<&Mapping>,
    ) -> ClientResult<()> {
        let mut tx = self.pool.begin().await?;
        if let Some(mapping) = created {
            id_map::record_in(&mut tx, mapping).await?;
        }
        queue::remove_in(&mut tx, operation_id).await?;
        tx.commit().await?;
        Ok(())
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

async fn write_row<E: Entity>(conn: &mut SqliteConnection, entity: &E) -> ClientResult<()> {
    sqlx::query(&format!(
        "UPDATE {} SET data = ? WHERE id = ?",
        table(E::KIND)
    ))
    .bind(serde_json::to_string(entity)?)
    .bind(-i64::from(entity.id()))
    .execute(conn)
    .await?;
    Ok(())
}
