//! In-memory repository
//!
//! Rows live in a `BTreeMap` keyed by id behind a `tokio` lock. Ids come from
//! a per-table counter that only moves forward, so deleted ids are never
//! handed out again.

use super::{Repository, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::Utc;
use fitforge_shared::Entity;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::debug;

struct Table<E> {
    rows: BTreeMap<i32, E>,
    next_id: i32,
}

impl<E: Entity> Table<E> {
    fn ensure_unique(&self, candidate: &E) -> StoreResult<()> {
        let Some(key) = candidate.unique_key() else {
            return Ok(());
        };
        let taken = self
            .rows
            .values()
            .any(|row| row.id() != candidate.id() && row.unique_key() == Some(key));
        if taken {
            return Err(StoreError::Conflict(format!(
                "{} '{}' already exists",
                E::KIND.label(),
                key
            )));
        }
        Ok(())
    }
}

/// Process-lifetime repository for one entity type
pub struct MemoryRepository<E: Entity> {
    table: RwLock<Table<E>>,
}

impl<E: Entity> MemoryRepository<E> {
    pub fn new() -> Self {
        Self::with_rows(Vec::new())
    }

    /// Start from existing rows; the counter continues after the highest id
    pub fn with_rows(rows: Vec<E>) -> Self {
        let next_id = rows.iter().map(|row| row.id()).max().unwrap_or(0) + 1;
        let rows = rows.into_iter().map(|row| (row.id(), row)).collect();
        Self {
            table: RwLock::new(Table { rows, next_id }),
        }
    }
}

impl<E: Entity> Default for MemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for MemoryRepository<E> {
    async fn create(&self, new: E::New) -> StoreResult<E> {
        let mut table = self.table.write().await;
        let id = table.next_id;
        let entity = E::from_new(id, new, Utc::now());
        table.ensure_unique(&entity)?;

        table.next_id += 1;
        table.rows.insert(id, entity.clone());
        debug!(store = %E::KIND, id, "Created entity");
        Ok(entity)
    }

    async fn get(&self, id: i32) -> StoreResult<Option<E>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn list(&self, filter: &E::Filter) -> StoreResult<Vec<E>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|row| row.matches(filter))
            .cloned()
            .collect())
    }

    async fn update(&self, id: i32, patch: E::Patch) -> StoreResult<Option<E>> {
        let mut table = self.table.write().await;
        let Some(current) = table.rows.get(&id) else {
            return Ok(None);
        };

        let mut merged = current.clone();
        merged.apply(patch);
        table.ensure_unique(&merged)?;

        table.rows.insert(id, merged.clone());
        debug!(store = %E::KIND, id, "Updated entity");
        Ok(Some(merged))
    }

    async fn delete(&self, id: i32) -> StoreResult<bool> {
        let removed = self.table.write().await.rows.remove(&id).is_some();
        if removed {
            debug!(store = %E::KIND, id, "Deleted entity");
        }
        Ok(removed)
    }
}
