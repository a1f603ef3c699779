//! Local id to server id translation
//!
//! Filled in as offline `add`s are replayed so later operations on the same
//! record, and children pointing at it, reach the server-side row.

use super::is_local_id;
use crate::error::{ClientError, ClientResult};
use fitforge_shared::EntityKind;
use sqlx::{SqliteConnection, SqlitePool};

/// Server id assigned to a record created on this device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Mapping {
    pub store: EntityKind,
    pub local_id: i64,
    pub server_id: i64,
}

pub(crate) async fn record_in(
    conn: &mut SqliteConnection,
    mapping: &Mapping,
) -> ClientResult<()> {
    sqlx::query(
        "INSERT INTO id_map (store_name, local_id, server_id) VALUES (?, ?, ?)
         ON CONFLICT (store_name, local_id) DO UPDATE SET server_id = excluded.server_id",
    )
    .bind(mapping.store.store_name())
    .bind(mapping.local_id)
    .bind(mapping.server_id)
    .execute(conn)
    .await?;
    Ok(())
}

#[derive(Clone)]
pub struct IdMap {
    pool: SqlitePool,
}

impl IdMap {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Server id for a local id, if that record has been replayed
    pub async fn server_id(&self, store: EntityKind, local_id: i64) -> ClientResult<Option<i64>> {
        let id = sqlx::query_scalar(
            "SELECT server_id FROM id_map WHERE store_name = ? AND local_id = ?",
        )
        .bind(store.store_name())
        .bind(local_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }

    /// Server id to send for `id`
    ///
    /// Server ids pass through; a local id must already be mapped.
    pub async fn resolve(&self, store: EntityKind, id: i64) -> ClientResult<i64> {
        if !is_local_id(id) {
            return Ok(id);
        }
        self.server_id(store, id)
            .await?
            .ok_or(ClientError::Unsynced { store, local_id: id })
    }

    pub async fn record(
        &self,
        store: EntityKind,
        local_id: i64,
        server_id: i64,
    ) -> ClientResult<()> {
        let mut conn = self.pool.acquire().await?;
        let mapping = Mapping {
            store,
            local_id,
            server_id,
        };
        record_in(&mut conn, &mapping).await
    }
}
