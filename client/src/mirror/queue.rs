//! Pending-operation queue
//!
//! Append-only log of mutations made against the local mirror. Entries are
//! written by the mirror in the same transaction as the mutation itself and
//! consumed only by [`clear`](SyncQueue::clear) or by the sync coordinator
//! acknowledging what it has replayed.

use crate::error::{ClientError, ClientResult};
use chrono::{DateTime, SecondsFormat, Utc};
use fitforge_shared::EntityKind;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqliteConnection, SqlitePool};
use std::fmt;
use std::str::FromStr;

/// Kind of mutation recorded in the queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(Operation::Add),
            "update" => Ok(Operation::Update),
            "delete" => Ok(Operation::Delete),
            other => Err(format!("unknown operation '{}'", other)),
        }
    }
}

/// One queued mutation
///
/// `data` is the entity payload: the inserted record for `add`, the merged
/// record for `update` and `{"id": ..}` for `delete`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingOperation {
    pub id: i64,
    pub operation: Operation,
    pub store_name: EntityKind,
    pub data: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl PendingOperation {
    fn from_row(row: &SqliteRow) -> ClientResult<Self> {
        let id: i64 = row.try_get("id")?;
        let malformed = |reason: String| ClientError::MalformedOperation { id, reason };

        let operation: String = row.try_get("operation")?;
        let store_name: String = row.try_get("store_name")?;
        let data: String = row.try_get("data")?;
        let timestamp: String = row.try_get("timestamp")?;

        Ok(Self {
            id,
            operation: operation.parse().map_err(malformed)?,
            store_name: store_name
                .parse()
                .map_err(|e: fitforge_shared::ModelError| malformed(e.to_string()))?,
            data: serde_json::from_str(&data)?,
            timestamp: DateTime::parse_from_rfc3339(&timestamp)
                .map_err(|e| malformed(e.to_string()))?
                .with_timezone(&Utc),
        })
    }
}

/// Fixed-width RFC 3339 so text order is time order
fn encode_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Record a mutation inside the caller's transaction
pub(crate) async fn append(
    conn: &mut SqliteConnection,
    operation: Operation,
    store: EntityKind,
    data: &serde_json::Value,
) -> ClientResult<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO sync_queue (operation, store_name, data, timestamp) VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(operation.as_str())
    .bind(store.store_name())
    .bind(serde_json::to_string(data)?)
    .bind(encode_timestamp(Utc::now()))
    .fetch_one(conn)
    .await?;
    Ok(id)
}

/// Remove one entry inside the caller's transaction
pub(crate) async fn remove_in(conn: &mut SqliteConnection, id: i64) -> ClientResult<()> {
    sqlx::query("DELETE FROM sync_queue WHERE id = ?")
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Handle on the queue table of one mirror database
#[derive(Clone)]
pub struct SyncQueue {
    pool: SqlitePool,
}

impl SyncQueue {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Every entry, oldest first
    pub async fn list(&self) -> ClientResult<Vec<PendingOperation>> {
        let rows = sqlx::query(
            "SELECT id, operation, store_name, data, timestamp FROM sync_queue ORDER BY timestamp, id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(PendingOperation::from_row).collect()
    }

    /// Drop the whole queue in one statement
    pub async fn clear(&self) -> ClientResult<()> {
        sqlx::query("DELETE FROM sync_queue")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn has_items(&self) -> ClientResult<bool> {
        Ok(self.len().await? > 0)
    }

    pub async fn len(&self) -> ClientResult<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sync_queue")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }
}
