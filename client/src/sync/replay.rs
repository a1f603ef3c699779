//! Replay of one queued operation against the REST API

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::mirror::{IdMap, Mapping, Operation, PendingOperation};
use serde_json::{Map, Value};
use tracing::debug;

fn malformed(op: &PendingOperation, reason: impl Into<String>) -> ClientError {
    ClientError::MalformedOperation {
        id: op.id,
        reason: reason.into(),
    }
}

fn local_id(op: &PendingOperation) -> ClientResult<i64> {
    op.data["id"]
        .as_i64()
        .ok_or_else(|| malformed(op, "payload has no integer id"))
}

/// Request body for the server: the local id removed and references to
/// device-created owners pointed at their server rows
async fn server_body(ids: &IdMap, op: &PendingOperation) -> ClientResult<Value> {
    let Value::Object(fields) = &op.data else {
        return Err(malformed(op, "payload is not an object"));
    };

    let mut body: Map<String, Value> = fields.clone();
    body.remove("id");
    for (field, parent) in op.store_name.foreign_keys() {
        if let Some(local) = body.get(*field).and_then(Value::as_i64) {
            let server = ids.resolve(*parent, local).await?;
            body.insert(field.to_string(), Value::from(server));
        }
    }
    Ok(Value::Object(body))
}

fn returned_id(op: &PendingOperation, created: &Value) -> ClientResult<i64> {
    created["id"]
        .as_i64()
        .ok_or_else(|| malformed(op, "server response has no id"))
}

/// Apply one operation; `Ok` means the server now reflects it
///
/// A replayed `add` yields the id the server assigned; the caller records
/// it when it retires the queue entry.
pub(crate) async fn replay(
    api: &ApiClient,
    ids: &IdMap,
    op: &PendingOperation,
) -> ClientResult<Option<Mapping>> {
    let local = local_id(op)?;
    let kind = op.store_name;

    match op.operation {
        Operation::Add => {
            let body = server_body(ids, op).await?;
            let created = api.create_raw(kind, &body).await?;
            let server = returned_id(op, &created)?;
            debug!(store = %kind, local, server, "Replayed add");
            Ok(Some(Mapping {
                store: kind,
                local_id: local,
                server_id: server,
            }))
        }
        Operation::Update => {
            let body = server_body(ids, op).await?;
            let server = ids.resolve(kind, local).await?;
            api.update_raw(kind, server, &body).await?;
            debug!(store = %kind, local, server, "Replayed update");
            Ok(None)
        }
        Operation::Delete => {
            let server = ids.resolve(kind, local).await?;
            // Already gone on the server counts as applied
            let existed = api.delete_raw(kind, server).await?;
            debug!(store = %kind, local, server, existed, "Replayed delete");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mirror::LocalStore;
    use chrono::Utc;
    use fitforge_shared::EntityKind;
    use serde_json::json;

    fn pending(operation: Operation, store_name: EntityKind, data: Value) -> PendingOperation {
        PendingOperation {
            id: 1,
            operation,
            store_name,
            data,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_body_translates_owner_and_drops_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path().join("replay.db")).await.unwrap();
        let ids = store.id_map();
        ids.record(EntityKind::WorkoutPrograms, -3, 17).await.unwrap();

        let op = pending(
            Operation::Add,
            EntityKind::Workouts,
            json!({"id": -9, "programId": -3, "name": "Legs"}),
        );
        let body = server_body(&ids, &op).await.unwrap();
        assert_eq!(body, json!({"programId": 17, "name": "Legs"}));

        // Server-side owners keep their id
        let op = pending(
            Operation::Add,
            EntityKind::WorkoutPrograms,
            json!({"id": -4, "userId": 1, "name": "Split"}),
        );
        let body = server_body(&ids, &op).await.unwrap();
        assert_eq!(body["userId"], 1);
    }

    #[tokio::test]
    async fn test_server_owner_is_not_confused_with_mapped_local_owner() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path().join("replay.db")).await.unwrap();
        let ids = store.id_map();
        ids.record(EntityKind::WorkoutPrograms, -1, 3).await.unwrap();

        let op = pending(
            Operation::Add,
            EntityKind::Workouts,
            json!({"id": -2, "programId": 1, "name": "Legs"}),
        );
        let body = server_body(&ids, &op).await.unwrap();
        assert_eq!(body["programId"], 1);
    }

    #[tokio::test]
    async fn test_unmapped_local_owner_is_unsynced() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path().join("replay.db")).await.unwrap();

        let op = pending(
            Operation::Add,
            EntityKind::Exercises,
            json!({"id": -5, "workoutId": -8, "name": "Squat"}),
        );
        let err = server_body(&store.id_map(), &op).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Unsynced {
                store: EntityKind::Workouts,
                local_id: -8
            }
        ));
    }

    #[test]
    fn test_missing_id_is_malformed() {
        let op = pending(Operation::Delete, EntityKind::Exercises, json!({}));
        assert!(matches!(
            local_id(&op),
            Err(ClientError::MalformedOperation { id: 1, .. })
        ));
    }
}
