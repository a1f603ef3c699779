//! Sync coordinator
//!
//! Drains the pending-operation queue into the REST API. A drain works on a
//! snapshot taken under the drain lock: the highest queued id at that point
//! is the generation marker, and anything appended while the drain runs
//! waits for the next trigger. Each entry is removed from the queue as soon
//! as the server has applied it, together with the id mapping of a replayed
//! `add` in one transaction, so an interrupted drain never replays the same
//! entry twice.

use crate::api::ApiClient;
use crate::connectivity::Connectivity;
use crate::error::{ClientError, ClientResult};
use crate::mirror::LocalStore;
use crate::notify::{Notification, Notifier};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

mod replay;

/// Where the coordinator stands after its last drain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Draining,
    /// The server refused an operation; it stays at the head of the queue
    Conflict { operation_id: i64, message: String },
    /// Network or server failure; the rest of the queue is untouched
    Failed { message: String },
}

/// Result of one [`SyncCoordinator::trigger_sync`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Offline,
    Complete { applied: usize },
    Partial { applied: usize, total: usize },
}

struct Inner {
    mirror: LocalStore,
    api: ApiClient,
    connectivity: Connectivity,
    notifier: Arc<dyn Notifier>,
    state: watch::Sender<SyncState>,
    pending: watch::Sender<bool>,
    drain: Mutex<()>,
}

#[derive(Clone)]
pub struct SyncCoordinator {
    inner: Arc<Inner>,
}

impl SyncCoordinator {
    pub fn new(
        mirror: LocalStore,
        api: ApiClient,
        connectivity: Connectivity,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (state, _) = watch::channel(SyncState::Idle);
        let (pending, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                mirror,
                api,
                connectivity,
                notifier,
                state,
                pending,
                drain: Mutex::new(()),
            }),
        }
    }

    /// Refresh `has_pending_sync` now and then every `interval`
    pub fn start_polling(&self, interval: Duration) -> JoinHandle<()> {
        let coordinator = self.clone();
        let interval = interval.max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if let Err(e) = coordinator.refresh_pending().await {
                    warn!(error = %e, "Failed to check sync queue");
                }
            }
        })
    }

    pub async fn refresh_pending(&self) -> ClientResult<bool> {
        let pending = self.inner.mirror.queue().has_items().await?;
        self.inner.pending.send_replace(pending);
        Ok(pending)
    }

    pub fn has_pending_sync(&self) -> bool {
        *self.inner.pending.borrow()
    }

    pub fn subscribe_pending(&self) -> watch::Receiver<bool> {
        self.inner.pending.subscribe()
    }

    pub fn state(&self) -> SyncState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SyncState> {
        self.inner.state.subscribe()
    }

    /// Replay queued operations in order, stopping at the first failure
    pub async fn trigger_sync(&self) -> ClientResult<SyncOutcome> {
        let inner = &self.inner;
        if !inner.connectivity.is_online() {
            inner.notifier.notify(Notification::destructive(
                "You're offline",
                "Can't sync data while offline",
            ));
            return Ok(SyncOutcome::Offline);
        }

        inner.notifier.notify(Notification::new(
            "Sync started",
            "Syncing your data with the server...",
        ));

        let _guard = inner.drain.lock().await;
        inner.state.send_replace(SyncState::Draining);

        let result = self.drain().await;
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Sync aborted");
                inner.state.send_replace(SyncState::Failed {
                    message: e.to_string(),
                });
                inner
                    .notifier
                    .notify(Notification::destructive("Sync incomplete", e.to_string()));
                if let Err(refresh) = self.refresh_pending().await {
                    warn!(error = %refresh, "Failed to check sync queue");
                }
                return Err(e);
            }
        };

        match outcome {
            SyncOutcome::Complete { applied } => {
                info!(applied, "Sync complete");
                inner.notifier.notify(Notification::success(
                    "Sync complete",
                    "All your data is now up to date",
                ));
            }
            SyncOutcome::Partial { applied, total } => {
                warn!(applied, total, "Sync incomplete");
                inner.notifier.notify(Notification::destructive(
                    "Sync incomplete",
                    format!("{applied} of {total} changes synced"),
                ));
            }
            SyncOutcome::Offline => {}
        }

        self.refresh_pending().await?;
        Ok(outcome)
    }

    async fn drain(&self) -> ClientResult<SyncOutcome> {
        let inner = &self.inner;
        let ids = inner.mirror.id_map();

        let snapshot = inner.mirror.queue().list().await?;
        let total = snapshot.len();
        let generation = snapshot.iter().map(|op| op.id).max().unwrap_or(0);
        debug!(total, generation, "Draining sync queue");

        let mut applied = 0;
        for op in &snapshot {
            match replay::replay(&inner.api, &ids, op).await {
                Ok(created) => {
                    inner.mirror.acknowledge(op.id, created.as_ref()).await?;
                    applied += 1;
                }
                Err(e) => {
                    warn!(
                        operation_id = op.id,
                        operation = %op.operation,
                        store = %op.store_name,
                        error = %e,
                        "Replay stopped"
                    );
                    inner.state.send_replace(failure_state(op.id, &e));
                    return Ok(SyncOutcome::Partial { applied, total });
                }
            }
        }

        inner.state.send_replace(SyncState::Idle);
        Ok(SyncOutcome::Complete { applied })
    }
}

/// Refusals the server will repeat on retry are conflicts; the rest may
/// succeed later
fn failure_state(operation_id: i64, err: &ClientError) -> SyncState {
    if err.is_rejection()
        || matches!(
            err,
            ClientError::MalformedOperation { .. } | ClientError::Unsynced { .. }
        )
    {
        SyncState::Conflict {
            operation_id,
            message: err.to_string(),
        }
    } else {
        SyncState::Failed {
            message: err.to_string(),
        }
    }
}
