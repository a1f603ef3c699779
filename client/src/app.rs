//! Client startup
//!
//! Nothing renders until the local mirror opens. A failed open leaves the
//! gate in [`GateState::Failed`] with a user-visible error until
//! [`AppGate::retry`] succeeds.

use crate::access::DataAccess;
use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::connectivity::Connectivity;
use crate::error::{ClientError, ClientResult};
use crate::mirror::LocalStore;
use crate::notify::{Notification, Notifier};
use crate::sync::SyncCoordinator;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// A ready client: data access and sync over one mirror
#[derive(Clone)]
pub struct FitForge {
    pub mirror: LocalStore,
    pub data: DataAccess,
    pub sync: SyncCoordinator,
    pub connectivity: Connectivity,
}

impl FitForge {
    pub fn new(
        config: &ClientConfig,
        mirror: LocalStore,
        connectivity: Connectivity,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let api = ApiClient::new(&config.api_base_url);
        let data = DataAccess::new(
            mirror.clone(),
            api.clone(),
            connectivity.clone(),
            notifier.clone(),
            &config.cache,
        );
        let sync = SyncCoordinator::new(mirror.clone(), api, connectivity.clone(), notifier);
        Self {
            mirror,
            data,
            sync,
            connectivity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    Loading,
    Ready,
    /// "Database Initialization Error" screen with a retry action
    Failed { message: String },
}

pub struct AppGate {
    config: ClientConfig,
    connectivity: Connectivity,
    notifier: Arc<dyn Notifier>,
    state: GateState,
    client: Option<FitForge>,
    background: Vec<JoinHandle<()>>,
}

impl AppGate {
    pub fn new(
        config: ClientConfig,
        connectivity: Connectivity,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            connectivity,
            notifier,
            state: GateState::Loading,
            client: None,
            background: Vec::new(),
        }
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn client(&self) -> Option<&FitForge> {
        self.client.as_ref()
    }

    /// Open the mirror and start the pending-sync poller and cache sweeper
    pub async fn open(&mut self) -> ClientResult<&FitForge> {
        if self.client.is_none() {
            self.state = GateState::Loading;
            let mirror = match LocalStore::open(&self.config.database_path).await {
                Ok(mirror) => mirror,
                Err(e) => {
                    self.notifier.notify(Notification::destructive(
                        "Database Error",
                        "Failed to initialize offline database",
                    ));
                    self.state = GateState::Failed {
                        message: e.to_string(),
                    };
                    return Err(e);
                }
            };

            let client = FitForge::new(
                &self.config,
                mirror,
                self.connectivity.clone(),
                self.notifier.clone(),
            );
            self.background = vec![
                client.sync.start_polling(self.config.poll_interval()),
                client
                    .data
                    .cache()
                    .spawn_cleanup(self.config.cache.cleanup_interval()),
            ];
            info!("Client ready");
            self.state = GateState::Ready;
            self.client = Some(client);
        }

        self.client
            .as_ref()
            .ok_or_else(|| ClientError::StoreInit("client not initialized".to_string()))
    }

    /// Retry action of the error screen
    pub async fn retry(&mut self) -> ClientResult<&FitForge> {
        self.open().await
    }

    /// Stop the background tasks started by [`open`](Self::open)
    pub async fn shutdown(&mut self) {
        for task in self.background.drain(..) {
            task.abort();
            // Cancellation is the expected outcome
            let _ = task.await;
        }
        debug!("Background tasks stopped");
    }

    #[cfg(test)]
    fn running_tasks(&self) -> usize {
        self.background.iter().filter(|t| !t.is_finished()).count()
    }
}

impl Drop for AppGate {
    fn drop(&mut self) {
        for task in &self.background {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MemoryNotifier;

    #[tokio::test]
    async fn test_failed_open_then_retry() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the database file should be
        let blocked = dir.path().join("fitforge.db");
        std::fs::create_dir(&blocked).unwrap();

        let config = ClientConfig {
            database_path: blocked.clone(),
            ..ClientConfig::default()
        };
        let notifier = Arc::new(MemoryNotifier::new());
        let mut gate = AppGate::new(config, Connectivity::new(false), notifier.clone());

        assert!(gate.open().await.is_err());
        assert!(matches!(gate.state(), GateState::Failed { .. }));
        assert!(gate.client().is_none());
        assert_eq!(notifier.take_titles(), vec!["Database Error"]);

        std::fs::remove_dir(&blocked).unwrap();
        assert!(gate.retry().await.is_ok());
        assert_eq!(gate.state(), &GateState::Ready);
        assert!(gate.client().is_some());
    }

    #[tokio::test]
    async fn test_shutdown_stops_background_tasks() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig {
            database_path: dir.path().join("fitforge.db"),
            ..ClientConfig::default()
        };
        let notifier = Arc::new(MemoryNotifier::new());
        let mut gate = AppGate::new(config, Connectivity::new(false), notifier);

        gate.open().await.unwrap();
        assert_eq!(gate.running_tasks(), 2);

        gate.shutdown().await;
        assert_eq!(gate.running_tasks(), 0);
        assert!(gate.background.is_empty());
        // The client itself stays usable
        assert!(gate.client().is_some());
    }
}
