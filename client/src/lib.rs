//! FitForge client library
//!
//! Offline-capable data layer for the FitForge app: a SQLite mirror of the
//! server stores, the queue of changes made while offline, the coordinator
//! that replays them, and the data access facade the UI talks to.

pub mod access;
pub mod api;
pub mod app;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod mirror;
pub mod notify;
pub mod sync;

pub use access::{Collection, DataAccess, QueryCache};
pub use api::ApiClient;
pub use app::{AppGate, FitForge, GateState};
pub use config::ClientConfig;
pub use connectivity::Connectivity;
pub use error::{ClientError, ClientResult};
pub use mirror::{IdMap, LocalStore, Operation, PendingOperation, SyncQueue};
pub use notify::{LogNotifier, MemoryNotifier, Notification, Notifier, Variant};
pub use sync::{SyncCoordinator, SyncOutcome, SyncState};
