//! FitForge Shared Library
//!
//! Domain model shared by the backend, the offline client and the WASM
//! module: entities, insert/patch contracts, list filters, validation and
//! nutrition metrics.

pub mod entity;
pub mod errors;
pub mod health_metrics;
pub mod models;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use entity::{Entity, EntityKind, IndexQuery, IndexValue};
pub use errors::*;
pub use health_metrics::*;
pub use models::*;
pub use types::*;
