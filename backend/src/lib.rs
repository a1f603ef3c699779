//! FitForge backend library
//!
//! Exposes the backend modules for the binary, the integration tests and
//! the client crate's end-to-end tests.

pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;
