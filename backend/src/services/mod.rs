//! Business logic services
//!
//! Services hold the few rules that sit above plain storage: password
//! hashing for users and the simulated product catalog.

pub mod catalog;
pub mod password;
pub mod user;

pub use catalog::ProductCatalog;
pub use password::PasswordService;
pub use user::UserService;
