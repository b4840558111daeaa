//! # waddle-database
//!
//! PostgreSQL connection management, the migration runner, and the
//! user repository.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
