//! # waddle-core
//!
//! Core crate for Waddle. Contains configuration schemas, typed
//! identifiers, the clock abstraction used for token lifetimes,
//! pagination types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Waddle crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
