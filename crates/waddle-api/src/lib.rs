//! # waddle-api
//!
//! HTTP API layer for Waddle built on Axum.
//!
//! Provides the auth and user endpoints, the broadcast producer, the
//! WebSocket upgrade, the access-gating middleware, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, serve};
pub use error::ApiError;
pub use state::AppState;
