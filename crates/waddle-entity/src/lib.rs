//! # waddle-entity
//!
//! Domain entity models for Waddle. Database entities derive
//! `sqlx::FromRow` in addition to the serde traits.

pub mod user;
