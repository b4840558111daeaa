//! Core type definitions used across the Waddle workspace.

pub mod id;
pub mod pagination;

pub use id::{ConnectionId, Identity, TokenId};
pub use pagination::{PageRequest, PageResponse};
