//! Session lifecycle: issuance, storage, liveness, and revocation.

pub mod authority;
pub mod store;

pub use authority::{SessionAuthority, TokenPair};
pub use store::{SessionRecord, SessionStore};
