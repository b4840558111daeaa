//! # waddle-auth
//!
//! Authentication for Waddle.
//!
//! ## Modules
//!
//! - `jwt`: signing and verification of access and refresh tokens
//! - `session`: the in-memory session authority and its liveness checks
//! - `password`: Argon2id password hashing
//! - `error`: token validation failures

pub mod error;
pub mod jwt;
pub mod password;
pub mod session;

pub use error::TokenError;
pub use jwt::{Claims, JwtDecoder, JwtEncoder, TokenKind};
pub use password::PasswordHasher;
pub use session::{SessionAuthority, SessionRecord, SessionStore, TokenPair};
