//! User entity model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use waddle_core::types::Identity;

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Identity derived from the email address at registration.
    pub id: Identity,
    /// Unique display name.
    pub name: String,
    /// Unique email address.
    pub email: String,
    /// Argon2 password hash. Never serialized into responses.
    #[serde(skip_serializing, default)]
    #[sqlx(rename = "password")]
    pub password_hash: String,
    /// Whether the user is flagged online.
    pub online: bool,
    /// File references attached to the user.
    pub files: Vec<String>,
    /// Creation time (seconds since epoch).
    pub created: i64,
    /// Last update time (seconds since epoch).
    pub updated: i64,
}

/// Data required to create a new user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Derived identity.
    pub id: Identity,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Initial online flag.
    pub online: bool,
    /// Initial file references.
    pub files: Vec<String>,
}

/// Data for updating an existing user's profile.
#[derive(Debug, Clone)]
pub struct UpdateUser {
    /// The user to update.
    pub id: Identity,
    /// New display name.
    pub name: String,
    /// New email address.
    pub email: String,
    /// New online flag.
    pub online: bool,
    /// New file references.
    pub files: Vec<String>,
}
