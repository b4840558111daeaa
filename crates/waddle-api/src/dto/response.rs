//! Response DTOs.

use serde::{Deserialize, Serialize};

use waddle_auth::TokenPair;
use waddle_core::types::Identity;
use waddle_entity::user::User;
use waddle_realtime::MetricsSnapshot;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Public view of a user. Carries no password material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    /// User identity.
    pub id: Identity,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Online flag.
    pub online: bool,
    /// File references.
    pub files: Vec<String>,
    /// Creation time (seconds since epoch).
    pub created: i64,
    /// Last update time (seconds since epoch).
    pub updated: i64,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            online: user.online,
            files: user.files,
            created: user.created,
            updated: user.updated,
        }
    }
}

/// Returned by register and login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Access token.
    pub access_token: String,
    /// Refresh token.
    pub refresh_token: String,
    /// The authenticated user.
    pub user: UserResponse,
}

impl AuthResponse {
    /// Pairs freshly stored tokens with the user they belong to.
    pub fn new(tokens: TokenPair, user: User) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            user: user.into(),
        }
    }
}

/// Returned by the refresh exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    /// New access token.
    pub access_token: String,
}

/// Generic message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message text.
    pub message: String,
}

impl MessageResponse {
    /// Wraps a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `GET /` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// API status line.
    pub api: String,
    /// Database reachability.
    pub db: String,
}

/// `GET /api/health` body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Database reachability.
    pub database: String,
    /// Currently connected WebSocket clients.
    pub ws_clients: usize,
    /// Identities with a live session.
    pub sessions: usize,
    /// Hub counters.
    pub realtime: MetricsSnapshot,
}
