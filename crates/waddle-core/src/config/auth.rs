//! Token signing configuration.

use serde::{Deserialize, Serialize};

/// Access/refresh credential configuration.
///
/// Both secrets are required; there is deliberately no default value, so
/// a missing secret deserializes to an empty string and is rejected when
/// the session authority is constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC-SHA256 secret for access tokens.
    #[serde(default)]
    pub access_secret: String,
    /// HMAC-SHA256 secret for refresh tokens.
    #[serde(default)]
    pub refresh_secret: String,
    /// Access token lifetime in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: i64,
    /// Refresh token lifetime in days.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_days: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secret: String::new(),
            refresh_secret: String::new(),
            access_ttl_minutes: default_access_ttl(),
            refresh_ttl_days: default_refresh_ttl(),
        }
    }
}

fn default_access_ttl() -> i64 {
    15
}

fn default_refresh_ttl() -> i64 {
    7
}
