//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Registration request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name.
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    /// Email address; the user's identity is derived from it.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Plaintext password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    /// Initial online flag.
    #[serde(default)]
    pub online: bool,
    /// Initial file references.
    #[serde(default)]
    pub files: Vec<String>,
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address.
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token refresh request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RefreshRequest {
    /// Refresh token.
    #[validate(length(min = 1, message = "Missing refresh token"))]
    pub refresh_token: String,
}

/// Update of the caller's own profile.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateUserRequest {
    /// Display name.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Email address.
    #[validate(email)]
    pub email: String,
    /// Online flag.
    #[serde(default)]
    pub online: bool,
    /// File references.
    #[serde(default)]
    pub files: Vec<String>,
}

/// Password change request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    /// Current password.
    #[validate(length(min = 1))]
    pub current_password: String,
    /// New password.
    #[validate(length(min = 1))]
    pub new_password: String,
}

/// Message pushed to connected clients.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MessageRequest {
    /// Message body.
    #[validate(length(min = 1, max = 4096))]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_requires_valid_email() {
        let req = RegisterRequest {
            name: "ada".to_string(),
            email: "not-an-email".to_string(),
            password: "pw".to_string(),
            online: false,
            files: Vec::new(),
        };
        assert!(req.validate().is_err());

        let req = RegisterRequest {
            email: "ada@example.com".to_string(),
            ..req
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_register_defaults() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"name":"ada","email":"ada@example.com","password":"pw"}"#,
        )
        .unwrap();
        assert!(!req.online);
        assert!(req.files.is_empty());
    }
}
