//! Identifier types.
//!
//! [`Identity`] is the stable, derived identifier of an authenticated
//! principal; it keys both the session map and the connection registry.
//! The UUID newtypes distinguish individual connections and tokens.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Prefix of every identity derived from an email address.
const IDENTITY_PREFIX: &str = "user_";

/// Stable identifier of an authenticated principal (e.g. `user_1234…`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive the identity of a user from their email address.
    ///
    /// The identity is `user_` followed by the big-endian `u64` formed
    /// from the first eight bytes of `SHA-256(email)`, so the same email
    /// always yields the same identity.
    pub fn from_email(email: &str) -> Self {
        let digest = Sha256::digest(email.as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        Self(format!("{IDENTITY_PREFIX}{}", u64::from_be_bytes(head)))
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "sqlx")]
impl sqlx::Type<sqlx::Postgres> for Identity {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

#[cfg(feature = "sqlx")]
impl<'q> sqlx::Encode<'q, sqlx::Postgres> for Identity {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(feature = "sqlx")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Identity {
    fn decode(
        value: <sqlx::Postgres as sqlx::Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        <String as sqlx::Decode<'r, sqlx::Postgres>>::decode(value).map(Self)
    }
}

/// Macro to define a newtype ID wrapper around `Uuid`.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Return the inner UUID value.
            pub fn into_uuid(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

define_id!(
    /// Unique identifier of one streaming connection. Distinguishes a
    /// replaced connection from the one currently registered for the same
    /// identity.
    ConnectionId
);

define_id!(
    /// Unique identifier embedded in every issued token (`jti`).
    TokenId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_from_email_is_stable() {
        let a = Identity::from_email("ada@example.com");
        let b = Identity::from_email("ada@example.com");
        assert_eq!(a, b);
        assert!(a.as_str().starts_with("user_"));
        assert!(a.as_str()["user_".len()..].parse::<u64>().is_ok());
    }

    #[test]
    fn test_identity_differs_per_email() {
        assert_ne!(
            Identity::from_email("ada@example.com"),
            Identity::from_email("grace@example.com")
        );
    }

    #[test]
    fn test_identity_serializes_transparently() {
        let id = Identity::new("user_42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"user_42\"");
        assert_eq!(id.to_string(), "user_42");
    }

    #[test]
    fn test_connection_ids_are_unique() {
        assert_ne!(ConnectionId::new(), ConnectionId::new());
    }

    #[test]
    fn test_token_id_parse() {
        let uuid = Uuid::new_v4();
        let id: TokenId = uuid.to_string().parse().unwrap();
        assert_eq!(id.into_uuid(), uuid);
    }
}
