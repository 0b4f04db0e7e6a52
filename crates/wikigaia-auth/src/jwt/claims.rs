//! Identity token claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wikigaia_core::types::UserId;
use wikigaia_entity::user::UserRole;

/// Claims carried by an identity-provider token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user ID.
    pub sub: UserId,
    /// Email address, if the provider includes it.
    #[serde(default)]
    pub email: Option<String>,
    /// Role; tokens without one are regular users.
    #[serde(default, rename = "user_role")]
    pub role: UserRole,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    /// Returns the user ID from the subject claim.
    pub fn user_id(&self) -> UserId {
        self.sub
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}
