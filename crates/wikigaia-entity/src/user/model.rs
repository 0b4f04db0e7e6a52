//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wikigaia_core::types::UserId;

use super::role::UserRole;

/// Local mirror of an identity-provider user.
///
/// Rows are upserted the first time a user writes (proposes or votes) so
/// that problems and votes can reference them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Identifier issued by the identity provider.
    pub id: UserId,
    /// Email address, if the token carried one.
    pub email: Option<String>,
    /// Role.
    pub role: UserRole,
    /// When the mirror row was created.
    pub created_at: DateTime<Utc>,
    /// When the mirror row was last refreshed.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if this user has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
