//! Request context carrying the authenticated caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wikigaia_core::types::UserId;
use wikigaia_entity::user::UserRole;

/// Context for the current authenticated request.
///
/// Built from verified identity-token claims and passed into service
/// methods so that every operation knows who is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: UserId,
    /// Email from the token, if present.
    pub email: Option<String>,
    /// The user's role at the time the token was issued.
    pub role: UserRole,
    /// Correlation id of the HTTP request.
    pub request_id: Option<String>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: UserId, email: Option<String>, role: UserRole) -> Self {
        Self {
            user_id,
            email,
            role,
            request_id: None,
            request_time: Utc::now(),
        }
    }

    /// Attach the request's correlation id.
    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }

    /// Returns whether the current user is an admin.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
