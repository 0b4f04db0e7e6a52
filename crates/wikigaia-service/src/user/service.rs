//! Keeps the local `users` mirror in step with token claims.

use std::sync::Arc;

use wikigaia_core::result::AppResult;
use wikigaia_database::store::UserStore;
use wikigaia_entity::user::User;

use crate::context::RequestContext;

/// Mirrors identity-provider users into the store.
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Upsert the caller so that rows written on their behalf can reference
    /// them.
    pub async fn sync(&self, ctx: &RequestContext) -> AppResult<User> {
        self.users
            .upsert(ctx.user_id, ctx.email.as_deref(), ctx.role)
            .await
    }
}
