//! Store bundle injected into the actix application.
//!
//! The hosting application builds the stores once and registers this state
//! with `actix_web::web::Data`; request handlers only see the port traits.

use std::sync::Arc;

use crate::domain::ports::{FixturePostStore, FixtureUserStore, PostStore, UserStore};

/// Dependency bundle shared by every worker.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub posts: Arc<dyn PostStore>,
}

impl AppState {
    /// Bundle the given store implementations.
    pub fn new(users: Arc<dyn UserStore>, posts: Arc<dyn PostStore>) -> Self {
        Self { users, posts }
    }

    /// State backed by fixture stores that never touch a database.
    pub fn fixtures() -> Self {
        Self::new(Arc::new(FixtureUserStore), Arc::new(FixturePostStore))
    }
}
