//! Port abstraction for post aggregate reads.
use async_trait::async_trait;

use crate::domain::{Post, PostId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by post store adapters.
    pub enum PostStoreError {
        /// Store connection could not be established.
        Connection { message: String } => "post store connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "post store query failed: {message}",
    }
}

/// Store owning the `posts` and `comments` tables.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Fetch a post with its author and every comment keyed to it.
    ///
    /// Either the whole aggregate is returned or nothing: absence is
    /// `Ok(None)` and a failure on any part is an error.
    async fn get_post_by_id(&self, id: PostId) -> Result<Option<Post>, PostStoreError>;
}

/// Fixture store for callers that do not exercise persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePostStore;

#[async_trait]
impl PostStore for FixturePostStore {
    async fn get_post_by_id(&self, _id: PostId) -> Result<Option<Post>, PostStoreError> {
        Ok(None)
    }
}
