//! Post aggregate and its comments.
//!
//! A [`Post`] is read-only: it is assembled from the post row, its author and
//! every comment keyed to it, and handed to the caller as one value.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::User;

/// Database identity of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(i64);

impl PostId {
    /// Wrap a raw identity column value.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Return the raw identity value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database identity of a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(i64);

impl CommentId {
    /// Wrap a raw identity column value.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Return the raw identity value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

/// Comment left on a post. Only ever reached through its parent [`Post`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Post together with its author and comments.
///
/// ## Invariants
/// - `comments` holds exactly the comments keyed to this post, ordered by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub created_by: User,
    pub comments: Vec<Comment>,
}
