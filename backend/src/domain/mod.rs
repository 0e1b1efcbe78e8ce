//! Domain primitives and aggregates.
//!
//! Purpose: Define strongly typed entities used by the store ports and the
//! persistence adapters. Types are immutable once built and document their
//! invariants and serde contracts in each type's Rustdoc.
//!
//! Public surface:
//! - User, NewUser, UserId, UserName, Email: user identity and candidates.
//! - Post, Comment, PostId, CommentId: the read-only post aggregate.
//! - ports: store traits and their error types.

pub mod ports;
pub mod post;
pub mod user;

pub use self::post::{Comment, CommentId, Post, PostId};
pub use self::user::{Email, NewUser, User, UserId, UserName, UserValidationError};
