//! Typed store adapters for users, posts and comments over PostgreSQL.

pub mod domain;
pub mod inbound;
pub mod outbound;
