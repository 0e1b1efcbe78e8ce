//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of the store ports backed
//! by PostgreSQL via Diesel, with async support through `diesel-async` and
//! `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: stores only translate between Diesel rows and domain
//!   types.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Explicit collaborators**: every store receives its [`DbPool`] at
//!   construction; nothing is resolved globally.
//! - **Strongly typed errors**: Diesel and pool failures map to the port's
//!   error enum.
//!
//! # Example
//!
//! ```ignore
//! use blogstore::outbound::persistence::{DbPool, DieselPostStore, PoolConfig};
//!
//! let config = PoolConfig::new("postgres://localhost/blog");
//! let pool = DbPool::new(config).await?;
//! let posts = DieselPostStore::new(pool);
//! ```

mod diesel_error_mapping;
mod diesel_post_store;
mod diesel_user_store;
mod models;
mod pool;
mod schema;

pub use diesel_post_store::DieselPostStore;
pub use diesel_user_store::DieselUserStore;
pub use pool::{DbPool, PoolConfig, PoolError};
