//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{Email, NewUser, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user store adapters.
    pub enum UserStoreError {
        /// Store connection could not be established.
        Connection { message: String } => "user store connection failed: {message}",
        /// Another user already owns this email, compared case-insensitively.
        DuplicateEmail { email: String } => "a user with email {email} already exists",
        /// Stored rows violate an invariant the schema is expected to enforce.
        DataIntegrity { message: String } => "user store data integrity violated: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user store query failed: {message}",
    }
}

/// Store owning the `users` table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user stamped with the current time and return it with
    /// its generated id.
    async fn create_user(&self, candidate: &NewUser) -> Result<User, UserStoreError>;

    /// Fetch the user whose email matches `email`, ignoring case.
    ///
    /// Absence is `Ok(None)`. More than one match is a
    /// [`UserStoreError::DataIntegrity`] failure.
    async fn get_user_by_email(&self, email: &Email) -> Result<Option<User>, UserStoreError>;
}

/// Fixture store for callers that do not exercise persistence.
///
/// Lookups always miss; creation echoes the candidate back with id `1`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserStore;

#[async_trait]
impl UserStore for FixtureUserStore {
    async fn create_user(&self, candidate: &NewUser) -> Result<User, UserStoreError> {
        Ok(User::new(
            UserId::new(1),
            candidate.name().clone(),
            candidate.email().clone(),
        ))
    }

    async fn get_user_by_email(&self, _email: &Email) -> Result<Option<User>, UserStoreError> {
        Ok(None)
    }
}
