//! PostgreSQL-backed `UserStore` implementation using Diesel ORM.
//!
//! Email lookups compare `lower(email)` on both sides, matching the unique
//! index the schema declares on `lower(users.email)`.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel_async::RunQueryDsl;
use mockable::Clock;

use crate::domain::ports::{UserStore, UserStoreError};
use crate::domain::{Email, NewUser, User};

use super::diesel_error_mapping::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

diesel::define_sql_function! {
    /// PostgreSQL `lower(text)`.
    fn lower(value: Text) -> Text;
}

/// Diesel-backed implementation of the `UserStore` port.
#[derive(Clone)]
pub struct DieselUserStore {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselUserStore {
    /// Create a new store with the given connection pool and clock.
    ///
    /// The clock stamps `created_at` on insert.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let pool = DbPool::new(PoolConfig::new("postgres://localhost/blog")).await?;
    /// let store = DieselUserStore::new(pool, Arc::new(mockable::DefaultClock));
    /// ```
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

fn map_pool_failure(error: PoolError) -> UserStoreError {
    map_pool_error(error, UserStoreError::connection)
}

fn map_diesel_failure(error: diesel::result::Error) -> UserStoreError {
    map_diesel_error(error, UserStoreError::query, UserStoreError::connection)
}

fn map_insert_failure(error: diesel::result::Error, email: &Email) -> UserStoreError {
    if is_unique_violation(&error) {
        return UserStoreError::duplicate_email(email.as_ref());
    }
    map_diesel_failure(error)
}

/// Convert a database row to a domain user.
fn row_to_user(row: UserRow) -> Result<User, UserStoreError> {
    let UserRow { id, name, email } = row;
    User::try_from_parts(id, name, email)
        .map_err(|err| UserStoreError::query(format!("invalid user row {id}: {err}")))
}

/// Reduce the rows matched by an email lookup to at most one user.
fn single_match(rows: Vec<UserRow>, email: &Email) -> Result<Option<User>, UserStoreError> {
    let mut rows = rows.into_iter();
    let Some(first) = rows.next() else {
        return Ok(None);
    };
    if rows.next().is_some() {
        return Err(UserStoreError::data_integrity(format!(
            "multiple users match email {email}"
        )));
    }
    row_to_user(first).map(Some)
}

#[async_trait]
impl UserStore for DieselUserStore {
    async fn create_user(&self, candidate: &NewUser) -> Result<User, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_failure)?;

        let new_row = NewUserRow {
            name: candidate.name().as_ref(),
            email: candidate.email().as_ref(),
            created_at: self.clock.utc(),
        };

        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_insert_failure(err, candidate.email()))?;

        row_to_user(row)
    }

    async fn get_user_by_email(&self, email: &Email) -> Result<Option<User>, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_failure)?;

        // Two rows are enough to tell a unique match from a broken index.
        let rows: Vec<UserRow> = users::table
            .filter(lower(users::email).eq(lower(email.as_ref())))
            .order(users::id.asc())
            .limit(2)
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_failure)?;

        single_match(rows, email)
    }
}
