//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `backend/migrations`.
//! They drive Diesel's compile-time query validation.

diesel::table! {
    /// Registered users.
    ///
    /// `lower(email)` carries a unique index, so at most one row matches a
    /// case-insensitive email lookup.
    users (id) {
        /// Identity primary key.
        id -> Int8,
        /// Name shown for the user.
        name -> Varchar,
        /// Email as supplied at registration.
        email -> Varchar,
        /// Insert timestamp, set by the store.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Posts authored by users.
    posts (id) {
        id -> Int8,
        title -> Varchar,
        content -> Text,
        /// Author; foreign key to `users.id`.
        created_by -> Int8,
        created_at -> Timestamptz,
        updated_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Comments on posts. Deleted with their post.
    comments (id) {
        id -> Int8,
        /// Parent post; foreign key to `posts.id`.
        post_id -> Int8,
        name -> Varchar,
        content -> Text,
        created_at -> Timestamptz,
        /// Null until the comment is edited.
        updated_at -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(posts -> users (created_by));
diesel::joinable!(comments -> posts (post_id));

diesel::allow_tables_to_appear_in_same_query!(users, posts, comments);
