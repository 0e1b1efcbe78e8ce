//! PostgreSQL-backed `PostStore` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use diesel_async::scoped_futures::ScopedFutureExt as _;

use crate::domain::ports::{PostStore, PostStoreError};
use crate::domain::{Comment, CommentId, Post, PostId, User};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{CommentRow, PostRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{comments, posts, users};

/// Diesel-backed implementation of the `PostStore` port.
#[derive(Clone)]
pub struct DieselPostStore {
    pool: DbPool,
}

impl DieselPostStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_failure(error: PoolError) -> PostStoreError {
    map_pool_error(error, PostStoreError::connection)
}

fn map_diesel_failure(error: diesel::result::Error) -> PostStoreError {
    map_diesel_error(error, PostStoreError::query, PostStoreError::connection)
}

fn row_to_comment(row: CommentRow) -> Comment {
    Comment {
        id: CommentId::new(row.id),
        name: row.name,
        content: row.content,
        created_at: row.created_at,
        // Unedited comments report their creation time.
        updated_at: row.updated_at.unwrap_or(row.created_at),
    }
}

/// Assemble the aggregate from its joined parts.
fn assemble_post(
    post: PostRow,
    author: UserRow,
    comment_rows: Vec<CommentRow>,
) -> Result<Post, PostStoreError> {
    let author_id = author.id;
    let created_by = User::try_from_parts(author.id, author.name, author.email).map_err(|err| {
        PostStoreError::query(format!("invalid author row {author_id}: {err}"))
    })?;

    Ok(Post {
        id: PostId::new(post.id),
        title: post.title,
        content: post.content,
        created_by,
        comments: comment_rows.into_iter().map(row_to_comment).collect(),
    })
}

#[async_trait]
impl PostStore for DieselPostStore {
    async fn get_post_by_id(&self, id: PostId) -> Result<Option<Post>, PostStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_failure)?;
        let post_id = id.get();

        // Both reads see the snapshot taken by the first statement.
        let found = conn
            .build_transaction()
            .repeatable_read()
            .read_only()
            .run(|conn| {
                async move {
                    let head: Option<(PostRow, UserRow)> = posts::table
                        .inner_join(users::table)
                        .filter(posts::id.eq(post_id))
                        .select((PostRow::as_select(), UserRow::as_select()))
                        .first(conn)
                        .await
                        .optional()?;
                    let Some((post, author)) = head else {
                        return Ok(None);
                    };

                    let comment_rows: Vec<CommentRow> = comments::table
                        .filter(comments::post_id.eq(post_id))
                        .order(comments::id.asc())
                        .select(CommentRow::as_select())
                        .load(conn)
                        .await?;

                    Ok(Some((post, author, comment_rows)))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_failure)?;

        found
            .map(|(post, author, comment_rows)| assemble_post(post, author, comment_rows))
            .transpose()
    }
}
