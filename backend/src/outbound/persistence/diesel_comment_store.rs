//! PostgreSQL-backed [`CommentStore`] implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{CommentStore, CommentStoreError};
use crate::domain::{Comment, CommentBody, CommentId, Page, PostId, VoteSummary};

use super::diesel_helpers::{DbFailure, classify};
use super::models::CommentRow;
use super::pool::{DbPool, PoolError};
use super::schema::comments;

/// Diesel-backed implementation of the [`CommentStore`] port.
#[derive(Clone)]
pub struct DieselCommentStore {
    pool: DbPool,
}

impl DieselCommentStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CommentStoreError {
    CommentStoreError::connection(error.to_string())
}

fn map_insert_error(
    error: diesel::result::Error,
    post: &Uuid,
    author: &Uuid,
) -> CommentStoreError {
    match classify(&error) {
        DbFailure::UniqueViolation => {
            CommentStoreError::duplicate_comment(post.to_string(), author.to_string())
        }
        DbFailure::Connection => CommentStoreError::connection("database connection error"),
        DbFailure::NotFound | DbFailure::Other => CommentStoreError::query("database error"),
    }
}

fn map_plain_error(error: diesel::result::Error) -> CommentStoreError {
    match classify(&error) {
        DbFailure::Connection => CommentStoreError::connection("database connection error"),
        _ => CommentStoreError::query("database error"),
    }
}

fn row_to_comment(row: CommentRow) -> Result<Comment, CommentStoreError> {
    row.into_comment()
        .map_err(|error| CommentStoreError::query(error.to_string()))
}

#[async_trait]
impl CommentStore for DieselCommentStore {
    async fn insert(&self, comment: &Comment) -> Result<(), CommentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(comments::table)
            .values(CommentRow::from_comment(comment))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| {
                map_insert_error(error, comment.post.as_uuid(), comment.author.as_uuid())
            })
    }

    async fn find_by_id(&self, id: &CommentId) -> Result<Option<Comment>, CommentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<CommentRow> = comments::table
            .find(id.as_uuid())
            .select(CommentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_plain_error)?;

        row.map(row_to_comment).transpose()
    }

    async fn list_for_post(
        &self,
        post: &PostId,
        page: Page,
    ) -> Result<Vec<Comment>, CommentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<CommentRow> = comments::table
            .filter(comments::post_id.eq(post.as_uuid()))
            .order(comments::created_at.desc())
            .offset(page.offset() as i64)
            .limit(i64::from(page.size()))
            .select(CommentRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_plain_error)?;

        rows.into_iter().map(row_to_comment).collect()
    }

    async fn count_for_post(&self, post: &PostId) -> Result<u64, CommentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let count: i64 = comments::table
            .filter(comments::post_id.eq(post.as_uuid()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_plain_error)?;
        Ok(count.max(0) as u64)
    }

    async fn update_body(
        &self,
        id: &CommentId,
        body: &CommentBody,
    ) -> Result<bool, CommentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(comments::table.find(id.as_uuid()))
            .set(comments::body.eq(body.as_ref()))
            .execute(&mut conn)
            .await
            .map_err(map_plain_error)?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: &CommentId) -> Result<bool, CommentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = diesel::delete(comments::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_plain_error)?;
        Ok(removed > 0)
    }

    async fn write_vote_summary(
        &self,
        id: &CommentId,
        summary: &VoteSummary,
    ) -> Result<(), CommentStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::update(comments::table.find(id.as_uuid()))
            .set((
                comments::likes.eq(summary.likes as i64),
                comments::dislikes.eq(summary.dislikes as i64),
                comments::total_votes.eq(summary.total_votes as i64),
                comments::like_percentage.eq(summary.like_percentage),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_plain_error)
    }
}
