//! PostgreSQL-backed [`PostStore`] implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{PostPatch, PostStore, PostStoreError};
use crate::domain::{Page, Post, PostId, VoteSummary};

use super::diesel_helpers::{DbFailure, classify};
use super::models::PostRow;
use super::pool::{DbPool, PoolError};
use super::schema::posts;

/// Diesel-backed implementation of the [`PostStore`] port.
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

fn map_pool_error(error: PoolError) -> PostStoreError {
    PostStoreError::connection(error.to_string())
}

fn map_diesel_error(error: diesel::result::Error) -> PostStoreError {
    match classify(&error) {
        DbFailure::Connection => PostStoreError::connection("database connection error"),
        _ => PostStoreError::query("database error"),
    }
}

fn row_to_post(row: PostRow) -> Result<Post, PostStoreError> {
    row.into_post()
        .map_err(|error| PostStoreError::query(error.to_string()))
}

#[async_trait]
impl PostStore for DieselPostStore {
    async fn insert(&self, post: &Post) -> Result<(), PostStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(posts::table)
            .values(PostRow::from_post(post))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<PostRow> = posts::table
            .find(id.as_uuid())
            .select(PostRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_post).transpose()
    }

    async fn list(&self, page: Page) -> Result<Vec<Post>, PostStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<PostRow> = posts::table
            .order(posts::created_at.desc())
            .offset(page.offset() as i64)
            .limit(i64::from(page.size()))
            .select(PostRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_post).collect()
    }

    async fn update_fields(&self, id: &PostId, patch: &PostPatch) -> Result<bool, PostStoreError> {
        // Nothing to change still counts as a match on an existing row.
        if patch.title.is_none() && patch.content.is_none() {
            return Ok(self.find_by_id(id).await?.is_some());
        }

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let title = patch.title.as_ref().map(|title| title.as_ref().to_owned());
        let content = patch
            .content
            .as_ref()
            .map(|content| content.as_ref().to_owned());

        let updated = match (title, content) {
            (Some(title), Some(content)) => {
                diesel::update(posts::table.find(id.as_uuid()))
                    .set((posts::title.eq(title), posts::content.eq(content)))
                    .execute(&mut conn)
                    .await
            }
            (Some(title), None) => {
                diesel::update(posts::table.find(id.as_uuid()))
                    .set(posts::title.eq(title))
                    .execute(&mut conn)
                    .await
            }
            (None, Some(content)) => {
                diesel::update(posts::table.find(id.as_uuid()))
                    .set(posts::content.eq(content))
                    .execute(&mut conn)
                    .await
            }
            (None, None) => unreachable!("handled above"),
        }
        .map_err(map_diesel_error)?;

        Ok(updated > 0)
    }

    async fn delete(&self, id: &PostId) -> Result<bool, PostStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = diesel::delete(posts::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn write_vote_summary(
        &self,
        id: &PostId,
        summary: &VoteSummary,
    ) -> Result<(), PostStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Zero rows matched means the post vanished; the summary write is a
        // no-op by contract.
        diesel::update(posts::table.find(id.as_uuid()))
            .set((
                posts::likes.eq(summary.likes as i64),
                posts::dislikes.eq(summary.dislikes as i64),
                posts::total_votes.eq(summary.total_votes as i64),
                posts::like_percentage.eq(summary.like_percentage),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn write_comment_count(&self, id: &PostId, count: u64) -> Result<(), PostStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::update(posts::table.find(id.as_uuid()))
            .set(posts::comment_count.eq(count as i64))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
