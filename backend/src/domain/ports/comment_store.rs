//! Port for comment persistence.

use async_trait::async_trait;

use crate::domain::comment::{Comment, CommentBody};
use crate::domain::ids::{CommentId, PostId};
use crate::domain::pagination::Page;
use crate::domain::vote_summary::VoteSummary;

use super::define_port_error;

define_port_error! {
    /// Errors raised by comment store adapters.
    pub enum CommentStoreError {
        /// Store connection could not be established.
        Connection { message: String } =>
            "comment store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "comment store query failed: {message}",
        /// The (post, author) uniqueness constraint was violated.
        DuplicateComment { post: String, author: String } =>
            "user {author} already commented on post {post}",
    }
}

/// Port for comment storage and retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Persist a new comment.
    async fn insert(&self, comment: &Comment) -> Result<(), CommentStoreError>;

    /// Fetch a comment by identifier.
    async fn find_by_id(&self, id: &CommentId) -> Result<Option<Comment>, CommentStoreError>;

    /// Page through a post's comments, newest first.
    async fn list_for_post(
        &self,
        post: &PostId,
        page: Page,
    ) -> Result<Vec<Comment>, CommentStoreError>;

    /// Number of comments currently stored for a post.
    async fn count_for_post(&self, post: &PostId) -> Result<u64, CommentStoreError>;

    /// Filter-style body update. Returns `true` if a comment matched.
    async fn update_body(&self, id: &CommentId, body: &CommentBody)
    -> Result<bool, CommentStoreError>;

    /// Filter-style removal. Returns `true` if a comment was removed.
    async fn delete(&self, id: &CommentId) -> Result<bool, CommentStoreError>;

    /// Write the recomputed vote summary onto a comment. Writing to a
    /// comment that no longer exists is a no-op, not an error.
    async fn write_vote_summary(
        &self,
        id: &CommentId,
        summary: &VoteSummary,
    ) -> Result<(), CommentStoreError>;
}

/// Fixture implementation for tests that do not exercise comment storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCommentStore;

#[async_trait]
impl CommentStore for FixtureCommentStore {
    async fn insert(&self, _comment: &Comment) -> Result<(), CommentStoreError> {
        Ok(())
    }

    async fn find_by_id(&self, _id: &CommentId) -> Result<Option<Comment>, CommentStoreError> {
        Ok(None)
    }

    async fn list_for_post(
        &self,
        _post: &PostId,
        _page: Page,
    ) -> Result<Vec<Comment>, CommentStoreError> {
        Ok(Vec::new())
    }

    async fn count_for_post(&self, _post: &PostId) -> Result<u64, CommentStoreError> {
        Ok(0)
    }

    async fn update_body(
        &self,
        _id: &CommentId,
        _body: &CommentBody,
    ) -> Result<bool, CommentStoreError> {
        Ok(false)
    }

    async fn delete(&self, _id: &CommentId) -> Result<bool, CommentStoreError> {
        Ok(false)
    }

    async fn write_vote_summary(
        &self,
        _id: &CommentId,
        _summary: &VoteSummary,
    ) -> Result<(), CommentStoreError> {
        Ok(())
    }
}
