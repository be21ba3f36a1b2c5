//! Port for post persistence.
//!
//! The summary-writing methods are reserved for the recompute step; nothing
//! else may touch a post's derived fields.

use async_trait::async_trait;

use crate::domain::ids::PostId;
use crate::domain::pagination::Page;
use crate::domain::post::{Post, PostContent, PostTitle};
use crate::domain::vote_summary::VoteSummary;

use super::define_port_error;

define_port_error! {
    /// Errors raised by post store adapters.
    pub enum PostStoreError {
        /// Store connection could not be established.
        Connection { message: String } =>
            "post store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "post store query failed: {message}",
    }
}

/// Fields a post owner may change after publication.
#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    /// Replacement title, if any.
    pub title: Option<PostTitle>,
    /// Replacement content, if any.
    pub content: Option<PostContent>,
}

/// Port for post storage and retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Persist a new post.
    async fn insert(&self, post: &Post) -> Result<(), PostStoreError>;

    /// Fetch a post by identifier.
    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostStoreError>;

    /// Page through posts, newest first.
    async fn list(&self, page: Page) -> Result<Vec<Post>, PostStoreError>;

    /// Filter-style field update. Returns `true` if a post matched.
    async fn update_fields(&self, id: &PostId, patch: &PostPatch) -> Result<bool, PostStoreError>;

    /// Filter-style removal. Returns `true` if a post was removed.
    async fn delete(&self, id: &PostId) -> Result<bool, PostStoreError>;

    /// Write the recomputed vote summary onto a post. Writing to a post that
    /// no longer exists is a no-op, not an error.
    async fn write_vote_summary(
        &self,
        id: &PostId,
        summary: &VoteSummary,
    ) -> Result<(), PostStoreError>;

    /// Write the recomputed comment count onto a post; same no-op semantics
    /// for missing posts.
    async fn write_comment_count(&self, id: &PostId, count: u64) -> Result<(), PostStoreError>;
}

/// Fixture implementation for tests that do not exercise post storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePostStore;

#[async_trait]
impl PostStore for FixturePostStore {
    async fn insert(&self, _post: &Post) -> Result<(), PostStoreError> {
        Ok(())
    }

    async fn find_by_id(&self, _id: &PostId) -> Result<Option<Post>, PostStoreError> {
        Ok(None)
    }

    async fn list(&self, _page: Page) -> Result<Vec<Post>, PostStoreError> {
        Ok(Vec::new())
    }

    async fn update_fields(&self, _id: &PostId, _patch: &PostPatch) -> Result<bool, PostStoreError> {
        Ok(false)
    }

    async fn delete(&self, _id: &PostId) -> Result<bool, PostStoreError> {
        Ok(false)
    }

    async fn write_vote_summary(
        &self,
        _id: &PostId,
        _summary: &VoteSummary,
    ) -> Result<(), PostStoreError> {
        Ok(())
    }

    async fn write_comment_count(&self, _id: &PostId, _count: u64) -> Result<(), PostStoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ids::UserId;

    #[tokio::test]
    async fn fixture_store_accepts_writes_and_returns_nothing() {
        let store = FixturePostStore;
        let post = Post::new(
            UserId::random(),
            PostTitle::new("Title").expect("valid title"),
            PostContent::default(),
        );

        store.insert(&post).await.expect("fixture insert succeeds");
        assert!(
            store
                .find_by_id(&post.id)
                .await
                .expect("fixture lookup succeeds")
                .is_none()
        );
        store
            .write_vote_summary(&post.id, &VoteSummary::zero())
            .await
            .expect("fixture summary write succeeds");
    }
}
