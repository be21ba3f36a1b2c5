//! Comment use-cases and the comment-count recompute trigger.
//!
//! A post's `comment_count` is derived the same way its vote summary is:
//! after every comment insert or delete the rows are recounted and the
//! result is written onto the post, never incremented in place. Deletion is
//! a filter-style mutation, so the affected comment is resolved first and
//! its post id stashed for the recount.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::access::Actor;
use crate::domain::comment::{Comment, CommentBody};
use crate::domain::error::DomainError;
use crate::domain::ids::{CommentId, PostId};
use crate::domain::pagination::Page;
use crate::domain::ports::{
    CommentCommand, CommentQuery, CommentStore, CommentStoreError, NewComment, PostStore,
    PostStoreError,
};

/// Comment service implementing the driving ports.
#[derive(Clone)]
pub struct CommentService<C, P> {
    comments: Arc<C>,
    posts: Arc<P>,
}

impl<C, P> CommentService<C, P> {
    /// Create a new service over the given stores.
    pub fn new(comments: Arc<C>, posts: Arc<P>) -> Self {
        Self { comments, posts }
    }
}

fn map_comment_error(error: CommentStoreError) -> DomainError {
    match error {
        CommentStoreError::Connection { message } => {
            DomainError::service_unavailable(format!("comment store unavailable: {message}"))
        }
        CommentStoreError::Query { message } => {
            DomainError::internal(format!("comment store error: {message}"))
        }
        CommentStoreError::DuplicateComment { post, author } => DomainError::conflict(format!(
            "user {author} already commented on post {post}"
        )),
    }
}

fn map_post_error(error: PostStoreError) -> DomainError {
    match error {
        PostStoreError::Connection { message } => {
            DomainError::service_unavailable(format!("post store unavailable: {message}"))
        }
        PostStoreError::Query { message } => {
            DomainError::internal(format!("post store error: {message}"))
        }
    }
}

impl<C, P> CommentService<C, P>
where
    C: CommentStore,
    P: PostStore,
{
    /// Recount a post's comments and write the result onto the post.
    pub async fn recompute(&self, post: &PostId) -> Result<(), DomainError> {
        let count = self
            .comments
            .count_for_post(post)
            .await
            .map_err(map_comment_error)?;
        debug!(post = %post, count, "recomputed comment count");
        self.posts
            .write_comment_count(post, count)
            .await
            .map_err(map_post_error)
    }

    /// Resolve a comment and authorise the actor against its owner.
    async fn resolve_owned_comment(
        &self,
        actor: &Actor,
        id: &CommentId,
    ) -> Result<Comment, DomainError> {
        let comment = self
            .comments
            .find_by_id(id)
            .await
            .map_err(map_comment_error)?
            .ok_or_else(|| DomainError::not_found("no comment found with that ID"))?;
        actor.authorize_owner(Some(&comment.author))?;
        Ok(comment)
    }
}

#[async_trait]
impl<C, P> CommentCommand for CommentService<C, P>
where
    C: CommentStore,
    P: PostStore,
{
    async fn create(
        &self,
        actor: &Actor,
        new_comment: NewComment,
    ) -> Result<Comment, DomainError> {
        self.posts
            .find_by_id(&new_comment.post)
            .await
            .map_err(map_post_error)?
            .ok_or_else(|| DomainError::not_found("no post found with that ID"))?;

        let comment = Comment::new(actor.id, new_comment.post, new_comment.body);
        self.comments
            .insert(&comment)
            .await
            .map_err(map_comment_error)?;

        self.recompute(&comment.post).await?;
        Ok(comment)
    }

    async fn update(
        &self,
        actor: &Actor,
        id: &CommentId,
        body: CommentBody,
    ) -> Result<Comment, DomainError> {
        let snapshot = self.resolve_owned_comment(actor, id).await?;

        let matched = self
            .comments
            .update_body(id, &body)
            .await
            .map_err(map_comment_error)?;
        if !matched {
            return Err(DomainError::not_found("no comment found with that ID"));
        }

        Ok(Comment { body, ..snapshot })
    }

    async fn delete(&self, actor: &Actor, id: &CommentId) -> Result<(), DomainError> {
        let snapshot = self.resolve_owned_comment(actor, id).await?;

        let removed = self.comments.delete(id).await.map_err(map_comment_error)?;
        if !removed {
            return Err(DomainError::not_found("no comment found with that ID"));
        }

        self.recompute(&snapshot.post).await
    }
}

#[async_trait]
impl<C, P> CommentQuery for CommentService<C, P>
where
    C: CommentStore,
    P: PostStore,
{
    async fn get(&self, id: &CommentId) -> Result<Comment, DomainError> {
        self.comments
            .find_by_id(id)
            .await
            .map_err(map_comment_error)?
            .ok_or_else(|| DomainError::not_found("no comment found with that ID"))
    }

    async fn list_for_post(
        &self,
        post: &PostId,
        page: Page,
    ) -> Result<Vec<Comment>, DomainError> {
        self.comments
            .list_for_post(post, page)
            .await
            .map_err(map_comment_error)
    }
}
