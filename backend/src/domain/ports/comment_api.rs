//! Driving ports for comment use-cases.

use async_trait::async_trait;

use crate::domain::access::Actor;
use crate::domain::comment::{Comment, CommentBody};
use crate::domain::error::DomainError;
use crate::domain::ids::{CommentId, PostId};
use crate::domain::pagination::Page;

/// Payload for commenting on a post.
#[derive(Debug, Clone)]
pub struct NewComment {
    /// The post being commented on.
    pub post: PostId,
    /// Comment text.
    pub body: CommentBody,
}

/// Domain use-case port for comment mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentCommand: Send + Sync {
    /// Comment on a post, then refresh the post's comment count.
    async fn create(&self, actor: &Actor, new_comment: NewComment)
    -> Result<Comment, DomainError>;

    /// Edit a comment (owner or admin only).
    async fn update(
        &self,
        actor: &Actor,
        id: &CommentId,
        body: CommentBody,
    ) -> Result<Comment, DomainError>;

    /// Delete a comment (owner or admin only), then refresh the post's
    /// comment count.
    async fn delete(&self, actor: &Actor, id: &CommentId) -> Result<(), DomainError>;
}

/// Domain use-case port for comment reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentQuery: Send + Sync {
    /// Fetch a comment by identifier.
    async fn get(&self, id: &CommentId) -> Result<Comment, DomainError>;

    /// Page through a post's comments, newest first.
    async fn list_for_post(&self, post: &PostId, page: Page)
    -> Result<Vec<Comment>, DomainError>;
}

/// Fixture command that echoes creations and refuses edits.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCommentCommand;

#[async_trait]
impl CommentCommand for FixtureCommentCommand {
    async fn create(
        &self,
        actor: &Actor,
        new_comment: NewComment,
    ) -> Result<Comment, DomainError> {
        Ok(Comment::new(actor.id, new_comment.post, new_comment.body))
    }

    async fn update(
        &self,
        _actor: &Actor,
        _id: &CommentId,
        _body: CommentBody,
    ) -> Result<Comment, DomainError> {
        Err(DomainError::not_found("no comment found with that ID"))
    }

    async fn delete(&self, _actor: &Actor, _id: &CommentId) -> Result<(), DomainError> {
        Err(DomainError::not_found("no comment found with that ID"))
    }
}

/// Fixture query that reports no comments.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCommentQuery;

#[async_trait]
impl CommentQuery for FixtureCommentQuery {
    async fn get(&self, _id: &CommentId) -> Result<Comment, DomainError> {
        Err(DomainError::not_found("no comment found with that ID"))
    }

    async fn list_for_post(
        &self,
        _post: &PostId,
        _page: Page,
    ) -> Result<Vec<Comment>, DomainError> {
        Ok(Vec::new())
    }
}
