//! Driving ports for post use-cases.

use async_trait::async_trait;

use crate::domain::access::Actor;
use crate::domain::error::DomainError;
use crate::domain::ids::PostId;
use crate::domain::pagination::Page;
use crate::domain::post::{Post, PostContent, PostTitle};

use super::post_store::PostPatch;

/// Payload for publishing a post.
#[derive(Debug, Clone)]
pub struct NewPost {
    /// Headline.
    pub title: PostTitle,
    /// Body text.
    pub content: PostContent,
}

/// Domain use-case port for post mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostCommand: Send + Sync {
    /// Publish a post owned by the actor.
    async fn create(&self, actor: &Actor, new_post: NewPost) -> Result<Post, DomainError>;

    /// Edit a post (owner or admin only).
    async fn update(&self, actor: &Actor, id: &PostId, patch: PostPatch)
    -> Result<Post, DomainError>;

    /// Delete a post (owner or admin only).
    async fn delete(&self, actor: &Actor, id: &PostId) -> Result<(), DomainError>;
}

/// Domain use-case port for post reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostQuery: Send + Sync {
    /// Fetch a post by identifier.
    async fn get(&self, id: &PostId) -> Result<Post, DomainError>;

    /// Page through posts, newest first.
    async fn list(&self, page: Page) -> Result<Vec<Post>, DomainError>;
}

/// Fixture command that echoes creations and refuses edits.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePostCommand;

#[async_trait]
impl PostCommand for FixturePostCommand {
    async fn create(&self, actor: &Actor, new_post: NewPost) -> Result<Post, DomainError> {
        Ok(Post::new(actor.id, new_post.title, new_post.content))
    }

    async fn update(
        &self,
        _actor: &Actor,
        _id: &PostId,
        _patch: PostPatch,
    ) -> Result<Post, DomainError> {
        Err(DomainError::not_found("no post found with that ID"))
    }

    async fn delete(&self, _actor: &Actor, _id: &PostId) -> Result<(), DomainError> {
        Err(DomainError::not_found("no post found with that ID"))
    }
}

/// Fixture query that reports no posts.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePostQuery;

#[async_trait]
impl PostQuery for FixturePostQuery {
    async fn get(&self, _id: &PostId) -> Result<Post, DomainError> {
        Err(DomainError::not_found("no post found with that ID"))
    }

    async fn list(&self, _page: Page) -> Result<Vec<Post>, DomainError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ids::UserId;
    use crate::domain::user::Role;

    #[tokio::test]
    async fn fixture_command_assigns_ownership_to_the_actor() {
        let command = FixturePostCommand;
        let actor = Actor::new(UserId::random(), Role::User);
        let post = command
            .create(
                &actor,
                NewPost {
                    title: PostTitle::new("Hello").expect("valid title"),
                    content: PostContent::default(),
                },
            )
            .await
            .expect("fixture create succeeds");
        assert_eq!(post.author, actor.id);
    }
}
