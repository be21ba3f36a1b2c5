//! Post use-cases.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::access::Actor;
use crate::domain::error::DomainError;
use crate::domain::ids::PostId;
use crate::domain::pagination::Page;
use crate::domain::ports::{
    NewPost, PostCommand, PostPatch, PostQuery, PostStore, PostStoreError,
};
use crate::domain::post::Post;

/// Post service implementing the driving ports.
#[derive(Clone)]
pub struct PostService<P> {
    posts: Arc<P>,
}

impl<P> PostService<P> {
    /// Create a new service over the given store.
    pub fn new(posts: Arc<P>) -> Self {
        Self { posts }
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

impl<P> PostService<P>
where
    P: PostStore,
{
    /// Resolve a post and authorise the actor against its owner.
    async fn resolve_owned_post(&self, actor: &Actor, id: &PostId) -> Result<Post, DomainError> {
        let post = self
            .posts
            .find_by_id(id)
            .await
            .map_err(map_post_error)?
            .ok_or_else(|| DomainError::not_found("no post found with that ID"))?;
        actor.authorize_owner(Some(&post.author))?;
        Ok(post)
    }
}

#[async_trait]
impl<P> PostCommand for PostService<P>
where
    P: PostStore,
{
    async fn create(&self, actor: &Actor, new_post: NewPost) -> Result<Post, DomainError> {
        let post = Post::new(actor.id, new_post.title, new_post.content);
        self.posts.insert(&post).await.map_err(map_post_error)?;
        Ok(post)
    }

    async fn update(
        &self,
        actor: &Actor,
        id: &PostId,
        patch: PostPatch,
    ) -> Result<Post, DomainError> {
        let snapshot = self.resolve_owned_post(actor, id).await?;

        let matched = self
            .posts
            .update_fields(id, &patch)
            .await
            .map_err(map_post_error)?;
        if !matched {
            return Err(DomainError::not_found("no post found with that ID"));
        }

        Ok(Post {
            title: patch.title.unwrap_or(snapshot.title),
            content: patch.content.unwrap_or(snapshot.content),
            ..snapshot
        })
    }

    async fn delete(&self, actor: &Actor, id: &PostId) -> Result<(), DomainError> {
        self.resolve_owned_post(actor, id).await?;

        let removed = self.posts.delete(id).await.map_err(map_post_error)?;
        if !removed {
            return Err(DomainError::not_found("no post found with that ID"));
        }
        Ok(())
    }
}

#[async_trait]
impl<P> PostQuery for PostService<P>
where
    P: PostStore,
{
    async fn get(&self, id: &PostId) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await
            .map_err(map_post_error)?
            .ok_or_else(|| DomainError::not_found("no post found with that ID"))
    }

    async fn list(&self, page: Page) -> Result<Vec<Post>, DomainError> {
        self.posts.list(page).await.map_err(map_post_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ids::UserId;
    use crate::domain::ports::MockPostStore;
    use crate::domain::post::{PostContent, PostTitle};
    use crate::domain::user::Role;

    fn stub_post(author: UserId) -> Post {
        Post::new(
            author,
            PostTitle::new("Original title").expect("valid title"),
            PostContent::new("body").expect("valid content"),
        )
    }

    #[tokio::test]
    async fn create_assigns_ownership_to_the_actor() {
        let actor = Actor::new(UserId::random(), Role::User);
        let mut posts = MockPostStore::new();
        posts.expect_insert().times(1).return_once(|_| Ok(()));

        let service = PostService::new(Arc::new(posts));
        let post = service
            .create(
                &actor,
                NewPost {
                    title: PostTitle::new("Hello").expect("valid title"),
                    content: PostContent::default(),
                },
            )
            .await
            .expect("create succeeds");
        assert_eq!(post.author, actor.id);
    }

    #[tokio::test]
    async fn update_merges_the_patch_over_the_snapshot() {
        let actor = Actor::new(UserId::random(), Role::User);
        let snapshot = stub_post(actor.id);
        let post_id = snapshot.id;

        let mut posts = MockPostStore::new();
        posts
            .expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(snapshot)));
        posts
            .expect_update_fields()
            .times(1)
            .return_once(|_, _| Ok(true));

        let service = PostService::new(Arc::new(posts));
        let updated = service
            .update(
                &actor,
                &post_id,
                PostPatch {
                    title: Some(PostTitle::new("New title").expect("valid title")),
                    content: None,
                },
            )
            .await
            .expect("update succeeds");
        assert_eq!(updated.title.as_ref(), "New title");
        assert_eq!(updated.content.as_ref(), "body");
    }

    #[tokio::test]
    async fn stranger_update_is_refused_before_any_write() {
        let actor = Actor::new(UserId::random(), Role::User);
        let snapshot = stub_post(UserId::random());
        let post_id = snapshot.id;

        let mut posts = MockPostStore::new();
        posts
            .expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(snapshot)));
        posts.expect_update_fields().times(0);

        let service = PostService::new(Arc::new(posts));
        let err = service
            .update(&actor, &post_id, PostPatch::default())
            .await
            .expect_err("stranger must be refused");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn admin_may_delete_any_post() {
        let admin = Actor::new(UserId::random(), Role::Admin);
        let snapshot = stub_post(UserId::random());
        let post_id = snapshot.id;

        let mut posts = MockPostStore::new();
        posts
            .expect_find_by_id()
            .times(1)
            .return_once(move |_| Ok(Some(snapshot)));
        posts.expect_delete().times(1).return_once(|_| Ok(true));

        let service = PostService::new(Arc::new(posts));
        service
            .delete(&admin, &post_id)
            .await
            .expect("admin delete succeeds");
    }

    #[tokio::test]
    async fn missing_post_is_not_found() {
        let actor = Actor::new(UserId::random(), Role::User);
        let mut posts = MockPostStore::new();
        posts.expect_find_by_id().times(1).return_once(|_| Ok(None));

        let service = PostService::new(Arc::new(posts));
        let err = service
            .delete(&actor, &PostId::random())
            .await
            .expect_err("missing post must fail");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
