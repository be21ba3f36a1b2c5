//! Vote use-cases and the vote-summary recompute trigger.
//!
//! Every successful mutation of the vote collection is followed by exactly
//! one recompute of the affected parent's summary. Upserts know their target
//! from the written edge. The filter-style mutations (`change`, `retract`)
//! do not see the affected document, so the service resolves it *first*,
//! stashes its target, runs the mutation, and recomputes with the stashed
//! value. The stash travels as an explicit parameter, never as shared hook
//! state.
//!
//! Recompute runs only after the child mutation has committed. Concurrent
//! recomputes for the same target are not ordered against each other; the
//! summary is a cache and the edge rows stay authoritative.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::access::Actor;
use crate::domain::error::DomainError;
use crate::domain::ids::VoteId;
use crate::domain::pagination::Page;
use crate::domain::ports::{
    CastVote, CommentStore, CommentStoreError, PostStore, PostStoreError, VoteCommand, VoteEdgeStore,
    VoteQuery, VoteStoreError,
};
use crate::domain::vote::{TargetRef, VoteDirection, VoteEdge};
use crate::domain::vote_summary::VoteSummary;

/// Vote service implementing the driving ports.
#[derive(Clone)]
pub struct VoteService<V, P, C> {
    votes: Arc<V>,
    posts: Arc<P>,
    comments: Arc<C>,
}

impl<V, P, C> VoteService<V, P, C> {
    /// Create a new service over the given stores.
    pub fn new(votes: Arc<V>, posts: Arc<P>, comments: Arc<C>) -> Self {
        Self {
            votes,
            posts,
            comments,
        }
    }
}

fn map_vote_error(error: VoteStoreError) -> DomainError {
    match error {
        VoteStoreError::Connection { message } => {
            DomainError::service_unavailable(format!("vote store unavailable: {message}"))
        }
        VoteStoreError::Query { message } => {
            DomainError::internal(format!("vote store error: {message}"))
        }
        VoteStoreError::DuplicateEdge { user, target } => DomainError::conflict(format!(
            "user {user} has already voted on {target}"
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

impl<V, P, C> VoteService<V, P, C>
where
    V: VoteEdgeStore,
    P: PostStore,
    C: CommentStore,
{
    /// Re-derive the target's summary from every edge currently stored for
    /// it and write the result onto the parent.
    ///
    /// The result is always written, including the all-zero summary after
    /// the last edge disappears; stale values must never survive.
    pub async fn recompute(&self, target: &TargetRef) -> Result<(), DomainError> {
        let directions = self
            .votes
            .directions_for(target)
            .await
            .map_err(map_vote_error)?;
        let summary = VoteSummary::tally(directions.into_iter());
        debug!(%target, total_votes = summary.total_votes, "recomputed vote summary");

        match target {
            TargetRef::Post(id) => self
                .posts
                .write_vote_summary(id, &summary)
                .await
                .map_err(map_post_error),
            TargetRef::Comment(id) => self
                .comments
                .write_vote_summary(id, &summary)
                .await
                .map_err(map_comment_error),
        }
    }

    async fn ensure_target_exists(&self, target: &TargetRef) -> Result<(), DomainError> {
        match target {
            TargetRef::Post(id) => {
                self.posts
                    .find_by_id(id)
                    .await
                    .map_err(map_post_error)?
                    .ok_or_else(|| DomainError::not_found("no post found with that ID"))?;
            }
            TargetRef::Comment(id) => {
                self.comments
                    .find_by_id(id)
                    .await
                    .map_err(map_comment_error)?
                    .ok_or_else(|| DomainError::not_found("no comment found with that ID"))?;
            }
        }
        Ok(())
    }

    /// Snapshot step for the filter-style mutations: resolve the edge the
    /// mutation will affect and authorise the actor against its owner. The
    /// returned edge carries the target the post-mutation recompute needs.
    async fn resolve_owned_edge(
        &self,
        actor: &Actor,
        id: &VoteId,
    ) -> Result<VoteEdge, DomainError> {
        let edge = self
            .votes
            .find_by_id(id)
            .await
            .map_err(map_vote_error)?
            .ok_or_else(|| DomainError::not_found("no vote found with that ID"))?;
        actor.authorize_owner(Some(&edge.user))?;
        Ok(edge)
    }
}

#[async_trait]
impl<V, P, C> VoteCommand for VoteService<V, P, C>
where
    V: VoteEdgeStore,
    P: PostStore,
    C: CommentStore,
{
    async fn cast(&self, actor: &Actor, request: CastVote) -> Result<VoteEdge, DomainError> {
        self.ensure_target_exists(&request.target).await?;

        let edge = self
            .votes
            .upsert(&actor.id, &request.target, request.direction)
            .await
            .map_err(map_vote_error)?;
        self.recompute(&edge.target).await?;
        Ok(edge)
    }

    async fn change(
        &self,
        actor: &Actor,
        id: &VoteId,
        direction: VoteDirection,
    ) -> Result<VoteEdge, DomainError> {
        let snapshot = self.resolve_owned_edge(actor, id).await?;

        let matched = self
            .votes
            .update_direction(id, direction)
            .await
            .map_err(map_vote_error)?;
        if !matched {
            return Err(DomainError::not_found("no vote found with that ID"));
        }

        self.recompute(&snapshot.target).await?;
        Ok(VoteEdge {
            direction,
            ..snapshot
        })
    }

    async fn retract(&self, actor: &Actor, id: &VoteId) -> Result<(), DomainError> {
        let snapshot = self.resolve_owned_edge(actor, id).await?;

        let removed = self.votes.delete(id).await.map_err(map_vote_error)?;
        if !removed {
            return Err(DomainError::not_found("no vote found with that ID"));
        }

        self.recompute(&snapshot.target).await
    }
}

#[async_trait]
impl<V, P, C> VoteQuery for VoteService<V, P, C>
where
    V: VoteEdgeStore,
    P: PostStore,
    C: CommentStore,
{
    async fn get(&self, id: &VoteId) -> Result<VoteEdge, DomainError> {
        self.votes
            .find_by_id(id)
            .await
            .map_err(map_vote_error)?
            .ok_or_else(|| DomainError::not_found("no vote found with that ID"))
    }

    async fn list_for_target(
        &self,
        target: &TargetRef,
        page: Page,
    ) -> Result<Vec<VoteEdge>, DomainError> {
        self.votes
            .list_for_target(target, page)
            .await
            .map_err(map_vote_error)
    }
}
