//! Driving ports for vote use-cases.

use async_trait::async_trait;

use crate::domain::access::Actor;
use crate::domain::error::DomainError;
use crate::domain::ids::VoteId;
use crate::domain::pagination::Page;
use crate::domain::vote::{TargetRef, VoteDirection, VoteEdge};

/// Payload for casting or re-casting a vote on a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastVote {
    /// The post or comment being voted on.
    pub target: TargetRef,
    /// The chosen direction.
    pub direction: VoteDirection,
}

/// Domain use-case port for vote mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoteCommand: Send + Sync {
    /// Upsert the actor's vote on a target and recompute its summary.
    async fn cast(&self, actor: &Actor, request: CastVote) -> Result<VoteEdge, DomainError>;

    /// Change an existing vote's direction (owner or admin only).
    async fn change(
        &self,
        actor: &Actor,
        id: &VoteId,
        direction: VoteDirection,
    ) -> Result<VoteEdge, DomainError>;

    /// Remove a vote edge entirely (owner or admin only).
    async fn retract(&self, actor: &Actor, id: &VoteId) -> Result<(), DomainError>;
}

/// Domain use-case port for vote reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoteQuery: Send + Sync {
    /// Fetch a vote edge by identifier.
    async fn get(&self, id: &VoteId) -> Result<VoteEdge, DomainError>;

    /// Page through the votes on a target.
    async fn list_for_target(
        &self,
        target: &TargetRef,
        page: Page,
    ) -> Result<Vec<VoteEdge>, DomainError>;
}

/// Fixture command that echoes casts and refuses everything else.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureVoteCommand;

#[async_trait]
impl VoteCommand for FixtureVoteCommand {
    async fn cast(&self, actor: &Actor, request: CastVote) -> Result<VoteEdge, DomainError> {
        Ok(VoteEdge::new(actor.id, request.target, request.direction))
    }

    async fn change(
        &self,
        _actor: &Actor,
        _id: &VoteId,
        _direction: VoteDirection,
    ) -> Result<VoteEdge, DomainError> {
        Err(DomainError::not_found("no vote found with that ID"))
    }

    async fn retract(&self, _actor: &Actor, _id: &VoteId) -> Result<(), DomainError> {
        Err(DomainError::not_found("no vote found with that ID"))
    }
}

/// Fixture query that reports no votes.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureVoteQuery;

#[async_trait]
impl VoteQuery for FixtureVoteQuery {
    async fn get(&self, _id: &VoteId) -> Result<VoteEdge, DomainError> {
        Err(DomainError::not_found("no vote found with that ID"))
    }

    async fn list_for_target(
        &self,
        _target: &TargetRef,
        _page: Page,
    ) -> Result<Vec<VoteEdge>, DomainError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ids::{PostId, UserId};
    use crate::domain::user::Role;

    #[tokio::test]
    async fn fixture_command_echoes_the_cast() {
        let command = FixtureVoteCommand;
        let actor = Actor::new(UserId::random(), Role::User);
        let request = CastVote {
            target: TargetRef::Post(PostId::random()),
            direction: VoteDirection::Up,
        };
        let edge = command.cast(&actor, request).await.expect("fixture cast");
        assert_eq!(edge.user, actor.id);
        assert_eq!(edge.direction, VoteDirection::Up);
    }
}
