//! Driving ports for follow-graph use-cases.

use async_trait::async_trait;

use crate::domain::access::Actor;
use crate::domain::error::DomainError;
use crate::domain::follow::FollowList;
use crate::domain::ids::UserId;

/// Both sides of the mirror after a follow mutation.
///
/// The membership lists are authoritative in the response; the denormalised
/// counts on the user records may lag by one recompute and front-ends should
/// rely on membership, not on the counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowChange {
    /// The actor's following list after the mutation.
    pub following: FollowList,
    /// The followee's followers list after the mutation.
    pub followers: FollowList,
}

/// Domain use-case port for follow mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FollowCommand: Send + Sync {
    /// Follow another user. Self-follows are refused before any write.
    async fn follow(&self, actor: &Actor, followee: &UserId)
    -> Result<FollowChange, DomainError>;

    /// Stop following another user; idempotent when no edge exists.
    async fn unfollow(&self, actor: &Actor, followee: &UserId) -> Result<(), DomainError>;

    /// Remove a user from the actor's own followers; idempotent.
    async fn remove_follower(&self, actor: &Actor, follower: &UserId) -> Result<(), DomainError>;
}

/// Domain use-case port for follow reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FollowQuery: Send + Sync {
    /// The users `user` follows; empty when no list exists yet.
    async fn following_of(&self, user: &UserId) -> Result<FollowList, DomainError>;

    /// The users following `user`; empty when no list exists yet.
    async fn followers_of(&self, user: &UserId) -> Result<FollowList, DomainError>;
}

/// Fixture command producing minimal mirrored lists.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureFollowCommand;

#[async_trait]
impl FollowCommand for FixtureFollowCommand {
    async fn follow(
        &self,
        actor: &Actor,
        followee: &UserId,
    ) -> Result<FollowChange, DomainError> {
        if actor.id == *followee {
            return Err(DomainError::unauthorized("you cannot follow yourself"));
        }
        Ok(FollowChange {
            following: FollowList {
                owner: actor.id,
                members: vec![*followee],
            },
            followers: FollowList {
                owner: *followee,
                members: vec![actor.id],
            },
        })
    }

    async fn unfollow(&self, _actor: &Actor, _followee: &UserId) -> Result<(), DomainError> {
        Ok(())
    }

    async fn remove_follower(&self, _actor: &Actor, _follower: &UserId) -> Result<(), DomainError> {
        Ok(())
    }
}

/// Fixture query reporting empty lists.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureFollowQuery;

#[async_trait]
impl FollowQuery for FixtureFollowQuery {
    async fn following_of(&self, user: &UserId) -> Result<FollowList, DomainError> {
        Ok(FollowList::empty(*user))
    }

    async fn followers_of(&self, user: &UserId) -> Result<FollowList, DomainError> {
        Ok(FollowList::empty(*user))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::user::Role;

    #[tokio::test]
    async fn fixture_command_rejects_self_follow() {
        let command = FixtureFollowCommand;
        let actor = Actor::new(UserId::random(), Role::User);
        let err = command
            .follow(&actor, &actor.id)
            .await
            .expect_err("self follow must fail");
        assert_eq!(err.code(), crate::domain::ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn fixture_command_mirrors_the_edge() {
        let command = FixtureFollowCommand;
        let actor = Actor::new(UserId::random(), Role::User);
        let followee = UserId::random();
        let change = command
            .follow(&actor, &followee)
            .await
            .expect("fixture follow succeeds");
        assert!(change.following.contains(&followee));
        assert!(change.followers.contains(&actor.id));
    }
}
