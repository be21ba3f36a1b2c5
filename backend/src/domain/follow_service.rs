//! Follow-graph use-cases and the follow-stats recompute trigger.
//!
//! A follow is written twice, once into each mirror collection, as two
//! independent upserts; no cross-collection transaction is assumed. The
//! very first upsert for a user can race with the store's own
//! read-after-write and surface as [`FollowStoreError::VanishedUpsert`].
//! That narrow creation race is self-healing: the service retries the same
//! upsert exactly once and only then propagates the failure.
//!
//! After every mutation both affected users get their follow stats
//! recomputed from the mirror lists.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::access::Actor;
use crate::domain::error::DomainError;
use crate::domain::follow::{FollowList, FollowStats};
use crate::domain::ids::UserId;
use crate::domain::ports::{
    FollowChange, FollowCommand, FollowGraphStore, FollowQuery, FollowStoreError, UserStore,
    UserStoreError,
};

/// Follow service implementing the driving ports.
#[derive(Clone)]
pub struct FollowService<F, U> {
    graph: Arc<F>,
    users: Arc<U>,
}

impl<F, U> FollowService<F, U> {
    /// Create a new service over the given stores.
    pub fn new(graph: Arc<F>, users: Arc<U>) -> Self {
        Self { graph, users }
    }
}

fn map_follow_error(error: FollowStoreError) -> DomainError {
    match error {
        FollowStoreError::Connection { message } => {
            DomainError::service_unavailable(format!("follow store unavailable: {message}"))
        }
        FollowStoreError::Query { message } => {
            DomainError::internal(format!("follow store error: {message}"))
        }
        FollowStoreError::VanishedUpsert { owner } => DomainError::internal(format!(
            "follow list for user {owner} kept vanishing mid-upsert"
        )),
    }
}

fn map_user_error(error: UserStoreError) -> DomainError {
    match error {
        UserStoreError::Connection { message } => {
            DomainError::service_unavailable(format!("user store unavailable: {message}"))
        }
        UserStoreError::Query { message } => {
            DomainError::internal(format!("user store error: {message}"))
        }
        UserStoreError::DuplicateEmail { email } => DomainError::internal(format!(
            "unexpected email conflict during follow update: {email}"
        )),
    }
}

/// Run an upsert, retrying exactly once when the freshly created document
/// vanished from the upsert's own read-back. Any second failure propagates.
async fn upsert_with_retry<Op, Fut>(op: Op) -> Result<FollowList, FollowStoreError>
where
    Op: Fn() -> Fut,
    Fut: Future<Output = Result<FollowList, FollowStoreError>>,
{
    match op().await {
        Err(FollowStoreError::VanishedUpsert { owner }) => {
            debug!(owner = %owner, "follow upsert raced its own creation; retrying once");
            op().await
        }
        other => other,
    }
}

impl<F, U> FollowService<F, U>
where
    F: FollowGraphStore,
    U: UserStore,
{
    /// Re-derive a user's follow stats from both mirror lists and write them
    /// onto the user record.
    pub async fn recompute(&self, user: &UserId) -> Result<(), DomainError> {
        let following = self
            .graph
            .following_of(user)
            .await
            .map_err(map_follow_error)?
            .map_or(0, |list| list.len());
        let followers = self
            .graph
            .followers_of(user)
            .await
            .map_err(map_follow_error)?
            .map_or(0, |list| list.len());

        self.users
            .write_follow_stats(
                user,
                FollowStats {
                    following,
                    followers,
                },
            )
            .await
            .map_err(map_user_error)
    }
}

#[async_trait]
impl<F, U> FollowCommand for FollowService<F, U>
where
    F: FollowGraphStore,
    U: UserStore,
{
    async fn follow(
        &self,
        actor: &Actor,
        followee: &UserId,
    ) -> Result<FollowChange, DomainError> {
        if actor.id == *followee {
            return Err(DomainError::unauthorized("you cannot follow yourself"));
        }

        let following = upsert_with_retry(|| self.graph.add_to_following(&actor.id, followee))
            .await
            .map_err(map_follow_error)?;
        // Keep followers in sync with following.
        let followers = upsert_with_retry(|| self.graph.add_to_followers(followee, &actor.id))
            .await
            .map_err(map_follow_error)?;

        self.recompute(&actor.id).await?;
        self.recompute(followee).await?;

        Ok(FollowChange {
            following,
            followers,
        })
    }

    async fn unfollow(&self, actor: &Actor, followee: &UserId) -> Result<(), DomainError> {
        self.graph
            .remove_from_following(&actor.id, followee)
            .await
            .map_err(map_follow_error)?;
        self.graph
            .remove_from_followers(followee, &actor.id)
            .await
            .map_err(map_follow_error)?;

        self.recompute(&actor.id).await?;
        self.recompute(followee).await
    }

    async fn remove_follower(&self, actor: &Actor, follower: &UserId) -> Result<(), DomainError> {
        self.graph
            .remove_from_followers(&actor.id, follower)
            .await
            .map_err(map_follow_error)?;
        self.graph
            .remove_from_following(follower, &actor.id)
            .await
            .map_err(map_follow_error)?;

        self.recompute(&actor.id).await?;
        self.recompute(follower).await
    }
}

#[async_trait]
impl<F, U> FollowQuery for FollowService<F, U>
where
    F: FollowGraphStore,
    U: UserStore,
{
    async fn following_of(&self, user: &UserId) -> Result<FollowList, DomainError> {
        Ok(self
            .graph
            .following_of(user)
            .await
            .map_err(map_follow_error)?
            .unwrap_or_else(|| FollowList::empty(*user)))
    }

    async fn followers_of(&self, user: &UserId) -> Result<FollowList, DomainError> {
        Ok(self
            .graph
            .followers_of(user)
            .await
            .map_err(map_follow_error)?
            .unwrap_or_else(|| FollowList::empty(*user)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::user::Role;
    use crate::test_support::InMemoryFollowGraphStore;
    use crate::test_support::InMemoryUserStore;

    fn service() -> (
        FollowService<InMemoryFollowGraphStore, InMemoryUserStore>,
        Arc<InMemoryFollowGraphStore>,
        Arc<InMemoryUserStore>,
    ) {
        let graph = Arc::new(InMemoryFollowGraphStore::default());
        let users = Arc::new(InMemoryUserStore::default());
        (
            FollowService::new(Arc::clone(&graph), Arc::clone(&users)),
            graph,
            users,
        )
    }

    fn seeded_actor(users: &InMemoryUserStore) -> Actor {
        let id = UserId::random();
        users.seed_account(id);
        Actor::new(id, Role::User)
    }

    fn seeded_user(users: &InMemoryUserStore) -> UserId {
        let id = UserId::random();
        users.seed_account(id);
        id
    }

    async fn assert_mirror_symmetry(graph: &InMemoryFollowGraphStore, users: &[UserId]) {
        for u in users {
            let following = graph
                .following_of(u)
                .await
                .expect("read following")
                .unwrap_or_else(|| FollowList::empty(*u));
            for v in &following.members {
                let followers = graph
                    .followers_of(v)
                    .await
                    .expect("read followers")
                    .unwrap_or_else(|| FollowList::empty(*v));
                assert!(
                    followers.contains(u),
                    "mirror out of sync: {u} follows {v} but is not in their followers"
                );
            }
        }
    }

    #[tokio::test]
    async fn self_follow_is_refused_without_any_write() {
        let (service, graph, users) = service();
        let actor = seeded_actor(&users);

        let err = service
            .follow(&actor, &actor.id)
            .await
            .expect_err("self follow must fail");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert!(
            graph
                .following_of(&actor.id)
                .await
                .expect("read following")
                .is_none()
        );
    }

    #[tokio::test]
    async fn follow_mirrors_the_edge_and_recomputes_both_users() {
        let (service, graph, users) = service();
        let actor = seeded_actor(&users);
        let followee = seeded_user(&users);

        let change = service
            .follow(&actor, &followee)
            .await
            .expect("follow succeeds");
        assert!(change.following.contains(&followee));
        assert!(change.followers.contains(&actor.id));
        assert_mirror_symmetry(&graph, &[actor.id, followee]).await;

        assert_eq!(
            users.follow_stats_of(&actor.id),
            Some(FollowStats {
                following: 1,
                followers: 0
            })
        );
        assert_eq!(
            users.follow_stats_of(&followee),
            Some(FollowStats {
                following: 0,
                followers: 1
            })
        );
    }

    #[tokio::test]
    async fn following_twice_is_a_no_op() {
        let (service, graph, users) = service();
        let actor = seeded_actor(&users);
        let followee = seeded_user(&users);

        service
            .follow(&actor, &followee)
            .await
            .expect("first follow succeeds");
        let change = service
            .follow(&actor, &followee)
            .await
            .expect("second follow succeeds");
        assert_eq!(change.following.members, vec![followee]);
        assert_mirror_symmetry(&graph, &[actor.id, followee]).await;
    }

    #[tokio::test]
    async fn first_follow_race_recovers_on_retry() {
        let (service, graph, users) = service();
        let actor = seeded_actor(&users);
        let followee = seeded_user(&users);

        // The store will report the freshly created list as missing once.
        graph.fail_next_upsert_for(actor.id);

        let change = service
            .follow(&actor, &followee)
            .await
            .expect("follow must self-heal via retry");
        assert!(change.following.contains(&followee));
        assert_mirror_symmetry(&graph, &[actor.id, followee]).await;
        assert_eq!(
            users.follow_stats_of(&actor.id),
            Some(FollowStats {
                following: 1,
                followers: 0
            })
        );
    }

    #[tokio::test]
    async fn persistent_race_propagates_after_one_retry() {
        let (service, graph, users) = service();
        let actor = seeded_actor(&users);
        let followee = seeded_user(&users);

        graph.fail_next_upsert_for(actor.id);
        graph.fail_next_upsert_for(actor.id);

        let err = service
            .follow(&actor, &followee)
            .await
            .expect_err("second failure must propagate");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[tokio::test]
    async fn unfollow_removes_both_sides_and_is_idempotent() {
        let (service, graph, users) = service();
        let actor = seeded_actor(&users);
        let followee = seeded_user(&users);

        service
            .follow(&actor, &followee)
            .await
            .expect("follow succeeds");
        service
            .unfollow(&actor, &followee)
            .await
            .expect("unfollow succeeds");
        assert_mirror_symmetry(&graph, &[actor.id, followee]).await;
        assert_eq!(
            users.follow_stats_of(&followee),
            Some(FollowStats::default())
        );

        // Unfollowing an absent edge is not an error.
        service
            .unfollow(&actor, &followee)
            .await
            .expect("repeat unfollow is idempotent");
    }

    #[tokio::test]
    async fn remove_follower_clears_the_inverse_direction() {
        let (service, graph, users) = service();
        let follower = seeded_actor(&users);
        let target = seeded_user(&users);

        service
            .follow(&follower, &target)
            .await
            .expect("follow succeeds");

        let target_actor = Actor::new(target, Role::User);
        service
            .remove_follower(&target_actor, &follower.id)
            .await
            .expect("remove follower succeeds");

        let following = service
            .following_of(&follower.id)
            .await
            .expect("read following");
        assert!(!following.contains(&target));
        assert_mirror_symmetry(&graph, &[follower.id, target]).await;
    }

    #[tokio::test]
    async fn mirror_symmetry_holds_across_random_operation_sequences() {
        let (service, graph, users) = service();
        let a = seeded_actor(&users);
        let b = seeded_actor(&users);
        let c = seeded_actor(&users);

        service.follow(&a, &b.id).await.expect("a follows b");
        service.follow(&b, &a.id).await.expect("b follows a");
        service.follow(&a, &c.id).await.expect("a follows c");
        service.follow(&c, &b.id).await.expect("c follows b");
        service.unfollow(&a, &b.id).await.expect("a unfollows b");
        service
            .remove_follower(&b, &c.id)
            .await
            .expect("b removes follower c");

        assert_mirror_symmetry(&graph, &[a.id, b.id, c.id]).await;
    }
}
