//! Port for the mirrored follow-graph collections.
//!
//! Each mutation is an "update-if-exists else insert" against one side of
//! the mirror. Because the existence check and the insert are not atomic, a
//! first-ever upsert can race with itself: the adapter may fail to observe
//! the document it just created. That condition surfaces as the typed
//! [`FollowStoreError::VanishedUpsert`] variant so callers can apply a
//! bounded retry instead of matching on error strings.

use async_trait::async_trait;

use crate::domain::follow::FollowList;
use crate::domain::ids::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by follow graph store adapters.
    pub enum FollowStoreError {
        /// Store connection could not be established.
        Connection { message: String } =>
            "follow store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "follow store query failed: {message}",
        /// An upsert could not observe the document it should have created
        /// or updated. Transient; a single retry is expected to succeed.
        VanishedUpsert { owner: String } =>
            "follow list for user {owner} vanished mid-upsert",
    }
}

/// Port for follow graph storage.
///
/// # Mirror discipline
///
/// Adapters store the two directions independently; keeping them in
/// agreement is the calling service's job. Removals are idempotent: pulling
/// an absent member is not an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FollowGraphStore: Send + Sync {
    /// The users `owner` follows, or `None` if no list exists yet.
    async fn following_of(&self, owner: &UserId) -> Result<Option<FollowList>, FollowStoreError>;

    /// The users following `owner`, or `None` if no list exists yet.
    async fn followers_of(&self, owner: &UserId) -> Result<Option<FollowList>, FollowStoreError>;

    /// Add `member` to `owner`'s following list, creating the list if
    /// absent. Adding an existing member is a no-op. Returns the resulting
    /// list.
    async fn add_to_following(
        &self,
        owner: &UserId,
        member: &UserId,
    ) -> Result<FollowList, FollowStoreError>;

    /// Add `member` to `owner`'s followers list; same semantics as
    /// [`FollowGraphStore::add_to_following`].
    async fn add_to_followers(
        &self,
        owner: &UserId,
        member: &UserId,
    ) -> Result<FollowList, FollowStoreError>;

    /// Remove `member` from `owner`'s following list. Absence of the list or
    /// the member is not an error.
    async fn remove_from_following(
        &self,
        owner: &UserId,
        member: &UserId,
    ) -> Result<(), FollowStoreError>;

    /// Remove `member` from `owner`'s followers list; same idempotent
    /// semantics as [`FollowGraphStore::remove_from_following`].
    async fn remove_from_followers(
        &self,
        owner: &UserId,
        member: &UserId,
    ) -> Result<(), FollowStoreError>;
}

/// Fixture implementation for tests that do not exercise the follow graph.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureFollowGraphStore;

#[async_trait]
impl FollowGraphStore for FixtureFollowGraphStore {
    async fn following_of(&self, _owner: &UserId) -> Result<Option<FollowList>, FollowStoreError> {
        Ok(None)
    }

    async fn followers_of(&self, _owner: &UserId) -> Result<Option<FollowList>, FollowStoreError> {
        Ok(None)
    }

    async fn add_to_following(
        &self,
        owner: &UserId,
        member: &UserId,
    ) -> Result<FollowList, FollowStoreError> {
        Ok(FollowList {
            owner: *owner,
            members: vec![*member],
        })
    }

    async fn add_to_followers(
        &self,
        owner: &UserId,
        member: &UserId,
    ) -> Result<FollowList, FollowStoreError> {
        Ok(FollowList {
            owner: *owner,
            members: vec![*member],
        })
    }

    async fn remove_from_following(
        &self,
        _owner: &UserId,
        _member: &UserId,
    ) -> Result<(), FollowStoreError> {
        Ok(())
    }

    async fn remove_from_followers(
        &self,
        _owner: &UserId,
        _member: &UserId,
    ) -> Result<(), FollowStoreError> {
        Ok(())
    }
}
