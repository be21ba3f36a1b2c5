//! Port for vote edge persistence.
//!
//! The store exposes two distinct mutation shapes, mirroring the storage
//! layer's visibility rules: `upsert` works on a document it returns, while
//! `update_direction` and `delete` are filter-style mutations that do not
//! yield the affected document. Callers that need the edge's target for the
//! recompute step must snapshot it with a lookup *before* running the
//! filter-style mutation.

use async_trait::async_trait;

use crate::domain::ids::{UserId, VoteId};
use crate::domain::pagination::Page;
use crate::domain::vote::{TargetRef, VoteDirection, VoteEdge};

use super::define_port_error;

define_port_error! {
    /// Errors raised by vote store adapters.
    pub enum VoteStoreError {
        /// Store connection could not be established.
        Connection { message: String } =>
            "vote store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "vote store query failed: {message}",
        /// The (user, target) uniqueness constraint was violated.
        DuplicateEdge { user: String, target: String } =>
            "vote by user {user} on {target} already exists",
    }
}

/// Port for vote edge storage and retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoteEdgeStore: Send + Sync {
    /// Insert the actor's edge for a target, or update its direction if one
    /// already exists. Returns the resulting edge.
    async fn upsert(
        &self,
        user: &UserId,
        target: &TargetRef,
        direction: VoteDirection,
    ) -> Result<VoteEdge, VoteStoreError>;

    /// Fetch an edge by identifier.
    async fn find_by_id(&self, id: &VoteId) -> Result<Option<VoteEdge>, VoteStoreError>;

    /// Filter-style direction update. Returns `true` if an edge matched.
    ///
    /// Does not return the document; resolve it first when its target is
    /// needed afterwards.
    async fn update_direction(
        &self,
        id: &VoteId,
        direction: VoteDirection,
    ) -> Result<bool, VoteStoreError>;

    /// Filter-style removal. Returns `true` if an edge was removed.
    ///
    /// Does not return the document; resolve it first when its target is
    /// needed afterwards.
    async fn delete(&self, id: &VoteId) -> Result<bool, VoteStoreError>;

    /// All edge directions currently stored for a target.
    async fn directions_for(&self, target: &TargetRef)
    -> Result<Vec<VoteDirection>, VoteStoreError>;

    /// Page through the edges on a target.
    async fn list_for_target(
        &self,
        target: &TargetRef,
        page: Page,
    ) -> Result<Vec<VoteEdge>, VoteStoreError>;
}

/// Fixture implementation for tests that do not exercise vote storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureVoteEdgeStore;

#[async_trait]
impl VoteEdgeStore for FixtureVoteEdgeStore {
    async fn upsert(
        &self,
        user: &UserId,
        target: &TargetRef,
        direction: VoteDirection,
    ) -> Result<VoteEdge, VoteStoreError> {
        Ok(VoteEdge::new(*user, *target, direction))
    }

    async fn find_by_id(&self, _id: &VoteId) -> Result<Option<VoteEdge>, VoteStoreError> {
        Ok(None)
    }

    async fn update_direction(
        &self,
        _id: &VoteId,
        _direction: VoteDirection,
    ) -> Result<bool, VoteStoreError> {
        Ok(false)
    }

    async fn delete(&self, _id: &VoteId) -> Result<bool, VoteStoreError> {
        Ok(false)
    }

    async fn directions_for(
        &self,
        _target: &TargetRef,
    ) -> Result<Vec<VoteDirection>, VoteStoreError> {
        Ok(Vec::new())
    }

    async fn list_for_target(
        &self,
        _target: &TargetRef,
        _page: Page,
    ) -> Result<Vec<VoteEdge>, VoteStoreError> {
        Ok(Vec::new())
    }
}
