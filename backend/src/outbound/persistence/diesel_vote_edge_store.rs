//! PostgreSQL-backed [`VoteEdgeStore`] implementation using Diesel.
//!
//! The upsert rides PostgreSQL's `ON CONFLICT` over the `(user, target)`
//! uniqueness index; the filter-style mutations intentionally return only a
//! matched-row indicator, per the port contract.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{VoteEdgeStore, VoteStoreError};
use crate::domain::{Page, TargetRef, UserId, VoteDirection, VoteEdge, VoteId};

use super::diesel_helpers::{DbFailure, classify};
use super::models::{VoteEdgeRow, target_columns};
use super::pool::{DbPool, PoolError};
use super::schema::vote_edges;

/// Diesel-backed implementation of the [`VoteEdgeStore`] port.
#[derive(Clone)]
pub struct DieselVoteEdgeStore {
    pool: DbPool,
}

impl DieselVoteEdgeStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> VoteStoreError {
    VoteStoreError::connection(error.to_string())
}

fn map_diesel_error(
    error: diesel::result::Error,
    user: &Uuid,
    target: &TargetRef,
) -> VoteStoreError {
    match classify(&error) {
        DbFailure::UniqueViolation => {
            VoteStoreError::duplicate_edge(user.to_string(), target.to_string())
        }
        DbFailure::Connection => VoteStoreError::connection("database connection error"),
        DbFailure::NotFound | DbFailure::Other => VoteStoreError::query("database error"),
    }
}

fn map_plain_error(error: diesel::result::Error) -> VoteStoreError {
    match classify(&error) {
        DbFailure::Connection => VoteStoreError::connection("database connection error"),
        _ => VoteStoreError::query("database error"),
    }
}

fn row_to_edge(row: VoteEdgeRow) -> Result<VoteEdge, VoteStoreError> {
    row.into_edge()
        .map_err(|error| VoteStoreError::query(error.to_string()))
}

#[async_trait]
impl VoteEdgeStore for DieselVoteEdgeStore {
    async fn upsert(
        &self,
        user: &UserId,
        target: &TargetRef,
        direction: VoteDirection,
    ) -> Result<VoteEdge, VoteStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (kind, target_id) = target_columns(target);
        let direction_i16 = direction.as_i64() as i16;

        let row = VoteEdgeRow {
            id: Uuid::new_v4(),
            user_id: *user.as_uuid(),
            target_kind: kind.to_owned(),
            target_id,
            direction: direction_i16,
            created_at: Utc::now(),
        };

        let stored: VoteEdgeRow = diesel::insert_into(vote_edges::table)
            .values(&row)
            .on_conflict((
                vote_edges::user_id,
                vote_edges::target_kind,
                vote_edges::target_id,
            ))
            .do_update()
            .set(vote_edges::direction.eq(direction_i16))
            .returning(VoteEdgeRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|error| map_diesel_error(error, user.as_uuid(), target))?;

        row_to_edge(stored)
    }

    async fn find_by_id(&self, id: &VoteId) -> Result<Option<VoteEdge>, VoteStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<VoteEdgeRow> = vote_edges::table
            .find(id.as_uuid())
            .select(VoteEdgeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_plain_error)?;

        row.map(row_to_edge).transpose()
    }

    async fn update_direction(
        &self,
        id: &VoteId,
        direction: VoteDirection,
    ) -> Result<bool, VoteStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let updated = diesel::update(vote_edges::table.find(id.as_uuid()))
            .set(vote_edges::direction.eq(direction.as_i64() as i16))
            .execute(&mut conn)
            .await
            .map_err(map_plain_error)?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: &VoteId) -> Result<bool, VoteStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = diesel::delete(vote_edges::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_plain_error)?;
        Ok(removed > 0)
    }

    async fn directions_for(
        &self,
        target: &TargetRef,
    ) -> Result<Vec<VoteDirection>, VoteStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (kind, target_id) = target_columns(target);

        let raw: Vec<i16> = vote_edges::table
            .filter(vote_edges::target_kind.eq(kind))
            .filter(vote_edges::target_id.eq(target_id))
            .select(vote_edges::direction)
            .load(&mut conn)
            .await
            .map_err(map_plain_error)?;

        raw.into_iter()
            .map(|value| {
                VoteDirection::try_from(i64::from(value))
                    .map_err(|error| VoteStoreError::query(error.to_string()))
            })
            .collect()
    }

    async fn list_for_target(
        &self,
        target: &TargetRef,
        page: Page,
    ) -> Result<Vec<VoteEdge>, VoteStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (kind, target_id) = target_columns(target);

        let rows: Vec<VoteEdgeRow> = vote_edges::table
            .filter(vote_edges::target_kind.eq(kind))
            .filter(vote_edges::target_id.eq(target_id))
            .order(vote_edges::created_at.desc())
            .offset(page.offset() as i64)
            .limit(i64::from(page.size()))
            .select(VoteEdgeRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_plain_error)?;

        rows.into_iter().map(row_to_edge).collect()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::PostId;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    #[rstest]
    fn unique_violation_maps_to_duplicate_edge() {
        let user = Uuid::new_v4();
        let target = TargetRef::Post(PostId::random());
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key".to_owned()),
        );

        let mapped = map_diesel_error(error, &user, &target);
        assert!(matches!(mapped, VoteStoreError::DuplicateEdge { .. }));
        assert!(mapped.to_string().contains(&user.to_string()));
    }

    #[rstest]
    fn pool_errors_map_to_connection() {
        let mapped = map_pool_error(PoolError::checkout("refused"));
        assert!(matches!(mapped, VoteStoreError::Connection { .. }));
    }

    #[rstest]
    fn plain_errors_map_to_query() {
        let mapped = map_plain_error(DieselError::NotFound);
        assert!(matches!(mapped, VoteStoreError::Query { .. }));
    }
}
