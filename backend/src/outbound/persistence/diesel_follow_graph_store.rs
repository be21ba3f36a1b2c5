//! PostgreSQL-backed [`FollowGraphStore`] implementation using Diesel.
//!
//! Each mirror upsert is a read-then-write pair rather than a single atomic
//! statement: read the member array, update it in place, or insert a fresh
//! list. When the insert loses a creation race to a concurrent request the
//! adapter re-reads the list it knows must now exist; if even that read
//! comes back empty the typed `VanishedUpsert` variant surfaces so the
//! service can retry once.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{FollowGraphStore, FollowStoreError};
use crate::domain::{FollowList, UserId};

use super::diesel_helpers::{DbFailure, classify};
use super::pool::{DbPool, PoolError};
use super::schema::{follower_lists, following_lists};

/// Diesel-backed implementation of the [`FollowGraphStore`] port.
#[derive(Clone)]
pub struct DieselFollowGraphStore {
    pool: DbPool,
}

impl DieselFollowGraphStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> FollowStoreError {
    FollowStoreError::connection(error.to_string())
}

fn map_diesel_error(error: diesel::result::Error) -> FollowStoreError {
    match classify(&error) {
        DbFailure::Connection => FollowStoreError::connection("database connection error"),
        _ => FollowStoreError::query("database error"),
    }
}

fn list_from(owner: &UserId, members: Vec<Uuid>) -> FollowList {
    FollowList {
        owner: *owner,
        members: members.into_iter().map(UserId::from_uuid).collect(),
    }
}

/// The two mirror tables share a shape; this macro instantiates the
/// read/add/remove plumbing for one of them.
macro_rules! mirror_ops {
    ($read:ident, $add:ident, $remove:ident, $table:ident) => {
        async fn $read(
            pool: &DbPool,
            owner: &UserId,
        ) -> Result<Option<Vec<Uuid>>, FollowStoreError> {
            let mut conn = pool.get().await.map_err(map_pool_error)?;
            $table::table
                .find(owner.as_uuid())
                .select($table::members)
                .first(&mut conn)
                .await
                .optional()
                .map_err(map_diesel_error)
        }

        async fn $add(
            pool: &DbPool,
            owner: &UserId,
            member: &UserId,
        ) -> Result<Vec<Uuid>, FollowStoreError> {
            let existing = $read(pool, owner).await?;
            let mut conn = pool.get().await.map_err(map_pool_error)?;

            match existing {
                Some(mut members) => {
                    if !members.contains(member.as_uuid()) {
                        members.push(*member.as_uuid());
                        diesel::update($table::table.find(owner.as_uuid()))
                            .set($table::members.eq(&members))
                            .execute(&mut conn)
                            .await
                            .map_err(map_diesel_error)?;
                    }
                    Ok(members)
                }
                None => {
                    let members = vec![*member.as_uuid()];
                    let inserted = diesel::insert_into($table::table)
                        .values((
                            $table::user_id.eq(owner.as_uuid()),
                            $table::members.eq(&members),
                        ))
                        .execute(&mut conn)
                        .await;

                    match inserted {
                        Ok(_) => Ok(members),
                        Err(error) if classify(&error) == DbFailure::UniqueViolation => {
                            // Lost the creation race; the winner's document
                            // must be there now. If it is not, report the
                            // vanished upsert for the caller's retry policy.
                            drop(conn);
                            match $read(pool, owner).await? {
                                Some(members) => Ok(members),
                                None => {
                                    Err(FollowStoreError::vanished_upsert(owner.to_string()))
                                }
                            }
                        }
                        Err(error) => Err(map_diesel_error(error)),
                    }
                }
            }
        }

        async fn $remove(
            pool: &DbPool,
            owner: &UserId,
            member: &UserId,
        ) -> Result<(), FollowStoreError> {
            let Some(mut members) = $read(pool, owner).await? else {
                return Ok(());
            };
            let before = members.len();
            members.retain(|existing| existing != member.as_uuid());
            if members.len() == before {
                return Ok(());
            }

            let mut conn = pool.get().await.map_err(map_pool_error)?;
            diesel::update($table::table.find(owner.as_uuid()))
                .set($table::members.eq(&members))
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?;
            Ok(())
        }
    };
}

mirror_ops!(
    read_following,
    add_following,
    remove_following,
    following_lists
);
mirror_ops!(
    read_followers,
    add_followers,
    remove_followers,
    follower_lists
);

#[async_trait]
impl FollowGraphStore for DieselFollowGraphStore {
    async fn following_of(&self, owner: &UserId) -> Result<Option<FollowList>, FollowStoreError> {
        Ok(read_following(&self.pool, owner)
            .await?
            .map(|members| list_from(owner, members)))
    }

    async fn followers_of(&self, owner: &UserId) -> Result<Option<FollowList>, FollowStoreError> {
        Ok(read_followers(&self.pool, owner)
            .await?
            .map(|members| list_from(owner, members)))
    }

    async fn add_to_following(
        &self,
        owner: &UserId,
        member: &UserId,
    ) -> Result<FollowList, FollowStoreError> {
        let members = add_following(&self.pool, owner, member).await?;
        Ok(list_from(owner, members))
    }

    async fn add_to_followers(
        &self,
        owner: &UserId,
        member: &UserId,
    ) -> Result<FollowList, FollowStoreError> {
        let members = add_followers(&self.pool, owner, member).await?;
        Ok(list_from(owner, members))
    }

    async fn remove_from_following(
        &self,
        owner: &UserId,
        member: &UserId,
    ) -> Result<(), FollowStoreError> {
        remove_following(&self.pool, owner, member).await
    }

    async fn remove_from_followers(
        &self,
        owner: &UserId,
        member: &UserId,
    ) -> Result<(), FollowStoreError> {
        remove_followers(&self.pool, owner, member).await
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use diesel::result::Error as DieselError;
    use rstest::rstest;

    #[rstest]
    fn pool_errors_map_to_connection() {
        let mapped = map_pool_error(PoolError::checkout("refused"));
        assert!(matches!(mapped, FollowStoreError::Connection { .. }));
    }

    #[rstest]
    fn plain_errors_map_to_query() {
        let mapped = map_diesel_error(DieselError::NotFound);
        assert!(matches!(mapped, FollowStoreError::Query { .. }));
    }

    #[rstest]
    fn lists_convert_member_uuids() {
        let owner = UserId::random();
        let member = UserId::random();
        let list = list_from(&owner, vec![*member.as_uuid()]);
        assert_eq!(list.owner, owner);
        assert!(list.contains(&member));
    }
}
