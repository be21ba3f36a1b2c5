//! PostgreSQL-backed [`UserStore`] implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserStore, UserStoreError};
use crate::domain::{EmailAddress, FollowStats, Page, ResetTokenRecord, User, UserAccount, UserId};

use super::diesel_helpers::{DbFailure, classify};
use super::models::UserRow;
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the [`UserStore`] port.
#[derive(Clone)]
pub struct DieselUserStore {
    pool: DbPool,
}

impl DieselUserStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserStoreError {
    UserStoreError::connection(error.to_string())
}

fn map_insert_error(error: diesel::result::Error, email: &EmailAddress) -> UserStoreError {
    match classify(&error) {
        DbFailure::UniqueViolation => UserStoreError::duplicate_email(email.as_ref()),
        DbFailure::Connection => UserStoreError::connection("database connection error"),
        DbFailure::NotFound | DbFailure::Other => UserStoreError::query("database error"),
    }
}

fn map_plain_error(error: diesel::result::Error) -> UserStoreError {
    match classify(&error) {
        DbFailure::Connection => UserStoreError::connection("database connection error"),
        _ => UserStoreError::query("database error"),
    }
}

fn row_to_account(row: UserRow) -> Result<UserAccount, UserStoreError> {
    row.into_account()
        .map_err(|error| UserStoreError::query(error.to_string()))
}

#[async_trait]
impl UserStore for DieselUserStore {
    async fn insert(&self, account: &UserAccount) -> Result<(), UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(users::table)
            .values(UserRow::from_account(account))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|error| map_insert_error(error, &account.user.email))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_plain_error)?;

        row.map(row_to_account).transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserAccount>, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_plain_error)?;

        row.map(row_to_account).transpose()
    }

    async fn find_by_reset_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<UserAccount>, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::reset_token_hash.eq(token_hash))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_plain_error)?;

        row.map(row_to_account).transpose()
    }

    async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<(), UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::update(users::table.find(id.as_uuid()))
            .set(users::password_hash.eq(password_hash))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_plain_error)
    }

    async fn set_reset_token<'a>(
        &self,
        id: &UserId,
        token: Option<&'a ResetTokenRecord>,
    ) -> Result<(), UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::update(users::table.find(id.as_uuid()))
            .set((
                users::reset_token_hash.eq(token.map(|record| record.token_hash.clone())),
                users::reset_token_expires_at.eq(token.map(|record| record.expires_at)),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_plain_error)
    }

    async fn write_follow_stats(
        &self,
        id: &UserId,
        stats: FollowStats,
    ) -> Result<(), UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Zero rows matched means the user vanished; the stats write is a
        // no-op by contract.
        diesel::update(users::table.find(id.as_uuid()))
            .set((
                users::following_count.eq(stats.following as i64),
                users::followers_count.eq(stats.followers as i64),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_plain_error)
    }

    async fn list(&self, page: Page) -> Result<Vec<User>, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .order(users::created_at.desc())
            .offset(page.offset() as i64)
            .limit(i64::from(page.size()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_plain_error)?;

        rows.into_iter()
            .map(|row| row_to_account(row).map(|account| account.user))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    #[rstest]
    fn unique_violation_maps_to_duplicate_email() {
        let email = EmailAddress::new("ada@example.com").expect("valid email");
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key".to_owned()),
        );

        let mapped = map_insert_error(error, &email);
        assert!(matches!(mapped, UserStoreError::DuplicateEmail { .. }));
        assert!(mapped.to_string().contains("ada@example.com"));
    }

    #[rstest]
    fn pool_errors_map_to_connection() {
        let mapped = map_pool_error(PoolError::checkout("refused"));
        assert!(matches!(mapped, UserStoreError::Connection { .. }));
    }
}
