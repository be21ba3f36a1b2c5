//! Port for user account persistence.
//!
//! The follow-stat write is reserved for the follow recompute step; account
//! handlers never touch those fields directly.

use async_trait::async_trait;

use crate::domain::follow::FollowStats;
use crate::domain::ids::UserId;
use crate::domain::pagination::Page;
use crate::domain::user::{EmailAddress, ResetTokenRecord, User, UserAccount};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user store adapters.
    pub enum UserStoreError {
        /// Store connection could not be established.
        Connection { message: String } =>
            "user store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "user store query failed: {message}",
        /// The email uniqueness constraint was violated.
        DuplicateEmail { email: String } =>
            "an account with email {email} already exists",
    }
}

/// Port for user account storage and retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new account.
    async fn insert(&self, account: &UserAccount) -> Result<(), UserStoreError>;

    /// Fetch an account by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserAccount>, UserStoreError>;

    /// Fetch an account by email.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserAccount>, UserStoreError>;

    /// Fetch the account holding the given reset-token hash, if any.
    async fn find_by_reset_token_hash(
        &self,
        token_hash: &str,
    ) -> Result<Option<UserAccount>, UserStoreError>;

    /// Replace an account's password hash.
    async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<(), UserStoreError>;

    /// Set or clear the pending reset token. Passing `None` rolls the token
    /// fields back to unset.
    async fn set_reset_token<'a>(
        &self,
        id: &UserId,
        token: Option<&'a ResetTokenRecord>,
    ) -> Result<(), UserStoreError>;

    /// Write the recomputed follow counts onto a user. Writing to a user
    /// that no longer exists is a no-op, not an error.
    async fn write_follow_stats(
        &self,
        id: &UserId,
        stats: FollowStats,
    ) -> Result<(), UserStoreError>;

    /// Page through accounts.
    async fn list(&self, page: Page) -> Result<Vec<User>, UserStoreError>;
}

/// Fixture implementation for tests that do not exercise user storage.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserStore;

#[async_trait]
impl UserStore for FixtureUserStore {
    async fn insert(&self, _account: &UserAccount) -> Result<(), UserStoreError> {
        Ok(())
    }

    async fn find_by_id(&self, _id: &UserId) -> Result<Option<UserAccount>, UserStoreError> {
        Ok(None)
    }

    async fn find_by_email(
        &self,
        _email: &EmailAddress,
    ) -> Result<Option<UserAccount>, UserStoreError> {
        Ok(None)
    }

    async fn find_by_reset_token_hash(
        &self,
        _token_hash: &str,
    ) -> Result<Option<UserAccount>, UserStoreError> {
        Ok(None)
    }

    async fn update_password_hash(
        &self,
        _id: &UserId,
        _password_hash: &str,
    ) -> Result<(), UserStoreError> {
        Ok(())
    }

    async fn set_reset_token<'a>(
        &self,
        _id: &UserId,
        _token: Option<&'a ResetTokenRecord>,
    ) -> Result<(), UserStoreError> {
        Ok(())
    }

    async fn write_follow_stats(
        &self,
        _id: &UserId,
        _stats: FollowStats,
    ) -> Result<(), UserStoreError> {
        Ok(())
    }

    async fn list(&self, _page: Page) -> Result<Vec<User>, UserStoreError> {
        Ok(Vec::new())
    }
}
