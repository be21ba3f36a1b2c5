//! Account use-cases: signup, login, and the password lifecycle.
//!
//! Mail is a downstream collaborator. The welcome mail is best-effort: a
//! failure is logged and the stored account stands. The password-reset mail
//! is different: the staged token is useless if it never reaches the user,
//! so a failed dispatch rolls the token fields back to unset before the
//! failure is surfaced.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::warn;

use crate::domain::access::{Actor, gate_account};
use crate::domain::auth::{LoginCredentials, Password, SignupDetails};
use crate::domain::error::DomainError;
use crate::domain::follow::FollowStats;
use crate::domain::ids::UserId;
use crate::domain::pagination::Page;
use crate::domain::ports::{
    AccountCommand, AccountQuery, CredentialHasher, Mailer, UserStore, UserStoreError,
};
use crate::domain::user::{ResetTokenRecord, Role, User, UserAccount};

/// How long a password-reset token stays valid.
const RESET_TOKEN_TTL_MINUTES: i64 = 10;

/// Account service implementing the driving ports.
#[derive(Clone)]
pub struct AccountService<U, H, M> {
    users: Arc<U>,
    hasher: Arc<H>,
    mailer: Arc<M>,
}

impl<U, H, M> AccountService<U, H, M> {
    /// Create a new service over the given collaborators.
    pub fn new(users: Arc<U>, hasher: Arc<H>, mailer: Arc<M>) -> Self {
        Self {
            users,
            hasher,
            mailer,
        }
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
        UserStoreError::DuplicateEmail { email } => {
            DomainError::conflict(format!("an account with email {email} already exists"))
        }
    }
}

impl<U, H, M> AccountService<U, H, M>
where
    U: UserStore,
    H: CredentialHasher,
    M: Mailer,
{
    async fn account_by_id(&self, id: &UserId) -> Result<UserAccount, DomainError> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| {
                DomainError::unauthorized("the user belonging to this session no longer exists")
            })
    }
}

#[async_trait]
impl<U, H, M> AccountCommand for AccountService<U, H, M>
where
    U: UserStore,
    H: CredentialHasher,
    M: Mailer,
{
    async fn sign_up(&self, details: SignupDetails) -> Result<User, DomainError> {
        let user = User {
            id: UserId::random(),
            name: details.name().clone(),
            email: details.email().clone(),
            role: Role::User,
            ban_reason: None,
            created_at: Utc::now(),
            follow_stats: FollowStats::default(),
        };
        let account = UserAccount {
            user,
            password_hash: self.hasher.hash_password(details.password()),
            reset_token: None,
        };

        self.users.insert(&account).await.map_err(map_user_error)?;

        // Best effort: the account is already stored and must stand either way.
        if let Err(error) = self
            .mailer
            .send_welcome(&account.user.email, &account.user.name)
            .await
        {
            warn!(user = %account.user.id, error = %error, "welcome mail failed");
        }

        Ok(account.user)
    }

    async fn login(&self, credentials: LoginCredentials) -> Result<User, DomainError> {
        let account = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| DomainError::unauthorized("incorrect email or password"))?;

        if !self
            .hasher
            .verify_password(credentials.password(), &account.password_hash)
        {
            return Err(DomainError::unauthorized("incorrect email or password"));
        }

        // Banned accounts are refused with the reason in the message.
        gate_account(&account.user)?;
        Ok(account.user)
    }

    async fn forgot_password(&self, email: crate::domain::EmailAddress) -> Result<(), DomainError> {
        let account = self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| DomainError::not_found("there is no user with that email address"))?;

        let issued = self.hasher.issue_reset_token();
        let record = ResetTokenRecord {
            token_hash: issued.token_hash,
            expires_at: Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES),
        };
        self.users
            .set_reset_token(&account.user.id, Some(&record))
            .await
            .map_err(map_user_error)?;

        if let Err(error) = self
            .mailer
            .send_password_reset(&account.user.email, &account.user.name, &issued.plaintext)
            .await
        {
            // The staged token must not outlive the failed dispatch.
            self.users
                .set_reset_token(&account.user.id, None)
                .await
                .map_err(map_user_error)?;
            warn!(user = %account.user.id, error = %error, "password reset mail failed");
            return Err(DomainError::service_unavailable(
                "there was an error sending the email, try again later",
            ));
        }

        Ok(())
    }

    async fn reset_password(
        &self,
        token: &str,
        new_password: Password,
    ) -> Result<User, DomainError> {
        let token_hash = self.hasher.hash_reset_token(token);
        let account = self
            .users
            .find_by_reset_token_hash(&token_hash)
            .await
            .map_err(map_user_error)?
            .filter(|account| {
                account
                    .reset_token
                    .as_ref()
                    .is_some_and(|record| !record.is_expired(Utc::now()))
            })
            .ok_or_else(|| DomainError::invalid_request("token is invalid or has expired"))?;

        let password_hash = self.hasher.hash_password(&new_password);
        self.users
            .update_password_hash(&account.user.id, &password_hash)
            .await
            .map_err(map_user_error)?;
        self.users
            .set_reset_token(&account.user.id, None)
            .await
            .map_err(map_user_error)?;

        Ok(account.user)
    }

    async fn change_password(
        &self,
        actor: &Actor,
        current: Password,
        new_password: Password,
    ) -> Result<(), DomainError> {
        let account = self.account_by_id(&actor.id).await?;

        if !self
            .hasher
            .verify_password(&current, &account.password_hash)
        {
            return Err(DomainError::unauthorized("your current password is wrong"));
        }

        let password_hash = self.hasher.hash_password(&new_password);
        self.users
            .update_password_hash(&actor.id, &password_hash)
            .await
            .map_err(map_user_error)
    }
}

#[async_trait]
impl<U, H, M> AccountQuery for AccountService<U, H, M>
where
    U: UserStore,
    H: CredentialHasher,
    M: Mailer,
{
    async fn fetch_actor(&self, id: &UserId) -> Result<Actor, DomainError> {
        let account = self.account_by_id(id).await?;
        gate_account(&account.user)
    }

    async fn get_user(&self, id: &UserId) -> Result<User, DomainError> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_user_error)?
            .map(|account| account.user)
            .ok_or_else(|| DomainError::not_found("no user found with that ID"))
    }

    async fn list_users(&self, page: Page) -> Result<Vec<User>, DomainError> {
        self.users.list(page).await.map_err(map_user_error)
    }
}
