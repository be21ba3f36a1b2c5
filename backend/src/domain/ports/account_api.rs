//! Driving ports for account use-cases.
//!
//! Inbound adapters call these to run signup, login, and the password
//! lifecycle without knowing the backing infrastructure, which keeps HTTP
//! handler tests deterministic.

use async_trait::async_trait;

use crate::domain::access::Actor;
use crate::domain::auth::{LoginCredentials, Password, SignupDetails};
use crate::domain::error::DomainError;
use crate::domain::ids::UserId;
use crate::domain::pagination::Page;
use crate::domain::user::{EmailAddress, Role, User, UserName};
use crate::domain::follow::FollowStats;

/// Domain use-case port for account mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Create an account, send the welcome mail, and return the new user.
    async fn sign_up(&self, details: SignupDetails) -> Result<User, DomainError>;

    /// Validate credentials and return the authenticated user.
    async fn login(&self, credentials: LoginCredentials) -> Result<User, DomainError>;

    /// Stage a password-reset token and mail it to the account holder.
    async fn forgot_password(&self, email: EmailAddress) -> Result<(), DomainError>;

    /// Redeem a reset token and set a new password; returns the user so the
    /// caller can establish a session.
    async fn reset_password(
        &self,
        token: &str,
        new_password: Password,
    ) -> Result<User, DomainError>;

    /// Change the actor's password after verifying the current one.
    async fn change_password(
        &self,
        actor: &Actor,
        current: Password,
        new_password: Password,
    ) -> Result<(), DomainError>;
}

/// Domain use-case port for account reads and the authentication gate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountQuery: Send + Sync {
    /// Resolve a session identity into an [`Actor`], refusing deleted or
    /// banned accounts.
    async fn fetch_actor(&self, id: &UserId) -> Result<Actor, DomainError>;

    /// Fetch a user's public profile.
    async fn get_user(&self, id: &UserId) -> Result<User, DomainError>;

    /// Page through accounts.
    async fn list_users(&self, page: Page) -> Result<Vec<User>, DomainError>;
}

/// Identifier produced by [`FixtureAccountQuery::fetch_actor`].
pub const FIXTURE_USER_ID: &str = "123e4567-e89b-12d3-a456-426614174000";

fn fixture_user(id: UserId) -> Result<User, DomainError> {
    let name =
        UserName::new("Ada Lovelace").map_err(|err| DomainError::internal(err.to_string()))?;
    let email =
        EmailAddress::new("ada@example.com").map_err(|err| DomainError::internal(err.to_string()))?;
    Ok(User {
        id,
        name,
        email,
        role: Role::User,
        ban_reason: None,
        created_at: chrono::Utc::now(),
        follow_stats: FollowStats::default(),
    })
}

/// In-memory-free account command used until persistence is wired.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAccountCommand;

#[async_trait]
impl AccountCommand for FixtureAccountCommand {
    async fn sign_up(&self, _details: SignupDetails) -> Result<User, DomainError> {
        fixture_user(UserId::random())
    }

    async fn login(&self, _credentials: LoginCredentials) -> Result<User, DomainError> {
        let id = UserId::new(FIXTURE_USER_ID)
            .map_err(|err| DomainError::internal(format!("invalid fixture user id: {err}")))?;
        fixture_user(id)
    }

    async fn forgot_password(&self, _email: EmailAddress) -> Result<(), DomainError> {
        Ok(())
    }

    async fn reset_password(
        &self,
        _token: &str,
        _new_password: Password,
    ) -> Result<User, DomainError> {
        fixture_user(UserId::random())
    }

    async fn change_password(
        &self,
        _actor: &Actor,
        _current: Password,
        _new_password: Password,
    ) -> Result<(), DomainError> {
        Ok(())
    }
}

/// Fixture account query that authenticates every session id as a plain user.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAccountQuery;

#[async_trait]
impl AccountQuery for FixtureAccountQuery {
    async fn fetch_actor(&self, id: &UserId) -> Result<Actor, DomainError> {
        Ok(Actor::new(*id, Role::User))
    }

    async fn get_user(&self, id: &UserId) -> Result<User, DomainError> {
        fixture_user(*id)
    }

    async fn list_users(&self, _page: Page) -> Result<Vec<User>, DomainError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[tokio::test]
    async fn fixture_login_produces_the_fixture_id() {
        let command = FixtureAccountCommand;
        let creds =
            LoginCredentials::try_from_parts("ada@example.com", "password").expect("valid creds");
        let user = command.login(creds).await.expect("fixture login succeeds");
        assert_eq!(user.id.to_string(), FIXTURE_USER_ID);
    }

    #[tokio::test]
    async fn fixture_query_grants_plain_user_actors() {
        let query = FixtureAccountQuery;
        let id = UserId::random();
        let actor = query.fetch_actor(&id).await.expect("fixture actor");
        assert_eq!(actor.id, id);
        assert_eq!(actor.role, Role::User);
    }
}
