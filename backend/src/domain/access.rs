//! The ownership and ban gate.
//!
//! Every request moves through two transitions: a credential resolves to a
//! live, non-banned account (authentication), and a mutation on a document is
//! permitted only for its owner or an administrator (authorisation). Both
//! transitions live here so services and handlers share one rule set.

use super::error::DomainError;
use super::ids::UserId;
use super::user::{Role, User};

/// An authenticated, non-banned identity acting on the system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// The acting user.
    pub id: UserId,
    /// The acting user's role.
    pub role: Role,
}

impl Actor {
    /// Shorthand used by tests and fixtures.
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    /// True for administrators, who bypass ownership checks.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Authorise a mutation on a document owned by `owner`.
    ///
    /// Administrators always pass. A document whose owner reference is
    /// missing (dangling account) is operable only by administrators.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::{Actor, Role, UserId};
    ///
    /// let owner = UserId::random();
    /// let actor = Actor::new(owner, Role::User);
    /// assert!(actor.authorize_owner(Some(&owner)).is_ok());
    /// assert!(actor.authorize_owner(Some(&UserId::random())).is_err());
    /// ```
    pub fn authorize_owner(&self, owner: Option<&UserId>) -> Result<(), DomainError> {
        if self.is_admin() {
            return Ok(());
        }
        match owner {
            Some(owner_id) if *owner_id == self.id => Ok(()),
            Some(_) => Err(DomainError::unauthorized("you do not own this document")),
            None => Err(DomainError::unauthorized(
                "the user associated with this document no longer exists, \
                 and you do not have permission to modify it",
            )),
        }
    }
}

/// Resolve a stored account into an [`Actor`], refusing banned accounts.
///
/// The ban reason is surfaced in the error message so clients can display it.
pub fn gate_account(user: &User) -> Result<Actor, DomainError> {
    if let Some(reason) = &user.ban_reason {
        return Err(DomainError::forbidden(format!(
            "you are banned. Reason: {reason}"
        )));
    }
    Ok(Actor::new(user.id, user.role))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::follow::FollowStats;
    use crate::domain::user::{EmailAddress, UserName};
    use chrono::Utc;
    use rstest::rstest;

    fn account(ban_reason: Option<&str>) -> User {
        User {
            id: UserId::random(),
            name: UserName::new("Ada").expect("valid name"),
            email: EmailAddress::new("ada@example.com").expect("valid email"),
            role: Role::User,
            ban_reason: ban_reason.map(str::to_owned),
            created_at: Utc::now(),
            follow_stats: FollowStats::default(),
        }
    }

    #[rstest]
    fn owner_may_mutate_their_document() {
        let owner = UserId::random();
        let actor = Actor::new(owner, Role::User);
        assert!(actor.authorize_owner(Some(&owner)).is_ok());
    }

    #[rstest]
    #[case(Role::User)]
    #[case(Role::Moderator)]
    fn non_admin_stranger_is_refused(#[case] role: Role) {
        let actor = Actor::new(UserId::random(), role);
        let err = actor
            .authorize_owner(Some(&UserId::random()))
            .expect_err("stranger must be refused");
        assert_eq!(err.code(), crate::domain::ErrorCode::Unauthorized);
    }

    #[rstest]
    fn admin_bypasses_ownership() {
        let actor = Actor::new(UserId::random(), Role::Admin);
        assert!(actor.authorize_owner(Some(&UserId::random())).is_ok());
        assert!(actor.authorize_owner(None).is_ok());
    }

    #[rstest]
    fn dangling_owner_is_admin_only() {
        let actor = Actor::new(UserId::random(), Role::User);
        let err = actor
            .authorize_owner(None)
            .expect_err("dangling owner must be admin-only");
        assert_eq!(err.code(), crate::domain::ErrorCode::Unauthorized);
    }

    #[rstest]
    fn banned_accounts_are_gated_with_reason() {
        let user = account(Some("spam"));
        let err = gate_account(&user).expect_err("banned account must be refused");
        assert_eq!(err.code(), crate::domain::ErrorCode::Forbidden);
        assert!(err.message().contains("spam"));
    }

    #[rstest]
    fn clean_accounts_become_actors() {
        let user = account(None);
        let actor = gate_account(&user).expect("clean account passes");
        assert_eq!(actor.id, user.id);
        assert_eq!(actor.role, Role::User);
    }
}
