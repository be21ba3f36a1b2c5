//! Port for password and reset-token hashing.
//!
//! Hashing is pure CPU work with no await points, so unlike the storage
//! ports this one is synchronous. The concrete scheme lives behind the port
//! on purpose: swapping it never touches domain code.

use crate::domain::auth::Password;

/// A freshly issued password-reset token.
///
/// Only the hash is stored; the plaintext goes out by mail and is then
/// forgotten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedResetToken {
    /// The token mailed to the user.
    pub plaintext: String,
    /// The hash persisted alongside the account.
    pub token_hash: String,
}

/// Port for credential hashing and reset-token issuance.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialHasher: Send + Sync {
    /// Hash a password for storage.
    fn hash_password(&self, password: &Password) -> String;

    /// Verify a presented password against a stored hash.
    fn verify_password(&self, password: &Password, stored_hash: &str) -> bool;

    /// Issue a fresh random reset token together with its storable hash.
    fn issue_reset_token(&self) -> IssuedResetToken;

    /// Hash a presented reset token for lookup.
    fn hash_reset_token(&self, token: &str) -> String;
}

/// Fixture hasher for tests: "hashing" is a reversible marker prefix.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCredentialHasher;

impl CredentialHasher for FixtureCredentialHasher {
    fn hash_password(&self, password: &Password) -> String {
        format!("hashed:{}", password.expose())
    }

    fn verify_password(&self, password: &Password, stored_hash: &str) -> bool {
        stored_hash == format!("hashed:{}", password.expose())
    }

    fn issue_reset_token(&self) -> IssuedResetToken {
        let plaintext = uuid::Uuid::new_v4().simple().to_string();
        IssuedResetToken {
            token_hash: self.hash_reset_token(&plaintext),
            plaintext,
        }
    }

    fn hash_reset_token(&self, token: &str) -> String {
        format!("token:{token}")
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn fixture_hasher_round_trips_passwords() {
        let hasher = FixtureCredentialHasher;
        let password = Password::for_login("secret").expect("valid password");
        let hash = hasher.hash_password(&password);
        assert!(hasher.verify_password(&password, &hash));

        let other = Password::for_login("other").expect("valid password");
        assert!(!hasher.verify_password(&other, &hash));
    }

    #[rstest]
    fn issued_tokens_match_their_own_hash() {
        let hasher = FixtureCredentialHasher;
        let issued = hasher.issue_reset_token();
        assert_eq!(hasher.hash_reset_token(&issued.plaintext), issued.token_hash);
    }
}
