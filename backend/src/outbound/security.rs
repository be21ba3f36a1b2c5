//! Credential hashing adapter.
//!
//! Implements the [`CredentialHasher`] port with salted SHA-256 for
//! passwords and plain SHA-256 for reset tokens. The password scheme is
//! deliberately pluggable: the port is the contract, this adapter is just
//! the shipped default.

use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::domain::Password;
use crate::domain::ports::{CredentialHasher, IssuedResetToken};

const SALT_BYTES: usize = 16;
const TOKEN_BYTES: usize = 32;

/// Salted SHA-256 [`CredentialHasher`].
#[derive(Debug, Default, Clone, Copy)]
pub struct Sha256CredentialHasher;

fn random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0_u8; N];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

fn digest_with_salt(salt_hex: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt_hex.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

impl CredentialHasher for Sha256CredentialHasher {
    fn hash_password(&self, password: &Password) -> String {
        let salt_hex = hex::encode(random_bytes::<SALT_BYTES>());
        let digest = digest_with_salt(&salt_hex, password.expose());
        format!("{salt_hex}${digest}")
    }

    fn verify_password(&self, password: &Password, stored_hash: &str) -> bool {
        let Some((salt_hex, digest)) = stored_hash.split_once('$') else {
            return false;
        };
        digest_with_salt(salt_hex, password.expose()) == digest
    }

    fn issue_reset_token(&self) -> IssuedResetToken {
        let plaintext = hex::encode(random_bytes::<TOKEN_BYTES>());
        IssuedResetToken {
            token_hash: self.hash_reset_token(&plaintext),
            plaintext,
        }
    }

    fn hash_reset_token(&self, token: &str) -> String {
        hex::encode(Sha256::digest(token.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn hashing_round_trips_and_salts_differ() {
        let hasher = Sha256CredentialHasher;
        let password = Password::for_login("correct horse").expect("valid password");

        let first = hasher.hash_password(&password);
        let second = hasher.hash_password(&password);
        assert_ne!(first, second, "each hash must use a fresh salt");
        assert!(hasher.verify_password(&password, &first));
        assert!(hasher.verify_password(&password, &second));
    }

    #[rstest]
    fn wrong_passwords_fail_verification() {
        let hasher = Sha256CredentialHasher;
        let password = Password::for_login("correct horse").expect("valid password");
        let stored = hasher.hash_password(&password);

        let wrong = Password::for_login("wrong horse").expect("valid password");
        assert!(!hasher.verify_password(&wrong, &stored));
    }

    #[rstest]
    fn malformed_stored_hashes_never_verify() {
        let hasher = Sha256CredentialHasher;
        let password = Password::for_login("anything").expect("valid password");
        assert!(!hasher.verify_password(&password, "no-separator"));
    }

    #[rstest]
    fn issued_tokens_match_their_own_hash_and_are_unique() {
        let hasher = Sha256CredentialHasher;
        let first = hasher.issue_reset_token();
        let second = hasher.issue_reset_token();

        assert_ne!(first.plaintext, second.plaintext);
        assert_eq!(hasher.hash_reset_token(&first.plaintext), first.token_hash);
    }
}
