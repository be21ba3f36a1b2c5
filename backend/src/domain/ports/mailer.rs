//! Port for transactional mail delivery.
//!
//! Delivery is a downstream collaborator: failures must never corrupt
//! already-saved state. Callers that stage local state in anticipation of a
//! send (the password-reset token) are responsible for rolling it back when
//! delivery fails.

use async_trait::async_trait;

use crate::domain::user::{EmailAddress, UserName};

use super::define_port_error;

define_port_error! {
    /// Errors raised by mail adapters.
    pub enum MailerError {
        /// The mail API could not be reached.
        Dispatch { message: String } =>
            "mail dispatch failed: {message}",
        /// The mail API refused the message.
        Rejected { message: String } =>
            "mail was rejected: {message}",
    }
}

/// Port for sending templated mail.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Greet a newly signed-up user.
    async fn send_welcome(
        &self,
        recipient: &EmailAddress,
        name: &UserName,
    ) -> Result<(), MailerError>;

    /// Deliver a password-reset token. `reset_token` is the plaintext token;
    /// it must not be logged.
    async fn send_password_reset(
        &self,
        recipient: &EmailAddress,
        name: &UserName,
        reset_token: &str,
    ) -> Result<(), MailerError>;
}

/// Fixture mailer that silently accepts everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMailer;

#[async_trait]
impl Mailer for FixtureMailer {
    async fn send_welcome(
        &self,
        _recipient: &EmailAddress,
        _name: &UserName,
    ) -> Result<(), MailerError> {
        Ok(())
    }

    async fn send_password_reset(
        &self,
        _recipient: &EmailAddress,
        _name: &UserName,
        _reset_token: &str,
    ) -> Result<(), MailerError> {
        Ok(())
    }
}
