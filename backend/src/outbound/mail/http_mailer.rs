//! HTTP adapter for the transactional mail API.
//!
//! Delivers templated mail by POSTing `{to, template, variables}` to the
//! configured endpoint with a bearer token. The API queues delivery; a 2xx
//! here only means the message was accepted.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use crate::domain::ports::{Mailer, MailerError};
use crate::domain::{EmailAddress, UserName};

/// Configuration for [`HttpMailer`].
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// Endpoint accepting the send requests.
    pub endpoint: Url,
    /// Bearer token for the mail API.
    pub api_token: String,
    /// Address the mail is sent from.
    pub sender: String,
}

/// Templated message envelope accepted by the mail API.
#[derive(Debug, Clone, Serialize, PartialEq)]
struct MailEnvelope {
    from: String,
    to: String,
    template: &'static str,
    variables: Value,
}

/// Reqwest-backed implementation of the [`Mailer`] port.
#[derive(Clone)]
pub struct HttpMailer {
    client: Client,
    config: MailerConfig,
}

impl HttpMailer {
    /// Create a new mailer over the given configuration.
    pub fn new(config: MailerConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn envelope(&self, to: &EmailAddress, template: &'static str, variables: Value) -> MailEnvelope {
        MailEnvelope {
            from: self.config.sender.clone(),
            to: to.as_ref().to_owned(),
            template,
            variables,
        }
    }

    async fn dispatch(&self, envelope: MailEnvelope) -> Result<(), MailerError> {
        let response = self
            .client
            .post(self.config.endpoint.clone())
            .bearer_auth(&self.config.api_token)
            .json(&envelope)
            .send()
            .await
            .map_err(|error| MailerError::dispatch(error.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(template = envelope.template, "mail accepted for delivery");
            Ok(())
        } else {
            Err(MailerError::rejected(format!(
                "mail API answered {status} for template {}",
                envelope.template
            )))
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send_welcome(
        &self,
        recipient: &EmailAddress,
        name: &UserName,
    ) -> Result<(), MailerError> {
        let envelope = self.envelope(
            recipient,
            "welcome",
            json!({ "name": name.as_ref() }),
        );
        self.dispatch(envelope).await
    }

    async fn send_password_reset(
        &self,
        recipient: &EmailAddress,
        name: &UserName,
        reset_token: &str,
    ) -> Result<(), MailerError> {
        let envelope = self.envelope(
            recipient,
            "password_reset",
            json!({
                "name": name.as_ref(),
                "token": reset_token,
                "validMinutes": 10,
            }),
        );
        self.dispatch(envelope).await
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn mailer() -> HttpMailer {
        HttpMailer::new(MailerConfig {
            endpoint: Url::parse("https://mail.invalid/send").expect("valid url"),
            api_token: "token".to_owned(),
            sender: "noreply@palaver.example".to_owned(),
        })
    }

    #[rstest]
    fn envelopes_carry_sender_recipient_and_template() {
        let mailer = mailer();
        let to = EmailAddress::new("ada@example.com").expect("valid email");
        let envelope = mailer.envelope(&to, "welcome", json!({ "name": "Ada" }));

        assert_eq!(envelope.from, "noreply@palaver.example");
        assert_eq!(envelope.to, "ada@example.com");
        assert_eq!(envelope.template, "welcome");
        assert_eq!(
            envelope.variables.get("name").and_then(Value::as_str),
            Some("Ada")
        );
    }

    #[rstest]
    fn envelopes_serialise_to_the_wire_shape() {
        let mailer = mailer();
        let to = EmailAddress::new("ada@example.com").expect("valid email");
        let envelope = mailer.envelope(&to, "password_reset", json!({ "token": "abc" }));

        let value = serde_json::to_value(&envelope).expect("serialise envelope");
        assert_eq!(
            value.get("template").and_then(Value::as_str),
            Some("password_reset")
        );
        assert!(value.get("variables").is_some());
    }
}
