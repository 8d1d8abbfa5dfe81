use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use thiserror::Error;

use crate::messages::MailMessage;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MailerError {
    #[error("relay request failed: {0}")]
    Request(String),
    #[error("relay rejected the message with status {0}")]
    Rejected(u16),
}

/// Transport seam under the dispatcher. One call per message; no retries.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn deliver(&self, to: &str, message: &MailMessage) -> Result<(), MailerError>;
}

#[async_trait]
impl Mailer for Box<dyn Mailer> {
    async fn deliver(&self, to: &str, message: &MailMessage) -> Result<(), MailerError> {
        (**self).deliver(to, message).await
    }
}

/// Fallback transport for deployments without a relay: messages land in the
/// log instead of a mailbox.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn deliver(&self, to: &str, message: &MailMessage) -> Result<(), MailerError> {
        tracing::info!(to, subject = %message.subject, body = %message.body, "mail (log only)");
        Ok(())
    }
}

#[derive(Serialize)]
struct RelayPayload<'a> {
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

/// Posts messages as JSON to a mail relay endpoint.
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    token: Option<SecretString>,
}

impl HttpMailer {
    pub fn new(endpoint: impl Into<String>, token: Option<SecretString>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self { client, endpoint: endpoint.into(), token }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn deliver(&self, to: &str, message: &MailMessage) -> Result<(), MailerError> {
        let payload =
            RelayPayload { to, subject: &message.subject, body: &message.body };

        let mut request = self.client.post(&self.endpoint).json(&payload);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response =
            request.send().await.map_err(|e| MailerError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MailerError::Rejected(response.status().as_u16()));
        }
        Ok(())
    }
}

/// Test transport: records deliveries instead of sending them.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    delivered: Arc<Mutex<Vec<(String, MailMessage)>>>,
}

impl RecordingMailer {
    pub fn delivered(&self) -> Vec<(String, MailMessage)> {
        match self.delivered.lock() {
            Ok(delivered) => delivered.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn deliver(&self, to: &str, message: &MailMessage) -> Result<(), MailerError> {
        match self.delivered.lock() {
            Ok(mut delivered) => delivered.push((to.to_string(), message.clone())),
            Err(poisoned) => poisoned.into_inner().push((to.to_string(), message.clone())),
        }
        Ok(())
    }
}
