//! Mail delivery through an HTTP relay.
//!
//! Issued tokens can be mailed to the client on request. Delivery goes
//! through a simple JSON relay endpoint; when no relay is configured the
//! application falls back to [`LogOnlyNotifier`] so the issuance path
//! never depends on mail infrastructure being up.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use bl_core::errors::DomainError;
use bl_core::services::Notifier;

/// Configuration for the HTTP mail relay
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// Relay endpoint accepting a JSON message payload
    pub relay_url: String,
    /// Sender address stamped on outgoing mail
    pub from_address: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl MailerConfig {
    /// Load mailer configuration from environment variables
    ///
    /// Returns `None` when `MAIL_RELAY_URL` is unset, which callers treat
    /// as "mail delivery disabled".
    pub fn from_env() -> Option<Self> {
        let relay_url = env::var("MAIL_RELAY_URL").ok()?;

        Some(Self {
            relay_url,
            from_address: env::var("MAIL_FROM_ADDRESS")
                .unwrap_or_else(|_| "no-reply@bookline.example".to_string()),
            timeout_seconds: env::var("MAIL_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        })
    }
}

#[derive(Serialize)]
struct RelayMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

/// Notifier that posts messages to an HTTP mail relay
pub struct HttpMailer {
    client: reqwest::Client,
    config: MailerConfig,
}

impl HttpMailer {
    /// Create a mailer from its configuration
    pub fn new(config: MailerConfig) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| DomainError::Internal {
                message: format!("failed to build mail client: {}", e),
            })?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl Notifier for HttpMailer {
    async fn deliver(&self, address: &str, subject: &str, body: &str) -> Result<(), DomainError> {
        let message = RelayMessage {
            from: &self.config.from_address,
            to: address,
            subject,
            body,
        };

        let response = self
            .client
            .post(&self.config.relay_url)
            .json(&message)
            .send()
            .await
            .map_err(|e| DomainError::Internal {
                message: format!("mail relay request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(
                to = %mask_address(address),
                status = %status,
                "mail relay rejected message"
            );
            return Err(DomainError::Internal {
                message: format!("mail relay returned status {}", status),
            });
        }

        info!(to = %mask_address(address), "notification delivered");
        Ok(())
    }
}

/// Notifier that only logs, used when no relay is configured
pub struct LogOnlyNotifier;

#[async_trait]
impl Notifier for LogOnlyNotifier {
    async fn deliver(&self, address: &str, subject: &str, _body: &str) -> Result<(), DomainError> {
        info!(
            to = %mask_address(address),
            subject = %subject,
            "mail delivery disabled, dropping notification"
        );
        Ok(())
    }
}

/// Mask an address for logging, keeping only a short prefix
fn mask_address(address: &str) -> String {
    match address.split_once('@') {
        Some((local, domain)) => {
            let visible: String = local.chars().take(2).collect();
            format!("{}***@{}", visible, domain)
        }
        None => {
            let visible: String = address.chars().take(4).collect();
            format!("{}***", visible)
        }
    }
}
