//! Collaborator seams consumed by the QR token flow.

use async_trait::async_trait;

use crate::errors::DomainError;

/// Renders text as a scannable image
pub trait QrRenderer: Send + Sync {
    /// Encode `text` as an image, returning the raw image bytes
    fn encode(&self, text: &str) -> Result<Vec<u8>, DomainError>;

    /// MIME type of the produced image
    fn content_type(&self) -> &'static str;
}

/// Delivers a rendered message to an address
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `body` with `subject` to `address`
    async fn deliver(&self, address: &str, subject: &str, body: &str) -> Result<(), DomainError>;
}
