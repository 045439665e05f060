//! QR token repository trait defining the interface for token persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::qr_token::{QrToken, TokenPurpose};
use crate::errors::DomainError;

/// Repository trait for QrToken entity persistence operations
///
/// The token store is the only shared mutable resource of the token flow,
/// so the mutating operations here are conditional writes: consumption and
/// discard only apply when the token is still unconsumed, and the caller
/// learns through the return value whether its write won.
#[async_trait]
pub trait QrTokenRepository: Send + Sync {
    /// Insert a freshly minted token
    ///
    /// # Returns
    /// * `Ok(QrToken)` - The persisted token
    /// * `Err(DomainError::Token(TokenCollision))` - The token string
    ///   already exists; issuance must fail hard rather than overwrite
    async fn insert(&self, token: QrToken) -> Result<QrToken, DomainError>;

    /// Find a token by its client-facing token string
    async fn find_by_token(&self, token: &str) -> Result<Option<QrToken>, DomainError>;

    /// Find the most recent unconsumed token for an (appointment, purpose) pair
    ///
    /// Backs the issuer's reuse check; consumed tokens never surface here.
    async fn find_unconsumed(
        &self,
        appointment_id: Uuid,
        purpose: TokenPurpose,
    ) -> Result<Option<QrToken>, DomainError>;

    /// Conditionally mark a token consumed (update-if-unconsumed)
    ///
    /// # Returns
    /// * `Ok(true)` - This call flipped the token to consumed
    /// * `Ok(false)` - The token was unknown or another writer won the race
    async fn consume_if_unused(
        &self,
        token: &str,
        used_at: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Conditionally delete a stale token (delete-if-unconsumed)
    ///
    /// Used by the issuer's discard-and-remint path; losing this race is
    /// benign and callers proceed to mint regardless.
    async fn delete_if_unconsumed(&self, id: Uuid) -> Result<bool, DomainError>;

    /// Unconsumed tokens whose expiry passed before `now`, oldest first
    ///
    /// Batch feed for the expiry sweep.
    async fn find_expired_unconsumed(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<QrToken>, DomainError>;
}
