//! QR token entity for the single-use check-in/action flow.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use rand::{rngs::OsRng, RngCore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Random bytes backing a token string (256 bits of entropy)
pub const TOKEN_ENTROPY_BYTES: usize = 32;

/// Minutes before the scheduled time a check-in token becomes issuable
pub const CHECK_IN_LEAD_MINUTES: i64 = 30;

/// Minutes after the scheduled time a check-in token stays redeemable
pub const CHECK_IN_GRACE_MINUTES: i64 = 60;

/// Default validity for ad hoc tokens when no duration is requested
pub const DEFAULT_AD_HOC_MINUTES: i64 = 60;

/// Upper bound for caller-supplied ad hoc durations (24 hours)
pub const MAX_AD_HOC_MINUTES: i64 = 1440;

/// Category of action a token authorizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenPurpose {
    /// Appointment check-in at the premises
    CheckIn,
    /// Confirmation of a pending payment
    PaymentConfirmation,
    /// One-off access to a restricted service area
    ServiceAccess,
    /// Redemption of a promotional offer
    SpecialOffer,
}

impl TokenPurpose {
    /// String form used in storage and URLs
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::CheckIn => "check-in",
            TokenPurpose::PaymentConfirmation => "payment-confirmation",
            TokenPurpose::ServiceAccess => "service-access",
            TokenPurpose::SpecialOffer => "special-offer",
        }
    }

    /// Parse the storage string form
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "check-in" => Some(TokenPurpose::CheckIn),
            "payment-confirmation" => Some(TokenPurpose::PaymentConfirmation),
            "service-access" => Some(TokenPurpose::ServiceAccess),
            "special-offer" => Some(TokenPurpose::SpecialOffer),
            _ => None,
        }
    }

    /// Whether the validity window derives from a scheduled appointment
    /// time rather than from the issuance instant
    pub fn is_schedule_bound(&self) -> bool {
        matches!(self, TokenPurpose::CheckIn)
    }
}

impl std::fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generates a fresh token string from the OS CSPRNG
///
/// URL-safe base64 without padding, so the string can ride in a path
/// segment of the redemption URL unescaped.
pub fn generate_token_string() -> String {
    let mut bytes = [0u8; TOKEN_ENTROPY_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Single-use token backing the QR check-in/action flow
///
/// The `token` string is the only client-facing identifier; the `id` is
/// internal to the store and never leaves the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrToken {
    /// Store identity, assigned at creation
    pub id: Uuid,

    /// Opaque random token string, unique across all records
    pub token: String,

    /// Action this token authorizes
    pub purpose: TokenPurpose,

    /// Bound appointment, when the purpose is tied to one
    pub appointment_id: Option<Uuid>,

    /// Caller who requested issuance
    pub issued_by: Uuid,

    /// Instant of creation
    pub issued_at: DateTime<Utc>,

    /// Instant after which redemption must be refused
    pub expires_at: DateTime<Utc>,

    /// Instant of redemption, absent until consumed
    pub used_at: Option<DateTime<Utc>>,

    /// Whether the token has been consumed; never reverts to false
    pub consumed: bool,
}

impl QrToken {
    /// Creates a new unconsumed token
    pub fn new(
        token: String,
        purpose: TokenPurpose,
        appointment_id: Option<Uuid>,
        issued_by: Uuid,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            token,
            purpose,
            appointment_id,
            issued_by,
            issued_at,
            expires_at,
            used_at: None,
            consumed: false,
        }
    }

    /// Whether the validity window has passed at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Whether the token can still be redeemed at `now`
    pub fn is_redeemable(&self, now: DateTime<Utc>) -> bool {
        !self.consumed && now <= self.expires_at
    }

    /// Marks the token consumed
    ///
    /// Consumption is monotonic: calling this on an already consumed token
    /// keeps the original `used_at`.
    pub fn consume(&mut self, at: DateTime<Utc>) {
        if !self.consumed {
            self.consumed = true;
            self.used_at = Some(at);
        }
    }
}
