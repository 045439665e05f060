//! Issuance result handed back to the caller-facing boundary.

use crate::domain::entities::qr_token::QrToken;

/// A freshly issued (or reused) token plus its redemption reference
///
/// The redemption URL is what gets encoded as a scannable image by the
/// external QR renderer; the raw token string never needs to be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedQrToken {
    /// The underlying token record
    pub token: QrToken,

    /// URL embedding the token string, ready for QR encoding
    pub redeem_url: String,

    /// True when an existing still-valid token was returned unchanged
    pub reused: bool,
}
