//! Token flow error types.
//!
//! Issuance-time failures are errors; terminal redemption states are
//! values of `RedemptionOutcome` instead, so they can always reach the
//! scanning user as an explanatory page.

use chrono::DateTime;
use chrono_tz::Tz;
use thiserror::Error;

use crate::domain::entities::qr_token::TokenPurpose;

/// Token issuance and dispatch errors
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("issuance is not open yet; available at {available_at}")]
    OutOfWindowTooEarly { available_at: DateTime<Tz> },

    #[error("the redemption window closed at {closed_at}")]
    OutOfWindowTooLate { closed_at: DateTime<Tz> },

    #[error("purpose {purpose} requires a bound appointment")]
    SubjectRequired { purpose: TokenPurpose },

    #[error("unrecognized token purpose: {purpose}")]
    UnrecognizedPurpose { purpose: String },

    #[error("generated token string collided with an existing token")]
    TokenCollision,
}

impl TokenError {
    /// Stable error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            TokenError::OutOfWindowTooEarly { .. } => "OUT_OF_WINDOW_TOO_EARLY",
            TokenError::OutOfWindowTooLate { .. } => "OUT_OF_WINDOW_TOO_LATE",
            TokenError::SubjectRequired { .. } => "SUBJECT_REQUIRED",
            TokenError::UnrecognizedPurpose { .. } => "UNRECOGNIZED_PURPOSE",
            TokenError::TokenCollision => "TOKEN_COLLISION",
        }
    }
}
