//! Redemption outcomes returned by the token validator.
//!
//! Every terminal state of a scan is a value here, not an error: the
//! redemption surface always answers, and only infrastructure failures
//! travel the `Err` path.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::domain::entities::qr_token::TokenPurpose;

/// Format used when rendering instants to people scanning a code
const LOCAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M %Z";

/// Outcome of presenting a token string for redemption
#[derive(Debug, Clone, PartialEq)]
pub enum RedemptionOutcome {
    /// The token was valid, its action ran, and it is now consumed
    Success {
        purpose: TokenPurpose,
        message: String,
    },

    /// No token with that string exists
    Unknown,

    /// The validity window had passed; the token is now closed
    Expired {
        /// Expiration instant in the business time zone
        expired_at: DateTime<Tz>,
        /// Scan instant in the business time zone
        scanned_at: DateTime<Tz>,
    },

    /// The token was already consumed earlier
    AlreadyUsed { used_at: Option<DateTime<Utc>> },

    /// The action handler failed; the token stays redeemable
    ProcessingFailed { message: String },
}

impl RedemptionOutcome {
    /// Whether the outcome closed the token for good
    ///
    /// `ProcessingFailed` is the one retryable case: the side effect did
    /// not commit, so the token was deliberately left unconsumed.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RedemptionOutcome::ProcessingFailed { .. })
    }

    /// Explanatory message for the outcome page
    pub fn user_message(&self) -> String {
        match self {
            RedemptionOutcome::Success { message, .. } => message.clone(),
            RedemptionOutcome::Unknown => {
                "This code is not recognized. Please request a new one.".to_string()
            }
            RedemptionOutcome::Expired {
                expired_at,
                scanned_at,
            } => format!(
                "This code expired at {} (scanned at {}).",
                expired_at.format(LOCAL_TIME_FORMAT),
                scanned_at.format(LOCAL_TIME_FORMAT)
            ),
            RedemptionOutcome::AlreadyUsed { used_at } => match used_at {
                Some(at) => format!(
                    "This code was already used on {}.",
                    at.format("%Y-%m-%d %H:%M UTC")
                ),
                None => "This code was already used.".to_string(),
            },
            RedemptionOutcome::ProcessingFailed { message } => format!(
                "We could not complete this action: {}. Please scan again.",
                message
            ),
        }
    }
}
