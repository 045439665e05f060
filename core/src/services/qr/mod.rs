//! QR token service module
//!
//! This module owns the time-bounded single-use token flow behind the QR
//! check-in/action feature:
//! - Window policy computing issuance/redemption windows
//! - Token issuance with idempotent reuse and discard-and-remint
//! - Redemption with expiry-on-read and action dispatch
//! - Background sweep proactively closing expired tokens

mod actions;
mod clock;
mod config;
mod service;
mod sweep;
mod traits;
pub mod window;

#[cfg(test)]
mod tests;

pub use actions::{
    ActionHandler, ActionRegistry, CheckInHandler, PaymentConfirmationHandler,
    ServiceAccessHandler, SpecialOfferHandler,
};
pub use clock::{Clock, SystemClock};
pub use config::QrServiceConfig;
pub use service::{IssueRequest, QrTokenService};
pub use sweep::{QrTokenSweeper, SweepConfig, SweepResult};
pub use traits::{Notifier, QrRenderer};
