//! Business services containing domain logic and use cases.

pub mod qr;

// Re-export commonly used types
pub use qr::{
    ActionHandler, ActionRegistry, CheckInHandler, Clock, IssueRequest, Notifier,
    PaymentConfirmationHandler, QrRenderer, QrServiceConfig, QrTokenService, QrTokenSweeper,
    ServiceAccessHandler, SpecialOfferHandler, SweepConfig, SweepResult, SystemClock,
};
