//! Value objects carried across service boundaries.

pub mod caller;
pub mod issued_token;
pub mod redemption;

// Re-export commonly used types
pub use caller::CallerIdentity;
pub use issued_token::IssuedQrToken;
pub use redemption::RedemptionOutcome;
