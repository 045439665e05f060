//! Domain entities representing core business objects.

pub mod appointment;
pub mod qr_token;

// Re-export commonly used types
pub use appointment::{Appointment, AppointmentStatus};
pub use qr_token::{
    generate_token_string, QrToken, TokenPurpose, CHECK_IN_GRACE_MINUTES, CHECK_IN_LEAD_MINUTES,
    DEFAULT_AD_HOC_MINUTES, MAX_AD_HOC_MINUTES, TOKEN_ENTROPY_BYTES,
};
