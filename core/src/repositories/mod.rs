//! Repository interfaces for persistence operations.

pub mod appointment;
pub mod payment;
pub mod qr_token;

// Re-export commonly used traits
pub use appointment::AppointmentRepository;
pub use payment::PaymentRepository;
pub use qr_token::QrTokenRepository;
