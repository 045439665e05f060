//! # Bookline Infrastructure
//!
//! Concrete implementations of the core repository traits and collaborator
//! seams: MySQL persistence via SQLx, QR image rendering, and outbound
//! notification delivery.

pub mod database;
pub mod notify;
pub mod qr;

// Re-export commonly used types
pub use database::mysql::{
    MySqlAppointmentRepository, MySqlPaymentRepository, MySqlQrTokenRepository,
};
pub use notify::{HttpMailer, LogOnlyNotifier, MailerConfig};
pub use qr::SvgQrRenderer;
