//! Outbound notification delivery.

pub mod mailer;

pub use mailer::{HttpMailer, LogOnlyNotifier, MailerConfig};
