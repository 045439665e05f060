//! MySQL implementations of the core repository traits.

pub mod appointment_repository_impl;
pub mod payment_repository_impl;
pub mod qr_token_repository_impl;

pub use appointment_repository_impl::MySqlAppointmentRepository;
pub use payment_repository_impl::MySqlPaymentRepository;
pub use qr_token_repository_impl::MySqlQrTokenRepository;
