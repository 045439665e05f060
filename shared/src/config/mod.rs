//! Configuration module with business-specific sub-modules
//!
//! Configuration is organized into logical areas:
//! - `server` - HTTP server binding configuration
//! - `qr` - QR token flow configuration (time zone, redemption URLs)
//!
//! All configuration is loaded from environment variables with sensible
//! development defaults; `.env` loading is the binary's responsibility.

pub mod qr;
pub mod server;

pub use qr::QrFlowConfig;
pub use server::ServerConfig;
