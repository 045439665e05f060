//! Shared utilities and common types for the Bookline server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types loaded from the environment
//! - Response envelope structures
//! - Common type definitions

pub mod config;
pub mod types;

// Re-export commonly used items at crate root
pub use config::{QrFlowConfig, ServerConfig};
pub use types::{ApiResponse, ErrorResponse};
