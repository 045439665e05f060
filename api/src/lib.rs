//! # Bookline API
//!
//! HTTP layer exposing the QR token flow: issuance, inspection, image
//! rendering, and the public redemption endpoint scanners land on.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod routes;
