//! Request and response data transfer objects.

pub mod qr_dto;

pub use qr_dto::{IssueTokenRequest, IssuedTokenResponse, TokenInfoResponse};
