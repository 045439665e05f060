//! Mapping of domain errors onto HTTP responses.

use actix_web::HttpResponse;
use tracing::error;

use bl_core::errors::{DomainError, TokenError};
use bl_shared::ErrorResponse;

/// Convert a domain error into an HTTP response with the matching status
///
/// Store and internal failures are logged here and surfaced with a
/// generic message; everything else carries its own explanation.
pub fn domain_error_response(err: &DomainError) -> HttpResponse {
    match err {
        DomainError::Validation { .. } => {
            HttpResponse::BadRequest().json(ErrorResponse::new(err.error_code(), err.to_string()))
        }
        DomainError::NotFound { .. } => {
            HttpResponse::NotFound().json(ErrorResponse::new(err.error_code(), err.to_string()))
        }
        DomainError::Forbidden => {
            HttpResponse::Forbidden().json(ErrorResponse::new(
                err.error_code(),
                "You are not allowed to perform this action",
            ))
        }
        DomainError::Token(token_err) => token_error_response(token_err),
        DomainError::Database { .. } | DomainError::Internal { .. } => {
            error!(error = %err, "request failed with store or internal error");
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                err.error_code(),
                "An internal error occurred. Please try again later.",
            ))
        }
    }
}

fn token_error_response(err: &TokenError) -> HttpResponse {
    match err {
        // The window exists but the request is outside it
        TokenError::OutOfWindowTooEarly { .. } | TokenError::OutOfWindowTooLate { .. } => {
            HttpResponse::Conflict().json(ErrorResponse::new(err.error_code(), err.to_string()))
        }
        TokenError::SubjectRequired { .. } | TokenError::UnrecognizedPurpose { .. } => {
            HttpResponse::BadRequest().json(ErrorResponse::new(err.error_code(), err.to_string()))
        }
        TokenError::TokenCollision => {
            error!("token string collision on insert");
            HttpResponse::InternalServerError().json(ErrorResponse::new(
                err.error_code(),
                "Token generation failed. Please retry the request.",
            ))
        }
    }
}
