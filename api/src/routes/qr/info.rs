//! Handler for GET /api/v1/qr/tokens/{token}

use actix_web::{web, HttpRequest, HttpResponse};

use bl_core::errors::DomainError;
use bl_core::repositories::{AppointmentRepository, QrTokenRepository};
use bl_shared::ApiResponse;

use crate::dto::TokenInfoResponse;
use crate::handlers::domain_error_response;

use super::{caller_from_request, AppState};

/// Inspect a token without redeeming it
///
/// Administrative surface: restricted to privileged callers so the token
/// strings themselves stay capability-like for everyone else.
pub async fn token_info<T, A>(
    req: HttpRequest,
    state: web::Data<AppState<T, A>>,
    path: web::Path<String>,
) -> HttpResponse
where
    T: QrTokenRepository + 'static,
    A: AppointmentRepository + 'static,
{
    let caller = match caller_from_request(&req) {
        Ok(caller) => caller,
        Err(err) => return domain_error_response(&err),
    };

    if !caller.privileged {
        return domain_error_response(&DomainError::Forbidden);
    }

    let token_string = path.into_inner();
    match state.qr_service.token_info(&token_string).await {
        Ok(Some(token)) => {
            HttpResponse::Ok().json(ApiResponse::success(TokenInfoResponse::from(token)))
        }
        Ok(None) => domain_error_response(&DomainError::NotFound {
            resource: "token".to_string(),
        }),
        Err(err) => domain_error_response(&err),
    }
}
