//! Handler for GET /api/v1/qr/tokens/{token}/image

use actix_web::{web, HttpRequest, HttpResponse};

use bl_core::errors::DomainError;
use bl_core::repositories::{AppointmentRepository, QrTokenRepository};

use crate::handlers::domain_error_response;

use super::{caller_from_request, AppState};

/// Render a token's redemption URL as a QR image
///
/// Available to any authenticated caller holding the token string; the
/// string itself is the credential, the image just re-encodes it.
pub async fn token_image<T, A>(
    req: HttpRequest,
    state: web::Data<AppState<T, A>>,
    path: web::Path<String>,
) -> HttpResponse
where
    T: QrTokenRepository + 'static,
    A: AppointmentRepository + 'static,
{
    if let Err(err) = caller_from_request(&req) {
        return domain_error_response(&err);
    }

    let token_string = path.into_inner();
    let token = match state.qr_service.token_info(&token_string).await {
        Ok(Some(token)) => token,
        Ok(None) => {
            return domain_error_response(&DomainError::NotFound {
                resource: "token".to_string(),
            })
        }
        Err(err) => return domain_error_response(&err),
    };

    let redeem_url = state.qr_service.redeem_url(&token);
    match state.renderer.encode(&redeem_url) {
        Ok(bytes) => HttpResponse::Ok()
            .content_type(state.renderer.content_type())
            .body(bytes),
        Err(err) => domain_error_response(&err),
    }
}
