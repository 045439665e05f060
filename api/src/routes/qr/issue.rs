//! Handler for POST /api/v1/qr/tokens

use actix_web::{web, HttpRequest, HttpResponse};
use tracing::{info, warn};
use validator::Validate;

use bl_core::domain::entities::qr_token::TokenPurpose;
use bl_core::errors::{DomainError, TokenError};
use bl_core::repositories::{AppointmentRepository, QrTokenRepository};
use bl_core::services::IssueRequest;
use bl_shared::ApiResponse;

use crate::dto::{IssueTokenRequest, IssuedTokenResponse};
use crate::handlers::domain_error_response;

use super::{caller_from_request, AppState};

/// Issue a QR token for the caller
///
/// Returns 201 with the token and its redemption URL. Re-requesting the
/// same `(appointment, purpose)` pair while a valid token exists returns
/// that token with `reused: true` instead of minting a second one.
pub async fn issue_token<T, A>(
    req: HttpRequest,
    state: web::Data<AppState<T, A>>,
    body: web::Json<IssueTokenRequest>,
) -> HttpResponse
where
    T: QrTokenRepository + 'static,
    A: AppointmentRepository + 'static,
{
    if let Err(errors) = body.validate() {
        return domain_error_response(&DomainError::Validation {
            message: errors.to_string(),
        });
    }

    let caller = match caller_from_request(&req) {
        Ok(caller) => caller,
        Err(err) => return domain_error_response(&err),
    };

    let Some(purpose) = TokenPurpose::parse(&body.purpose) else {
        return domain_error_response(
            &TokenError::UnrecognizedPurpose {
                purpose: body.purpose.clone(),
            }
            .into(),
        );
    };

    let request = IssueRequest {
        purpose,
        appointment_id: body.appointment_id,
        duration_minutes: body.duration_minutes,
    };

    let issued = match state.qr_service.issue(request, &caller).await {
        Ok(issued) => issued,
        Err(err) => return domain_error_response(&err),
    };

    // Delivery is best effort; a relay outage must not fail issuance.
    if let Some(address) = &body.notify_address {
        let mail_body = format!(
            "Scan the attached QR code or open {} to complete your {}.",
            issued.redeem_url, issued.token.purpose
        );
        if let Err(err) = state
            .notifier
            .deliver(address, "Your Bookline QR code", &mail_body)
            .await
        {
            warn!(token_id = %issued.token.id, error = %err, "token notification failed");
        }
    }

    info!(
        token_id = %issued.token.id,
        reused = issued.reused,
        "token issuance request completed"
    );

    HttpResponse::Created().json(ApiResponse::success(IssuedTokenResponse::from(issued)))
}
