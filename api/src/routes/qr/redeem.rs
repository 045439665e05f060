//! Handler for GET /r/{token}, the URL embedded in every QR code.
//!
//! Scanners are plain camera apps following a link, so this endpoint
//! never answers with JSON or an error status: every outcome, including
//! store failures, becomes a 303 redirect to a human-readable page.

use actix_web::{http::header, web, HttpResponse};
use serde::Serialize;
use tracing::error;

use bl_core::domain::value_objects::RedemptionOutcome;
use bl_core::repositories::{AppointmentRepository, QrTokenRepository};

use super::AppState;

#[derive(Serialize)]
struct SuccessPage<'a> {
    purpose: &'a str,
    message: &'a str,
}

#[derive(Serialize)]
struct ErrorPage<'a> {
    reason: &'a str,
    message: &'a str,
}

/// Redeem a scanned token and redirect to the outcome page
pub async fn redeem<T, A>(
    state: web::Data<AppState<T, A>>,
    path: web::Path<String>,
) -> HttpResponse
where
    T: QrTokenRepository + 'static,
    A: AppointmentRepository + 'static,
{
    let token_string = path.into_inner();

    let outcome = match state.qr_service.redeem(&token_string).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(error = %err, "redemption failed with store error");
            return redirect(
                &state.flow.scan_error_url,
                &ErrorPage {
                    reason: "unavailable",
                    message: "We could not process this code right now. Please try again.",
                },
            );
        }
    };

    match &outcome {
        RedemptionOutcome::Success { purpose, message } => redirect(
            &state.flow.scan_success_url,
            &SuccessPage {
                purpose: purpose.as_str(),
                message,
            },
        ),
        other => redirect(
            &state.flow.scan_error_url,
            &ErrorPage {
                reason: outcome_reason(other),
                message: &other.user_message(),
            },
        ),
    }
}

/// Stable reason code for the outcome page to switch on
fn outcome_reason(outcome: &RedemptionOutcome) -> &'static str {
    match outcome {
        RedemptionOutcome::Success { .. } => "success",
        RedemptionOutcome::Unknown => "unknown",
        RedemptionOutcome::Expired { .. } => "expired",
        RedemptionOutcome::AlreadyUsed { .. } => "already_used",
        RedemptionOutcome::ProcessingFailed { .. } => "processing_failed",
    }
}

fn redirect<P: Serialize>(base_url: &str, page: &P) -> HttpResponse {
    let location = match serde_urlencoded::to_string(page) {
        Ok(query) => format!("{}?{}", base_url, query),
        Err(_) => base_url.to_string(),
    };

    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}
