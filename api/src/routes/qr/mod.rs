//! QR token routes: issuance, inspection, image rendering, redemption.

pub mod image;
pub mod info;
pub mod issue;
pub mod redeem;

use std::sync::Arc;

use actix_web::HttpRequest;
use uuid::Uuid;

use bl_core::errors::DomainError;
use bl_core::domain::value_objects::CallerIdentity;
use bl_core::repositories::{AppointmentRepository, QrTokenRepository};
use bl_core::services::{Notifier, QrRenderer, QrTokenService};
use bl_shared::config::QrFlowConfig;

/// Header carrying the authenticated user identity, set by the gateway
pub const CALLER_ID_HEADER: &str = "X-Caller-Id";

/// Header marking staff/admin callers, set by the gateway
pub const CALLER_PRIVILEGED_HEADER: &str = "X-Caller-Privileged";

/// Shared application state for the QR routes
pub struct AppState<T, A>
where
    T: QrTokenRepository,
    A: AppointmentRepository,
{
    /// Token issuance and redemption service
    pub qr_service: Arc<QrTokenService<T, A>>,

    /// QR image renderer
    pub renderer: Arc<dyn QrRenderer>,

    /// Outbound notification delivery
    pub notifier: Arc<dyn Notifier>,

    /// Redirect targets for the redemption endpoint
    pub flow: QrFlowConfig,
}

/// Extract the caller identity from the gateway-set headers
///
/// Authentication itself happens upstream; an absent or malformed
/// identity header is a validation failure here, not an auth one.
pub fn caller_from_request(req: &HttpRequest) -> Result<CallerIdentity, DomainError> {
    let id = req
        .headers()
        .get(CALLER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| DomainError::Validation {
            message: format!("missing {} header", CALLER_ID_HEADER),
        })?;

    let id = Uuid::parse_str(id).map_err(|_| DomainError::Validation {
        message: format!("{} header is not a valid UUID", CALLER_ID_HEADER),
    })?;

    let privileged = req
        .headers()
        .get(CALLER_PRIVILEGED_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    Ok(if privileged {
        CallerIdentity::privileged(id)
    } else {
        CallerIdentity::user(id)
    })
}
