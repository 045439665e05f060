//! DTOs for the QR token endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use bl_core::domain::entities::qr_token::{QrToken, TokenPurpose};
use bl_core::domain::value_objects::IssuedQrToken;

/// Request body for POST /api/v1/qr/tokens
///
/// `duration_minutes` only applies to purposes without a bound schedule;
/// out-of-range values are clamped rather than rejected, so the field
/// carries no range validation here.
#[derive(Debug, Deserialize, Validate)]
pub struct IssueTokenRequest {
    /// Action the token should authorize (kebab-case purpose name)
    #[validate(length(min = 1, message = "purpose must not be empty"))]
    pub purpose: String,

    /// Appointment the token is bound to
    pub appointment_id: Option<Uuid>,

    /// Requested validity in minutes for ad hoc purposes
    pub duration_minutes: Option<i64>,

    /// Address to mail the QR code to, when delivery is wanted
    #[validate(email(message = "notify_address must be a valid email address"))]
    pub notify_address: Option<String>,
}

/// Response body for a successfully issued token
#[derive(Debug, Serialize, Deserialize)]
pub struct IssuedTokenResponse {
    /// The opaque token string
    pub token: String,

    /// Purpose the token authorizes
    pub purpose: TokenPurpose,

    /// Bound appointment, when the purpose has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<Uuid>,

    /// Expiration instant (UTC)
    pub expires_at: DateTime<Utc>,

    /// Redemption URL, ready for QR encoding
    pub redeem_url: String,

    /// Whether an existing still-valid token was returned
    pub reused: bool,
}

impl From<IssuedQrToken> for IssuedTokenResponse {
    fn from(issued: IssuedQrToken) -> Self {
        Self {
            token: issued.token.token,
            purpose: issued.token.purpose,
            appointment_id: issued.token.appointment_id,
            expires_at: issued.token.expires_at,
            redeem_url: issued.redeem_url,
            reused: issued.reused,
        }
    }
}

/// Response body for the administrative token inspection endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenInfoResponse {
    /// The opaque token string
    pub token: String,

    /// Purpose the token authorizes
    pub purpose: TokenPurpose,

    /// Bound appointment, when the purpose has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<Uuid>,

    /// User who requested issuance
    pub issued_by: Uuid,

    /// Issuance instant (UTC)
    pub issued_at: DateTime<Utc>,

    /// Expiration instant (UTC)
    pub expires_at: DateTime<Utc>,

    /// Consumption instant, when the token has been consumed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_at: Option<DateTime<Utc>>,

    /// Whether the token has been consumed
    pub consumed: bool,
}

impl From<QrToken> for TokenInfoResponse {
    fn from(token: QrToken) -> Self {
        Self {
            token: token.token,
            purpose: token.purpose,
            appointment_id: token.appointment_id,
            issued_by: token.issued_by,
            issued_at: token.issued_at,
            expires_at: token.expires_at,
            used_at: token.used_at,
            consumed: token.consumed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_request_rejects_empty_purpose() {
        let request = IssueTokenRequest {
            purpose: String::new(),
            appointment_id: None,
            duration_minutes: None,
            notify_address: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_issue_request_rejects_malformed_address() {
        let request = IssueTokenRequest {
            purpose: "special-offer".to_string(),
            appointment_id: None,
            duration_minutes: Some(120),
            notify_address: Some("not-an-address".to_string()),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_issue_request_accepts_valid_payload() {
        let request = IssueTokenRequest {
            purpose: "check-in".to_string(),
            appointment_id: Some(Uuid::new_v4()),
            duration_minutes: None,
            notify_address: Some("client@example.com".to_string()),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_issued_response_omits_missing_appointment() {
        let response = IssuedTokenResponse {
            token: "abc".to_string(),
            purpose: TokenPurpose::SpecialOffer,
            appointment_id: None,
            expires_at: Utc::now(),
            redeem_url: "http://localhost:8080/r/abc".to_string(),
            reused: false,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("appointment_id"));
        assert!(json.contains("special-offer"));
    }
}
