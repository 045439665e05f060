//! Main QR token service: issuance and redemption.

use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::entities::appointment::Appointment;
use crate::domain::entities::qr_token::{generate_token_string, QrToken, TokenPurpose};
use crate::domain::value_objects::{CallerIdentity, IssuedQrToken, RedemptionOutcome};
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::repositories::{AppointmentRepository, QrTokenRepository};

use super::actions::ActionRegistry;
use super::clock::Clock;
use super::config::QrServiceConfig;
use super::sweep::close_expired;
use super::window;

/// Issuance request parameters
#[derive(Debug, Clone)]
pub struct IssueRequest {
    /// Action the token should authorize
    pub purpose: TokenPurpose,
    /// Appointment the token is bound to, when the purpose needs one
    pub appointment_id: Option<Uuid>,
    /// Requested validity for ad hoc purposes, in minutes
    pub duration_minutes: Option<i64>,
}

/// Service issuing and redeeming single-use QR tokens
pub struct QrTokenService<T: QrTokenRepository, A: AppointmentRepository> {
    tokens: Arc<T>,
    appointments: Arc<A>,
    registry: Arc<ActionRegistry>,
    clock: Arc<dyn Clock>,
    config: QrServiceConfig,
}

impl<T: QrTokenRepository, A: AppointmentRepository> QrTokenService<T, A> {
    /// Creates a new QR token service instance
    pub fn new(
        tokens: Arc<T>,
        appointments: Arc<A>,
        registry: Arc<ActionRegistry>,
        clock: Arc<dyn Clock>,
        config: QrServiceConfig,
    ) -> Self {
        Self {
            tokens,
            appointments,
            registry,
            clock,
            config,
        }
    }

    /// Redemption URL for a token, ready for QR encoding
    pub fn redeem_url(&self, token: &QrToken) -> String {
        format!("{}/r/{}", self.config.redeem_base_url, token.token)
    }

    /// Issues a token for `(purpose, appointment)` on behalf of `caller`
    ///
    /// Reuses an existing still-valid token for the same pair when its
    /// expiration matches the freshly computed one within the configured
    /// tolerance; a diverging token (e.g. after a schedule change) is
    /// discarded and a fresh one minted.
    pub async fn issue(
        &self,
        request: IssueRequest,
        caller: &CallerIdentity,
    ) -> DomainResult<IssuedQrToken> {
        if request.purpose.is_schedule_bound() && request.appointment_id.is_none() {
            return Err(TokenError::SubjectRequired {
                purpose: request.purpose,
            }
            .into());
        }

        let appointment = match request.appointment_id {
            Some(id) => Some(self.load_appointment(id).await?),
            None => None,
        };

        // Privileged callers issue for any subject; others only for
        // appointments they are a party to, or for themselves when no
        // subject is given.
        if !caller.privileged {
            if let Some(appointment) = &appointment {
                if !appointment.is_party(caller.id) {
                    return Err(DomainError::Forbidden);
                }
            }
        }

        let now = self.clock.now_utc();
        let tz = self.config.time_zone;

        let expires_at = if let Some(appointment) = &appointment {
            if request.purpose.is_schedule_bound() {
                let window = window::check_in_window(
                    appointment.scheduled_at,
                    tz,
                    self.config.check_in_lead_minutes,
                    self.config.check_in_grace_minutes,
                )?;

                if now < window.earliest {
                    return Err(TokenError::OutOfWindowTooEarly {
                        available_at: window.earliest.with_timezone(&tz),
                    }
                    .into());
                }
                if now > window.latest {
                    return Err(TokenError::OutOfWindowTooLate {
                        closed_at: window.latest.with_timezone(&tz),
                    }
                    .into());
                }

                window.latest
            } else {
                self.ad_hoc_expiry(now, request.duration_minutes)
            }
        } else {
            self.ad_hoc_expiry(now, request.duration_minutes)
        };

        if let Some(appointment_id) = request.appointment_id {
            if let Some(existing) = self
                .tokens
                .find_unconsumed(appointment_id, request.purpose)
                .await?
            {
                let drift = (existing.expires_at - expires_at).num_seconds().abs();
                if !existing.is_expired_at(now) && drift <= self.config.reuse_tolerance_seconds {
                    debug!(token_id = %existing.id, "reusing still-valid token");
                    return Ok(IssuedQrToken {
                        redeem_url: self.redeem_url(&existing),
                        token: existing,
                        reused: true,
                    });
                }

                // Stale window (e.g. the appointment moved): discard and
                // remint. Losing this race to a concurrent issuer is benign.
                if !self.tokens.delete_if_unconsumed(existing.id).await? {
                    debug!(token_id = %existing.id, "stale token already gone");
                }
            }
        }

        let token = QrToken::new(
            generate_token_string(),
            request.purpose,
            request.appointment_id,
            caller.id,
            now,
            expires_at,
        );

        let token = self.tokens.insert(token).await?;
        info!(
            token_id = %token.id,
            purpose = %token.purpose,
            expires_at = %token.expires_at,
            "token issued"
        );

        Ok(IssuedQrToken {
            redeem_url: self.redeem_url(&token),
            token,
            reused: false,
        })
    }

    /// Looks up a token for administrative inspection
    pub async fn token_info(&self, token: &str) -> DomainResult<Option<QrToken>> {
        self.tokens.find_by_token(token).await
    }

    /// Redeems a token string, classifying it and dispatching its action
    ///
    /// The token itself is the credential; no authentication is required.
    /// Terminal states come back as `RedemptionOutcome` values; only store
    /// failures travel the `Err` path.
    pub async fn redeem(&self, token_string: &str) -> DomainResult<RedemptionOutcome> {
        let Some(token) = self.tokens.find_by_token(token_string).await? else {
            info!("redemption attempt with unknown token string");
            return Ok(RedemptionOutcome::Unknown);
        };

        let now = self.clock.now_utc();
        let tz = self.config.time_zone;

        // Expiry-on-read: nobody swept this token, so its missed
        // consequence fires now, at discovery time.
        if token.is_expired_at(now) && !token.consumed {
            close_expired(self.tokens.as_ref(), &self.registry, &token, now).await?;
            info!(token_id = %token.id, "expired token closed on read");
            return Ok(RedemptionOutcome::Expired {
                expired_at: token.expires_at.with_timezone(&tz),
                scanned_at: now.with_timezone(&tz),
            });
        }

        if token.consumed {
            return Ok(RedemptionOutcome::AlreadyUsed {
                used_at: token.used_at,
            });
        }

        let Some(handler) = self.registry.get(token.purpose) else {
            // Configuration error; fail closed without consuming
            warn!(purpose = %token.purpose, "no action handler registered");
            return Ok(RedemptionOutcome::ProcessingFailed {
                message: TokenError::UnrecognizedPurpose {
                    purpose: token.purpose.to_string(),
                }
                .to_string(),
            });
        };

        match handler.process(&token).await {
            Ok(message) => {
                // Success consumes; failure above does not. The conditional
                // write decides the winner under concurrent redemption.
                let won = self.tokens.consume_if_unused(&token.token, now).await?;
                if !won {
                    let used_at = self
                        .tokens
                        .find_by_token(&token.token)
                        .await?
                        .and_then(|t| t.used_at);
                    return Ok(RedemptionOutcome::AlreadyUsed { used_at });
                }

                info!(token_id = %token.id, purpose = %token.purpose, "token redeemed");
                Ok(RedemptionOutcome::Success {
                    purpose: token.purpose,
                    message,
                })
            }
            Err(err) => {
                // A concurrent winner may have consumed the token between
                // our read and the handler's conditional write; its effect
                // committed exactly once, so the loser reports the terminal
                // state rather than a retryable failure.
                if let Some(current) = self.tokens.find_by_token(&token.token).await? {
                    if current.consumed {
                        info!(token_id = %token.id, "handler lost redemption race");
                        return Ok(RedemptionOutcome::AlreadyUsed {
                            used_at: current.used_at,
                        });
                    }
                }

                warn!(token_id = %token.id, error = %err, "action processing failed; token left redeemable");
                Ok(RedemptionOutcome::ProcessingFailed {
                    message: err.to_string(),
                })
            }
        }
    }

    async fn load_appointment(&self, id: Uuid) -> DomainResult<Appointment> {
        self.appointments
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                resource: format!("appointment {}", id),
            })
    }

    fn ad_hoc_expiry(
        &self,
        now: chrono::DateTime<chrono::Utc>,
        requested: Option<i64>,
    ) -> chrono::DateTime<chrono::Utc> {
        let minutes = window::clamp_ad_hoc_minutes(
            requested,
            self.config.default_ad_hoc_minutes,
            self.config.max_ad_hoc_minutes,
        );
        window::ad_hoc_window(now, minutes).latest
    }
}
