//! Action processors dispatched on token redemption.
//!
//! Each purpose has one handler implementing the domain effect of a
//! successful scan plus the consequence of a missed (expired unredeemed)
//! token. Handlers are registered in an `ActionRegistry`, so adding a
//! purpose is a one-place change instead of scattered purpose checks.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::entities::appointment::AppointmentStatus;
use crate::domain::entities::qr_token::{QrToken, TokenPurpose};
use crate::errors::{DomainError, TokenError};
use crate::repositories::{AppointmentRepository, PaymentRepository};

/// Handler for one token purpose
///
/// Handler failures are caught by the redeemer and surface as the
/// retryable `ProcessingFailed` outcome; they never consume the token and
/// never escape the redemption path.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    /// Purpose this handler serves
    fn purpose(&self) -> TokenPurpose;

    /// Apply the purpose's domain effect for a valid token
    ///
    /// # Returns
    /// * `Ok(String)` - Human-readable outcome message for the scanner
    /// * `Err(DomainError)` - Effect did not commit; redemption is retryable
    async fn process(&self, token: &QrToken) -> Result<String, DomainError>;

    /// Consequence applied when an unredeemed token is found expired
    ///
    /// Default is no consequence; check-in overrides this to record the
    /// no-show.
    async fn on_expired(&self, _token: &QrToken) -> Result<(), DomainError> {
        Ok(())
    }
}

/// Dispatch table keyed by token purpose
#[derive(Default)]
pub struct ActionRegistry {
    handlers: HashMap<TokenPurpose, Arc<dyn ActionHandler>>,
}

impl ActionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler under its own purpose
    pub fn register(&mut self, handler: Arc<dyn ActionHandler>) {
        self.handlers.insert(handler.purpose(), handler);
    }

    /// Handler for a purpose, if one is registered
    pub fn get(&self, purpose: TokenPurpose) -> Option<&Arc<dyn ActionHandler>> {
        self.handlers.get(&purpose)
    }

    /// Registry with the full production handler set
    pub fn with_defaults<A, P>(appointments: Arc<A>, payments: Arc<P>) -> Self
    where
        A: AppointmentRepository + 'static,
        P: PaymentRepository + 'static,
    {
        let mut registry = Self::new();
        registry.register(Arc::new(CheckInHandler::new(appointments)));
        registry.register(Arc::new(PaymentConfirmationHandler::new(payments)));
        registry.register(Arc::new(ServiceAccessHandler));
        registry.register(Arc::new(SpecialOfferHandler));
        registry
    }
}

fn require_subject(token: &QrToken) -> Result<Uuid, DomainError> {
    token.appointment_id.ok_or_else(|| {
        TokenError::SubjectRequired {
            purpose: token.purpose,
        }
        .into()
    })
}

/// Check-in: transitions the bound appointment to attended
pub struct CheckInHandler<A: AppointmentRepository> {
    appointments: Arc<A>,
}

impl<A: AppointmentRepository> CheckInHandler<A> {
    pub fn new(appointments: Arc<A>) -> Self {
        Self { appointments }
    }
}

#[async_trait]
impl<A: AppointmentRepository> ActionHandler for CheckInHandler<A> {
    fn purpose(&self) -> TokenPurpose {
        TokenPurpose::CheckIn
    }

    async fn process(&self, token: &QrToken) -> Result<String, DomainError> {
        let appointment_id = require_subject(token)?;

        let appointment = self
            .appointments
            .find_by_id(appointment_id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                resource: format!("appointment {}", appointment_id),
            })?;

        let applied = self
            .appointments
            .transition_status(
                appointment_id,
                AppointmentStatus::Scheduled,
                AppointmentStatus::Attended,
            )
            .await?;

        if !applied {
            return Err(DomainError::Validation {
                message: format!(
                    "appointment {} is {} and cannot be checked in",
                    appointment_id, appointment.status
                ),
            });
        }

        info!(appointment_id = %appointment_id, "appointment checked in");
        Ok("Check-in confirmed. Enjoy your appointment!".to_string())
    }

    async fn on_expired(&self, token: &QrToken) -> Result<(), DomainError> {
        let appointment_id = require_subject(token)?;

        let applied = self
            .appointments
            .transition_status(
                appointment_id,
                AppointmentStatus::Scheduled,
                AppointmentStatus::NoShow,
            )
            .await?;

        if applied {
            info!(appointment_id = %appointment_id, "missed check-in recorded as no-show");
        } else {
            debug!(appointment_id = %appointment_id, "no-show not applicable, appointment already moved on");
        }

        Ok(())
    }
}

/// Payment confirmation: flips the appointment's pending payment
pub struct PaymentConfirmationHandler<P: PaymentRepository> {
    payments: Arc<P>,
}

impl<P: PaymentRepository> PaymentConfirmationHandler<P> {
    pub fn new(payments: Arc<P>) -> Self {
        Self { payments }
    }
}

#[async_trait]
impl<P: PaymentRepository> ActionHandler for PaymentConfirmationHandler<P> {
    fn purpose(&self) -> TokenPurpose {
        TokenPurpose::PaymentConfirmation
    }

    async fn process(&self, token: &QrToken) -> Result<String, DomainError> {
        let appointment_id = require_subject(token)?;

        let confirmed = self.payments.confirm_pending(appointment_id).await?;
        if !confirmed {
            return Err(DomainError::Validation {
                message: format!("no pending payment for appointment {}", appointment_id),
            });
        }

        info!(appointment_id = %appointment_id, "payment confirmed");
        Ok("Payment confirmed. Thank you!".to_string())
    }
}

/// Service access: grants one-off access to a restricted area
pub struct ServiceAccessHandler;

#[async_trait]
impl ActionHandler for ServiceAccessHandler {
    fn purpose(&self) -> TokenPurpose {
        TokenPurpose::ServiceAccess
    }

    async fn process(&self, token: &QrToken) -> Result<String, DomainError> {
        info!(issued_by = %token.issued_by, "service access granted");
        Ok("Access granted. Welcome!".to_string())
    }
}

/// Special offer: applies a promotional discount to the next booking
pub struct SpecialOfferHandler;

#[async_trait]
impl ActionHandler for SpecialOfferHandler {
    fn purpose(&self) -> TokenPurpose {
        TokenPurpose::SpecialOffer
    }

    async fn process(&self, token: &QrToken) -> Result<String, DomainError> {
        info!(issued_by = %token.issued_by, "promotional offer redeemed");
        Ok("Promotional offer applied to your next booking.".to_string())
    }
}
