//! Payment ledger surface consumed by the payment-confirmation handler.
//!
//! The ledger itself is ordinary bookkeeping outside the token flow; the
//! only capability needed here is flipping a pending payment to confirmed.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::DomainError;

/// Repository trait for payment confirmation
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Confirm the pending payment attached to an appointment
    ///
    /// # Returns
    /// * `Ok(true)` - A pending payment was confirmed by this call
    /// * `Ok(false)` - No pending payment exists for the appointment
    async fn confirm_pending(&self, appointment_id: Uuid) -> Result<bool, DomainError>;
}
