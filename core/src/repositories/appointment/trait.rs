//! Appointment repository trait for the slice of appointment state the
//! token flow touches.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::entities::appointment::{Appointment, AppointmentStatus};
use crate::errors::DomainError;

/// Repository trait for appointment lookups and status transitions
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Find an appointment by its ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, DomainError>;

    /// Conditionally transition an appointment's status
    ///
    /// The write applies only when the stored status still equals `from`,
    /// so concurrent redemptions cannot double-apply a transition.
    ///
    /// # Returns
    /// * `Ok(true)` - The transition was applied by this call
    /// * `Ok(false)` - The appointment was unknown or no longer in `from`
    async fn transition_status(
        &self,
        id: Uuid,
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> Result<bool, DomainError>;
}
