//! Mock implementation of AppointmentRepository for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::appointment::{Appointment, AppointmentStatus};
use crate::errors::DomainError;

use super::r#trait::AppointmentRepository;

/// Mock appointment repository for testing
pub struct MockAppointmentRepository {
    appointments: Arc<RwLock<HashMap<Uuid, Appointment>>>,
}

impl MockAppointmentRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            appointments: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Seed an appointment
    pub async fn insert(&self, appointment: Appointment) {
        self.appointments
            .write()
            .await
            .insert(appointment.id, appointment);
    }

    /// Overwrite an appointment, e.g. to simulate a schedule change
    pub async fn update(&self, appointment: Appointment) {
        self.insert(appointment).await;
    }

    /// Current state of an appointment
    pub async fn get(&self, id: Uuid) -> Option<Appointment> {
        self.appointments.read().await.get(&id).cloned()
    }
}

impl Default for MockAppointmentRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AppointmentRepository for MockAppointmentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, DomainError> {
        let appointments = self.appointments.read().await;
        Ok(appointments.get(&id).cloned())
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> Result<bool, DomainError> {
        let mut appointments = self.appointments.write().await;

        match appointments.get_mut(&id) {
            Some(appointment) if appointment.status == from => {
                appointment.status = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_appointment() -> Appointment {
        Appointment::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2026, 6, 14)
                .unwrap()
                .and_hms_opt(14, 0, 0)
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_transition_applies_once() {
        let repo = MockAppointmentRepository::new();
        let appointment = sample_appointment();
        let id = appointment.id;
        repo.insert(appointment).await;

        assert!(repo
            .transition_status(id, AppointmentStatus::Scheduled, AppointmentStatus::Attended)
            .await
            .unwrap());

        // Second attempt finds the appointment no longer scheduled
        assert!(!repo
            .transition_status(id, AppointmentStatus::Scheduled, AppointmentStatus::Attended)
            .await
            .unwrap());

        assert_eq!(
            repo.get(id).await.unwrap().status,
            AppointmentStatus::Attended
        );
    }

    #[tokio::test]
    async fn test_transition_unknown_appointment_is_a_no_op() {
        let repo = MockAppointmentRepository::new();
        assert!(!repo
            .transition_status(
                Uuid::new_v4(),
                AppointmentStatus::Scheduled,
                AppointmentStatus::NoShow
            )
            .await
            .unwrap());
    }
}
