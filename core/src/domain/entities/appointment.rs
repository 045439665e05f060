//! Appointment entity, the subject most tokens are bound to.
//!
//! Only the slice of the appointment record the token flow reads and
//! writes is modeled here; catalog and booking details live behind the
//! generic CRUD surfaces of the application.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of an appointment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Booked and waiting for the client
    Scheduled,
    /// Client checked in and was served
    Attended,
    /// Client never checked in inside the window
    NoShow,
    /// Cancelled before the scheduled time
    Cancelled,
}

impl AppointmentStatus {
    /// String form used in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Attended => "attended",
            AppointmentStatus::NoShow => "no_show",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    /// Parse the storage string form
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "scheduled" => Some(AppointmentStatus::Scheduled),
            "attended" => Some(AppointmentStatus::Attended),
            "no_show" => Some(AppointmentStatus::NoShow),
            "cancelled" => Some(AppointmentStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Appointment between a client and a professional
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    /// Unique identifier
    pub id: Uuid,

    /// Client who booked the appointment
    pub client_id: Uuid,

    /// Professional assigned to the appointment
    pub professional_id: Uuid,

    /// Scheduled time as local wall clock in the business time zone
    pub scheduled_at: NaiveDateTime,

    /// Current lifecycle state
    pub status: AppointmentStatus,
}

impl Appointment {
    /// Creates a new scheduled appointment
    pub fn new(
        client_id: Uuid,
        professional_id: Uuid,
        scheduled_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id,
            professional_id,
            scheduled_at,
            status: AppointmentStatus::Scheduled,
        }
    }

    /// Whether `user_id` is a party to this appointment
    pub fn is_party(&self, user_id: Uuid) -> bool {
        self.client_id == user_id || self.professional_id == user_id
    }
}
