//! MySQL implementation of the AppointmentRepository trait.
//!
//! Backing table `appointments`: `id CHAR(36) PRIMARY KEY`,
//! `client_id CHAR(36) NOT NULL`, `professional_id CHAR(36) NOT NULL`,
//! `scheduled_at DATETIME NOT NULL` (local wall clock, no offset),
//! `status VARCHAR(16) NOT NULL`.
//!
//! Status updates carry `AND status = ?` so the affected-row count tells
//! the caller whether this call performed the transition.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use bl_core::domain::entities::appointment::{Appointment, AppointmentStatus};
use bl_core::errors::DomainError;
use bl_core::repositories::AppointmentRepository;

/// MySQL implementation of AppointmentRepository
pub struct MySqlAppointmentRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlAppointmentRepository {
    /// Create a new MySQL appointment repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert a database row to an Appointment entity
    fn row_to_appointment(row: &sqlx::mysql::MySqlRow) -> Result<Appointment, DomainError> {
        let id: String = row.try_get("id").map_err(|e| DomainError::Database {
            message: format!("failed to get id: {}", e),
        })?;
        let client_id: String = row
            .try_get("client_id")
            .map_err(|e| DomainError::Database {
                message: format!("failed to get client_id: {}", e),
            })?;
        let professional_id: String =
            row.try_get("professional_id").map_err(|e| DomainError::Database {
                message: format!("failed to get professional_id: {}", e),
            })?;
        let status: String = row
            .try_get("status")
            .map_err(|e| DomainError::Database {
                message: format!("failed to get status: {}", e),
            })?;

        Ok(Appointment {
            id: Uuid::parse_str(&id).map_err(|e| DomainError::Database {
                message: format!("invalid appointment UUID: {}", e),
            })?,
            client_id: Uuid::parse_str(&client_id).map_err(|e| DomainError::Database {
                message: format!("invalid client UUID: {}", e),
            })?,
            professional_id: Uuid::parse_str(&professional_id).map_err(|e| {
                DomainError::Database {
                    message: format!("invalid professional UUID: {}", e),
                }
            })?,
            scheduled_at: row
                .try_get::<NaiveDateTime, _>("scheduled_at")
                .map_err(|e| DomainError::Database {
                    message: format!("failed to get scheduled_at: {}", e),
                })?,
            status: AppointmentStatus::parse(&status).ok_or_else(|| DomainError::Database {
                message: format!("unknown appointment status in store: {}", status),
            })?,
        })
    }
}

#[async_trait]
impl AppointmentRepository for MySqlAppointmentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, DomainError> {
        let query = r#"
            SELECT id, client_id, professional_id, scheduled_at, status
            FROM appointments
            WHERE id = ?
            LIMIT 1
        "#;

        let result = sqlx::query(query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Database {
                message: format!("failed to find appointment: {}", e),
            })?;

        match result {
            Some(row) => Ok(Some(Self::row_to_appointment(&row)?)),
            None => Ok(None),
        }
    }

    async fn transition_status(
        &self,
        id: Uuid,
        from: AppointmentStatus,
        to: AppointmentStatus,
    ) -> Result<bool, DomainError> {
        let query = "UPDATE appointments SET status = ? WHERE id = ? AND status = ?";

        let result = sqlx::query(query)
            .bind(to.as_str())
            .bind(id.to_string())
            .bind(from.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Database {
                message: format!("failed to transition appointment status: {}", e),
            })?;

        Ok(result.rows_affected() == 1)
    }
}
