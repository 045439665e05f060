//! MySQL implementation of the PaymentRepository trait.
//!
//! Backing table `payments`: `id CHAR(36) PRIMARY KEY`,
//! `appointment_id CHAR(36) NOT NULL`, `status VARCHAR(16) NOT NULL`,
//! plus ledger columns the token flow never reads.

use async_trait::async_trait;
use sqlx::MySqlPool;
use uuid::Uuid;

use bl_core::errors::DomainError;
use bl_core::repositories::PaymentRepository;

/// MySQL implementation of PaymentRepository
pub struct MySqlPaymentRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlPaymentRepository {
    /// Create a new MySQL payment repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PaymentRepository for MySqlPaymentRepository {
    async fn confirm_pending(&self, appointment_id: Uuid) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE payments
            SET status = 'confirmed', confirmed_at = NOW()
            WHERE appointment_id = ? AND status = 'pending'
        "#;

        let result = sqlx::query(query)
            .bind(appointment_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Database {
                message: format!("failed to confirm payment: {}", e),
            })?;

        Ok(result.rows_affected() >= 1)
    }
}
