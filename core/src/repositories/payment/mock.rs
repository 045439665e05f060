//! Mock implementation of PaymentRepository for testing

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::DomainError;

use super::r#trait::PaymentRepository;

/// Mock payment repository for testing
pub struct MockPaymentRepository {
    pending: Arc<RwLock<HashSet<Uuid>>>,
    confirmed: Arc<RwLock<HashSet<Uuid>>>,
}

impl MockPaymentRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            pending: Arc::new(RwLock::new(HashSet::new())),
            confirmed: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// Seed a pending payment for an appointment
    pub async fn add_pending(&self, appointment_id: Uuid) {
        self.pending.write().await.insert(appointment_id);
    }

    /// Whether the appointment's payment is confirmed
    pub async fn is_confirmed(&self, appointment_id: Uuid) -> bool {
        self.confirmed.read().await.contains(&appointment_id)
    }
}

impl Default for MockPaymentRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentRepository for MockPaymentRepository {
    async fn confirm_pending(&self, appointment_id: Uuid) -> Result<bool, DomainError> {
        let mut pending = self.pending.write().await;

        if pending.remove(&appointment_id) {
            self.confirmed.write().await.insert(appointment_id);
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
