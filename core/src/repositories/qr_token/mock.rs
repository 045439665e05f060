//! Mock implementation of QrTokenRepository for testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::qr_token::{QrToken, TokenPurpose};
use crate::errors::{DomainError, TokenError};

use super::r#trait::QrTokenRepository;

/// Mock token repository for testing
///
/// The conditional operations mirror affected-rows semantics of the MySQL
/// implementation, so service tests exercise the same race rules.
pub struct MockQrTokenRepository {
    tokens: Arc<RwLock<HashMap<String, QrToken>>>,
}

impl MockQrTokenRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            tokens: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of stored tokens, consumed or not
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }
}

impl Default for MockQrTokenRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QrTokenRepository for MockQrTokenRepository {
    async fn insert(&self, token: QrToken) -> Result<QrToken, DomainError> {
        let mut tokens = self.tokens.write().await;

        if tokens.contains_key(&token.token) {
            return Err(TokenError::TokenCollision.into());
        }

        tokens.insert(token.token.clone(), token.clone());
        Ok(token)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<QrToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.get(token).cloned())
    }

    async fn find_unconsumed(
        &self,
        appointment_id: Uuid,
        purpose: TokenPurpose,
    ) -> Result<Option<QrToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens
            .values()
            .filter(|t| {
                !t.consumed && t.purpose == purpose && t.appointment_id == Some(appointment_id)
            })
            .max_by_key(|t| t.issued_at)
            .cloned())
    }

    async fn consume_if_unused(
        &self,
        token: &str,
        used_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let mut tokens = self.tokens.write().await;

        match tokens.get_mut(token) {
            Some(t) if !t.consumed => {
                t.consume(used_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_if_unconsumed(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut tokens = self.tokens.write().await;

        let key = tokens
            .values()
            .find(|t| t.id == id && !t.consumed)
            .map(|t| t.token.clone());

        match key {
            Some(key) => {
                tokens.remove(&key);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_expired_unconsumed(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<QrToken>, DomainError> {
        let tokens = self.tokens.read().await;
        let mut expired: Vec<QrToken> = tokens
            .values()
            .filter(|t| !t.consumed && t.is_expired_at(now))
            .cloned()
            .collect();
        expired.sort_by_key(|t| t.expires_at);
        expired.truncate(limit);
        Ok(expired)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::qr_token::generate_token_string;
    use chrono::Duration;

    fn token_expiring_in(minutes: i64) -> QrToken {
        let now = Utc::now();
        QrToken::new(
            generate_token_string(),
            TokenPurpose::CheckIn,
            Some(Uuid::new_v4()),
            Uuid::new_v4(),
            now,
            now + Duration::minutes(minutes),
        )
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_token_string() {
        let repo = MockQrTokenRepository::new();
        let token = token_expiring_in(30);
        let mut duplicate = token_expiring_in(30);
        duplicate.token = token.token.clone();

        repo.insert(token).await.unwrap();
        let err = repo.insert(duplicate).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Token(TokenError::TokenCollision)
        ));
    }

    #[tokio::test]
    async fn test_consume_if_unused_lets_exactly_one_writer_win() {
        let repo = MockQrTokenRepository::new();
        let token = repo.insert(token_expiring_in(30)).await.unwrap();
        let now = Utc::now();

        assert!(repo.consume_if_unused(&token.token, now).await.unwrap());
        assert!(!repo.consume_if_unused(&token.token, now).await.unwrap());

        let stored = repo.find_by_token(&token.token).await.unwrap().unwrap();
        assert!(stored.consumed);
        assert_eq!(stored.used_at, Some(now));
    }

    #[tokio::test]
    async fn test_delete_if_unconsumed_skips_consumed_tokens() {
        let repo = MockQrTokenRepository::new();
        let token = repo.insert(token_expiring_in(30)).await.unwrap();
        repo.consume_if_unused(&token.token, Utc::now())
            .await
            .unwrap();

        assert!(!repo.delete_if_unconsumed(token.id).await.unwrap());
        assert!(repo.find_by_token(&token.token).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_find_unconsumed_returns_most_recent_for_pair() {
        let repo = MockQrTokenRepository::new();
        let appointment_id = Uuid::new_v4();

        let mut older = token_expiring_in(10);
        older.appointment_id = Some(appointment_id);
        older.issued_at = Utc::now() - Duration::minutes(5);
        let mut newer = token_expiring_in(20);
        newer.appointment_id = Some(appointment_id);

        repo.insert(older).await.unwrap();
        let newer = repo.insert(newer).await.unwrap();

        let found = repo
            .find_unconsumed(appointment_id, TokenPurpose::CheckIn)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, newer.id);

        // Other purposes see nothing
        assert!(repo
            .find_unconsumed(appointment_id, TokenPurpose::SpecialOffer)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_find_expired_unconsumed_orders_and_limits() {
        let repo = MockQrTokenRepository::new();
        let oldest = repo.insert(token_expiring_in(-60)).await.unwrap();
        repo.insert(token_expiring_in(-10)).await.unwrap();
        repo.insert(token_expiring_in(30)).await.unwrap();

        let expired = repo.find_expired_unconsumed(Utc::now(), 1).await.unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, oldest.id);
    }
}
