//! MySQL implementation of the QrTokenRepository trait.
//!
//! Backing table `qr_tokens`: `id CHAR(36) PRIMARY KEY`,
//! `token VARCHAR(64) NOT NULL UNIQUE`, `purpose VARCHAR(32) NOT NULL`,
//! `appointment_id CHAR(36) NULL`, `issued_by CHAR(36) NOT NULL`,
//! `issued_at DATETIME NOT NULL`, `expires_at DATETIME NOT NULL`,
//! `used_at DATETIME NULL`, `consumed BOOLEAN NOT NULL DEFAULT FALSE`.
//!
//! The unique index on `token` is what turns a random-string collision
//! into a hard issuance failure, and the consume/delete statements carry
//! `AND consumed = FALSE` so the affected-row count decides races.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use bl_core::domain::entities::qr_token::{QrToken, TokenPurpose};
use bl_core::errors::{DomainError, TokenError};
use bl_core::repositories::QrTokenRepository;

/// MySQL implementation of QrTokenRepository
pub struct MySqlQrTokenRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlQrTokenRepository {
    /// Create a new MySQL token repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert a database row to a QrToken entity
    fn row_to_token(row: &sqlx::mysql::MySqlRow) -> Result<QrToken, DomainError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| DomainError::Database {
                message: format!("failed to get id: {}", e),
            })?;
        let issued_by: String = row
            .try_get("issued_by")
            .map_err(|e| DomainError::Database {
                message: format!("failed to get issued_by: {}", e),
            })?;
        let appointment_id: Option<String> =
            row.try_get("appointment_id").map_err(|e| DomainError::Database {
                message: format!("failed to get appointment_id: {}", e),
            })?;
        let purpose: String = row
            .try_get("purpose")
            .map_err(|e| DomainError::Database {
                message: format!("failed to get purpose: {}", e),
            })?;

        Ok(QrToken {
            id: Uuid::parse_str(&id).map_err(|e| DomainError::Database {
                message: format!("invalid token UUID: {}", e),
            })?,
            token: row.try_get("token").map_err(|e| DomainError::Database {
                message: format!("failed to get token: {}", e),
            })?,
            purpose: TokenPurpose::parse(&purpose).ok_or_else(|| DomainError::Database {
                message: format!("unknown purpose in store: {}", purpose),
            })?,
            appointment_id: appointment_id
                .map(|v| Uuid::parse_str(&v))
                .transpose()
                .map_err(|e| DomainError::Database {
                    message: format!("invalid appointment UUID: {}", e),
                })?,
            issued_by: Uuid::parse_str(&issued_by).map_err(|e| DomainError::Database {
                message: format!("invalid issuer UUID: {}", e),
            })?,
            issued_at: row
                .try_get::<DateTime<Utc>, _>("issued_at")
                .map_err(|e| DomainError::Database {
                    message: format!("failed to get issued_at: {}", e),
                })?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(|e| DomainError::Database {
                    message: format!("failed to get expires_at: {}", e),
                })?,
            used_at: row
                .try_get::<Option<DateTime<Utc>>, _>("used_at")
                .map_err(|e| DomainError::Database {
                    message: format!("failed to get used_at: {}", e),
                })?,
            consumed: row.try_get("consumed").map_err(|e| DomainError::Database {
                message: format!("failed to get consumed: {}", e),
            })?,
        })
    }
}

#[async_trait]
impl QrTokenRepository for MySqlQrTokenRepository {
    async fn insert(&self, token: QrToken) -> Result<QrToken, DomainError> {
        let query = r#"
            INSERT INTO qr_tokens (
                id, token, purpose, appointment_id, issued_by,
                issued_at, expires_at, used_at, consumed
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(token.id.to_string())
            .bind(&token.token)
            .bind(token.purpose.as_str())
            .bind(token.appointment_id.map(|id| id.to_string()))
            .bind(token.issued_by.to_string())
            .bind(token.issued_at)
            .bind(token.expires_at)
            .bind(token.used_at)
            .bind(token.consumed)
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    DomainError::Token(TokenError::TokenCollision)
                }
                _ => DomainError::Database {
                    message: format!("failed to insert qr token: {}", e),
                },
            })?;

        Ok(token)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<QrToken>, DomainError> {
        let query = r#"
            SELECT id, token, purpose, appointment_id, issued_by,
                   issued_at, expires_at, used_at, consumed
            FROM qr_tokens
            WHERE token = ?
            LIMIT 1
        "#;

        let result = sqlx::query(query)
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Database {
                message: format!("failed to find qr token: {}", e),
            })?;

        match result {
            Some(row) => Ok(Some(Self::row_to_token(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_unconsumed(
        &self,
        appointment_id: Uuid,
        purpose: TokenPurpose,
    ) -> Result<Option<QrToken>, DomainError> {
        let query = r#"
            SELECT id, token, purpose, appointment_id, issued_by,
                   issued_at, expires_at, used_at, consumed
            FROM qr_tokens
            WHERE appointment_id = ? AND purpose = ? AND consumed = FALSE
            ORDER BY issued_at DESC
            LIMIT 1
        "#;

        let result = sqlx::query(query)
            .bind(appointment_id.to_string())
            .bind(purpose.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Database {
                message: format!("failed to find unconsumed qr token: {}", e),
            })?;

        match result {
            Some(row) => Ok(Some(Self::row_to_token(&row)?)),
            None => Ok(None),
        }
    }

    async fn consume_if_unused(
        &self,
        token: &str,
        used_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE qr_tokens
            SET consumed = TRUE, used_at = ?
            WHERE token = ? AND consumed = FALSE
        "#;

        let result = sqlx::query(query)
            .bind(used_at)
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Database {
                message: format!("failed to consume qr token: {}", e),
            })?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_if_unconsumed(&self, id: Uuid) -> Result<bool, DomainError> {
        let query = "DELETE FROM qr_tokens WHERE id = ? AND consumed = FALSE";

        let result = sqlx::query(query)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Database {
                message: format!("failed to delete qr token: {}", e),
            })?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_expired_unconsumed(
        &self,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<QrToken>, DomainError> {
        let query = r#"
            SELECT id, token, purpose, appointment_id, issued_by,
                   issued_at, expires_at, used_at, consumed
            FROM qr_tokens
            WHERE consumed = FALSE AND expires_at < ?
            ORDER BY expires_at ASC
            LIMIT ?
        "#;

        let rows = sqlx::query(query)
            .bind(now)
            .bind(limit as u64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::Database {
                message: format!("failed to list expired qr tokens: {}", e),
            })?;

        rows.iter().map(Self::row_to_token).collect()
    }
}
