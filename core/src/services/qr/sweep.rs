//! Expiry sweep proactively closing out expired tokens.
//!
//! Redemption performs expiry-on-read independently, so correctness never
//! depends on this sweep running; it only moves the missed-consequence
//! handling off the scan path and keeps the store tidy.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::domain::entities::qr_token::QrToken;
use crate::errors::DomainResult;
use crate::repositories::QrTokenRepository;

use super::actions::ActionRegistry;
use super::clock::Clock;

/// Closes one expired token: missed consequence, then conditional consume
///
/// Shared by the sweep and the redeemer's expiry-on-read branch, so the
/// two paths cannot drift apart. A failing consequence is logged and does
/// not block consumption; the consequence transitions are conditional
/// writes, so a later pass retries them without double effects.
///
/// Returns whether this call consumed the token.
pub(crate) async fn close_expired<T: QrTokenRepository + ?Sized>(
    tokens: &T,
    registry: &ActionRegistry,
    token: &QrToken,
    now: DateTime<Utc>,
) -> DomainResult<bool> {
    if let Some(handler) = registry.get(token.purpose) {
        if let Err(err) = handler.on_expired(token).await {
            warn!(
                token_id = %token.id,
                error = %err,
                "missed-consequence handling failed; closing token anyway"
            );
        }
    }

    tokens.consume_if_unused(&token.token, now).await
}

/// Configuration for the expiry sweep
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// How often to run the sweep (in seconds)
    pub interval_seconds: u64,
    /// Maximum number of tokens to close in one pass
    pub batch_size: usize,
    /// Whether the periodic sweep is enabled
    pub enabled: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 300,
            batch_size: 500,
            enabled: true,
        }
    }
}

/// Summary of one sweep pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepResult {
    /// Expired tokens examined in this pass
    pub examined: usize,
    /// Tokens this pass actually closed
    pub closed: usize,
}

/// Service periodically closing expired unconsumed tokens
pub struct QrTokenSweeper<T: QrTokenRepository + 'static> {
    tokens: Arc<T>,
    registry: Arc<ActionRegistry>,
    clock: Arc<dyn Clock>,
    config: SweepConfig,
}

impl<T: QrTokenRepository> QrTokenSweeper<T> {
    /// Create a new sweeper
    pub fn new(
        tokens: Arc<T>,
        registry: Arc<ActionRegistry>,
        clock: Arc<dyn Clock>,
        config: SweepConfig,
    ) -> Self {
        Self {
            tokens,
            registry,
            clock,
            config,
        }
    }

    /// Run a single sweep pass
    pub async fn run_sweep(&self) -> DomainResult<SweepResult> {
        if !self.config.enabled {
            return Ok(SweepResult::default());
        }

        let now = self.clock.now_utc();
        let expired = self
            .tokens
            .find_expired_unconsumed(now, self.config.batch_size)
            .await?;

        let mut result = SweepResult {
            examined: expired.len(),
            closed: 0,
        };

        for token in &expired {
            if close_expired(self.tokens.as_ref(), &self.registry, token, now).await? {
                result.closed += 1;
            }
        }

        if result.examined > 0 {
            info!(
                examined = result.examined,
                closed = result.closed,
                "expiry sweep pass finished"
            );
        }

        Ok(result)
    }

    /// Start the periodic sweep task
    ///
    /// Spawns a tokio task that runs a pass at the configured interval
    /// until the handle is aborted.
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        let interval = std::time::Duration::from_secs(self.config.interval_seconds);

        tokio::spawn(async move {
            info!(
                interval_seconds = self.config.interval_seconds,
                "starting expiry sweep task"
            );

            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if let Err(err) = self.run_sweep().await {
                    error!(error = %err, "expiry sweep pass failed");
                }
            }
        })
    }
}
