//! Clock seam for the token flow.
//!
//! The window policy is sensitive to the instant of the call, so the
//! services take the clock as a dependency instead of reading `Utc::now()`
//! inline; tests substitute a fixed clock.

use chrono::{DateTime, Utc};

/// Source of the current instant
pub trait Clock: Send + Sync {
    /// Current instant in UTC
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
