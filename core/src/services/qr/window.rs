//! Window policy: pure computations of issuance/redemption windows.
//!
//! Schedule-bound purposes derive their window from the appointment's
//! local wall-clock time; ad hoc purposes run from the issuance instant
//! for a clamped caller-supplied duration.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::errors::{DomainError, DomainResult};

/// Permitted `[earliest issuable, latest redeemable]` range for a token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedemptionWindow {
    /// Instant from which issuance is allowed
    pub earliest: DateTime<Utc>,
    /// Instant after which redemption must be refused
    pub latest: DateTime<Utc>,
}

/// Convert a local wall-clock time in `tz` to an absolute instant
///
/// DST-ambiguous times resolve to the earliest mapping; times skipped by
/// a DST gap do not exist and fail validation.
pub fn local_to_utc(local: NaiveDateTime, tz: Tz) -> DomainResult<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(instant) => Ok(instant.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(DomainError::Validation {
            message: format!("local time {} does not exist in {}", local, tz),
        }),
    }
}

/// Window for a check-in token bound to an appointment scheduled at
/// `scheduled_local`: `lead_minutes` before through `grace_minutes` after
pub fn check_in_window(
    scheduled_local: NaiveDateTime,
    tz: Tz,
    lead_minutes: i64,
    grace_minutes: i64,
) -> DomainResult<RedemptionWindow> {
    let scheduled = local_to_utc(scheduled_local, tz)?;

    Ok(RedemptionWindow {
        earliest: scheduled - Duration::minutes(lead_minutes),
        latest: scheduled + Duration::minutes(grace_minutes),
    })
}

/// Window for an ad hoc token issued at `issued_at` lasting `minutes`
pub fn ad_hoc_window(issued_at: DateTime<Utc>, minutes: i64) -> RedemptionWindow {
    RedemptionWindow {
        earliest: issued_at,
        latest: issued_at + Duration::minutes(minutes),
    }
}

/// Clamp a caller-supplied ad hoc duration to `[1, max_minutes]`
pub fn clamp_ad_hoc_minutes(
    requested: Option<i64>,
    default_minutes: i64,
    max_minutes: i64,
) -> i64 {
    requested.unwrap_or(default_minutes).clamp(1, max_minutes)
}
