//! Configuration for the QR token service

use chrono_tz::Tz;

use crate::domain::entities::qr_token::{
    CHECK_IN_GRACE_MINUTES, CHECK_IN_LEAD_MINUTES, DEFAULT_AD_HOC_MINUTES, MAX_AD_HOC_MINUTES,
};
use crate::errors::{DomainError, DomainResult};

/// Configuration for the QR token service
#[derive(Debug, Clone)]
pub struct QrServiceConfig {
    /// Business time zone appointments are scheduled in
    pub time_zone: Tz,
    /// Base URL embedded in redemption links (no trailing slash)
    pub redeem_base_url: String,
    /// Minutes before the scheduled time a check-in token becomes issuable
    pub check_in_lead_minutes: i64,
    /// Minutes after the scheduled time a check-in token stays redeemable
    pub check_in_grace_minutes: i64,
    /// Expiry drift within which an existing token is reused, in seconds
    pub reuse_tolerance_seconds: i64,
    /// Ad hoc validity when the caller does not request one, in minutes
    pub default_ad_hoc_minutes: i64,
    /// Upper bound for caller-supplied ad hoc durations, in minutes
    pub max_ad_hoc_minutes: i64,
}

impl Default for QrServiceConfig {
    fn default() -> Self {
        Self {
            time_zone: chrono_tz::Europe::Madrid,
            redeem_base_url: "http://localhost:8080".to_string(),
            check_in_lead_minutes: CHECK_IN_LEAD_MINUTES,
            check_in_grace_minutes: CHECK_IN_GRACE_MINUTES,
            reuse_tolerance_seconds: 60,
            default_ad_hoc_minutes: DEFAULT_AD_HOC_MINUTES,
            max_ad_hoc_minutes: MAX_AD_HOC_MINUTES,
        }
    }
}

impl QrServiceConfig {
    /// Build service configuration from the environment-facing flow config
    ///
    /// Fails when the configured time zone name is not a valid IANA zone.
    pub fn from_flow_config(flow: &bl_shared::QrFlowConfig) -> DomainResult<Self> {
        let time_zone: Tz = flow
            .time_zone
            .parse()
            .map_err(|_| DomainError::Validation {
                message: format!("unknown time zone: {}", flow.time_zone),
            })?;

        Ok(Self {
            time_zone,
            redeem_base_url: flow.redeem_base_url.trim_end_matches('/').to_string(),
            ..Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flow_config_parses_zone_and_trims_slash() {
        let flow = bl_shared::QrFlowConfig {
            time_zone: "America/New_York".to_string(),
            redeem_base_url: "https://book.example.com/".to_string(),
            ..bl_shared::QrFlowConfig::default()
        };

        let config = QrServiceConfig::from_flow_config(&flow).unwrap();
        assert_eq!(config.time_zone, chrono_tz::America::New_York);
        assert_eq!(config.redeem_base_url, "https://book.example.com");
    }

    #[test]
    fn test_from_flow_config_rejects_bad_zone() {
        let flow = bl_shared::QrFlowConfig {
            time_zone: "Mars/Olympus_Mons".to_string(),
            ..bl_shared::QrFlowConfig::default()
        };

        assert!(QrServiceConfig::from_flow_config(&flow).is_err());
    }
}
