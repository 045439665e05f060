//! QR token flow configuration
//!
//! Environment-facing configuration for the QR check-in flow: the business
//! time zone appointments are scheduled in, the base URL embedded in QR
//! codes, and the pages the redemption endpoint redirects to.

use serde::{Deserialize, Serialize};

/// Configuration for the QR token flow surfaces
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QrFlowConfig {
    /// IANA time zone name appointments are scheduled in (e.g. "Europe/Madrid")
    pub time_zone: String,

    /// Base URL embedded in redemption links (scheme + host, no trailing slash)
    pub redeem_base_url: String,

    /// Page the redemption endpoint redirects to on success
    pub scan_success_url: String,

    /// Page the redemption endpoint redirects to on failure
    pub scan_error_url: String,
}

impl Default for QrFlowConfig {
    fn default() -> Self {
        Self {
            time_zone: String::from("Europe/Madrid"),
            redeem_base_url: String::from("http://localhost:8080"),
            scan_success_url: String::from("http://localhost:8080/scan/success"),
            scan_error_url: String::from("http://localhost:8080/scan/error"),
        }
    }
}

impl QrFlowConfig {
    /// Create configuration from environment variables
    ///
    /// Reads `QR_TIME_ZONE`, `QR_REDEEM_BASE_URL`, `QR_SCAN_SUCCESS_URL`
    /// and `QR_SCAN_ERROR_URL`, falling back to development defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            time_zone: std::env::var("QR_TIME_ZONE").unwrap_or(defaults.time_zone),
            redeem_base_url: std::env::var("QR_REDEEM_BASE_URL")
                .unwrap_or(defaults.redeem_base_url),
            scan_success_url: std::env::var("QR_SCAN_SUCCESS_URL")
                .unwrap_or(defaults.scan_success_url),
            scan_error_url: std::env::var("QR_SCAN_ERROR_URL")
                .unwrap_or(defaults.scan_error_url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_time_zone_parses() {
        let config = QrFlowConfig::default();
        assert!(config.time_zone.parse::<chrono_tz::Tz>().is_ok());
    }
}
