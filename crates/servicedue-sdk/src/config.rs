//! Client configuration.
//!
//! Built from environment variables at startup; every value has a default
//! suitable for a local backend.

use std::time::Duration;

use chrono::TimeDelta;

/// Connection and session settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkConfig {
    /// Backend base URL.
    pub api_url: String,
    /// Base of the per-lead booking links substituted into messages.
    pub booking_url: String,
    /// How long a stored session stays valid after sign-in.
    pub session_ttl: TimeDelta,
    /// Per-request HTTP timeout.
    pub http_timeout: Duration,
    /// Leads requested per customer-list page.
    pub page_size: u32,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            booking_url: "https://servicedue.in/book".to_string(),
            session_ttl: TimeDelta::hours(24),
            http_timeout: Duration::from_secs(15),
            page_size: 50,
        }
    }
}

impl SdkConfig {
    /// Build the configuration from environment variables.
    ///
    /// | Variable                       | Default                      | Description                   |
    /// |--------------------------------|------------------------------|-------------------------------|
    /// | `SERVICEDUE_API_URL`           | `http://localhost:8000`      | Backend base URL              |
    /// | `SERVICEDUE_BOOKING_URL`       | `https://servicedue.in/book` | Booking link base             |
    /// | `SERVICEDUE_SESSION_TTL_HOURS` | `24`                         | Session lifetime in hours     |
    /// | `SERVICEDUE_HTTP_TIMEOUT_SECS` | `15`                         | Per-request timeout           |
    /// | `SERVICEDUE_PAGE_SIZE`         | `50`                         | Leads per customer-list page  |
    ///
    /// Unparseable numbers fall back to their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let api_url = lookup("SERVICEDUE_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.api_url);
        let booking_url = lookup("SERVICEDUE_BOOKING_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.booking_url);
        let session_ttl = lookup("SERVICEDUE_SESSION_TTL_HOURS")
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|h| *h > 0)
            .and_then(TimeDelta::try_hours)
            .unwrap_or(defaults.session_ttl);
        let http_timeout = lookup("SERVICEDUE_HTTP_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|s| *s > 0)
            .map_or(defaults.http_timeout, Duration::from_secs);
        let page_size = lookup("SERVICEDUE_PAGE_SIZE")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.page_size);

        Self {
            api_url,
            booking_url,
            session_ttl,
            http_timeout,
            page_size,
        }
    }
}

/// Timing of the launch progress ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressConfig {
    /// Time for the ticker to walk through all steps.
    pub duration: Duration,
    /// Number of ticks.
    pub steps: u32,
    /// How long a completed launch stays on screen before it is dismissed.
    pub hold: Duration,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(10),
            steps: 50,
            hold: Duration::from_secs(3),
        }
    }
}

impl ProgressConfig {
    /// Delay between two ticks.
    pub fn tick(&self) -> Duration {
        self.duration / self.steps.max(1)
    }
}
