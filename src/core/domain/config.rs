//! Client-side policy knobs: session lifetime, request rate, credential checks.

use std::time::Duration;

/// Token bucket parameters for outgoing API requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub requests_per_second: u32,
    pub burst_size: u32,
}

/// Validation and session settings applied by [`crate::ProxmoxClient`].
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Age after which a ticket is renewed before the next request. Proxmox
    /// tickets are valid for two hours.
    pub ticket_lifetime: Duration,
    /// Optional client-side rate limit.
    pub rate_limit: Option<RateLimitConfig>,
    /// Refuse well-known system account names.
    pub block_reserved_usernames: bool,
    /// Minimum zxcvbn score for the password, if any.
    pub password_min_score: Option<zxcvbn::Score>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            ticket_lifetime: Duration::from_secs(2 * 60 * 60 - 60),
            rate_limit: None,
            block_reserved_usernames: false,
            password_min_score: None,
        }
    }
}
