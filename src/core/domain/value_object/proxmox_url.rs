use crate::core::domain::error::ValidationError;
use crate::core::domain::value_object::{ProxmoxHost, ProxmoxPort};

/// Base URL of a Proxmox VE API endpoint, e.g. `https://pve1:8006/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxmoxUrl(url::Url);

impl ProxmoxUrl {
    /// Builds the base URL from a validated host and port.
    pub(crate) fn from_parts(
        host: &ProxmoxHost,
        port: &ProxmoxPort,
        secure: bool,
    ) -> Result<Self, ValidationError> {
        let scheme = if secure { "https" } else { "http" };
        let raw = format!("{}://{}:{}/", scheme, host.as_authority(), port.get());
        validate_url(&raw)?;
        Self::parse(&raw)
    }

    /// Creates a URL from an arbitrary base without scheme checks.
    #[cfg(test)]
    pub(crate) fn new_unchecked(raw: String) -> Self {
        Self(url::Url::parse(&raw).expect("test URL must parse"))
    }

    fn parse(raw: &str) -> Result<Self, ValidationError> {
        url::Url::parse(raw)
            .map(Self)
            .map_err(|e| ValidationError::Format(format!("Invalid URL format: {e}")))
    }

    /// Returns the full URL for an API path relative to `/api2/json/`.
    #[must_use]
    pub fn api_endpoint(&self, path: &str) -> String {
        format!(
            "{}/api2/json/{}",
            self.0.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Returns the URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Validates a base URL: http(s) only, and no path beyond `/`.
pub(crate) fn validate_url(raw: &str) -> Result<(), ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::field("url", "URL cannot be empty"));
    }
    if raw.len() > 2083 {
        return Err(ValidationError::Format(
            "URL exceeds maximum length of 2083 characters".to_string(),
        ));
    }
    let parsed = url::Url::parse(raw)
        .map_err(|e| ValidationError::Format(format!("Invalid URL format: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ValidationError::ConstraintViolation(
            "Invalid scheme. Must be one of: http, https".to_string(),
        ));
    }
    if parsed.path() != "/" {
        return Err(ValidationError::ConstraintViolation(
            "Base URL must not carry a path".to_string(),
        ));
    }
    Ok(())
}
