use crate::core::domain::error::ValidationError;
use std::net::IpAddr;

const MAX_HOSTNAME_LENGTH: usize = 253;
const MAX_LABEL_LENGTH: usize = 63;

/// A Proxmox host name or IP address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxmoxHost(String);

impl ProxmoxHost {
    /// Creates a new host without validation.
    pub(crate) fn new_unchecked(host: String) -> Self {
        Self(host)
    }

    /// Returns the host as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the host formatted for use inside a URL authority.
    ///
    /// IPv6 literals are wrapped in brackets.
    #[must_use]
    pub fn as_authority(&self) -> String {
        match self.0.parse::<IpAddr>() {
            Ok(IpAddr::V6(_)) => format!("[{}]", self.0),
            _ => self.0.clone(),
        }
    }
}

/// Validates a host name (RFC 1035 labels) or a literal IP address.
pub(crate) fn validate_host(host: &str) -> Result<(), ValidationError> {
    if host.is_empty() {
        return Err(ValidationError::field("host", "Host cannot be empty"));
    }
    if host.parse::<IpAddr>().is_ok() {
        return Ok(());
    }
    if host.len() > MAX_HOSTNAME_LENGTH {
        return Err(ValidationError::ConstraintViolation(format!(
            "Host length exceeds maximum of {MAX_HOSTNAME_LENGTH} characters"
        )));
    }
    host.split('.').try_for_each(validate_label)
}

fn validate_label(label: &str) -> Result<(), ValidationError> {
    if label.is_empty() || label.len() > MAX_LABEL_LENGTH {
        return Err(ValidationError::Format(format!(
            "Label must be between 1 and {MAX_LABEL_LENGTH} characters"
        )));
    }
    if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ValidationError::Format(
            "Label can only contain alphanumeric characters and hyphens".to_string(),
        ));
    }
    if label.starts_with('-') || label.ends_with('-') {
        return Err(ValidationError::Format(
            "Label cannot start or end with hyphen".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_hosts() {
        for host in [
            "example.com",
            "pve1",
            "sub.example.com",
            "example-domain.com",
            "192.168.1.10",
            "fe80::1",
        ] {
            assert!(validate_host(host).is_ok(), "Host {host} should be valid");
        }
    }

    #[test]
    fn test_invalid_hosts() {
        let long_hostname = "a".repeat(254);
        let cases = [
            ("", "empty hostname"),
            (long_hostname.as_str(), "hostname too long"),
            ("-example.com", "starts with hyphen"),
            ("example-.com", "ends with hyphen"),
            ("exam@ple.com", "invalid character"),
            ("exam ple.com", "contains space"),
            (".example.com", "empty label"),
            ("example..com", "consecutive dots"),
        ];
        for (host, case) in cases {
            assert!(validate_host(host).is_err(), "Case '{case}' should fail: {host}");
        }
    }

    #[test]
    fn test_ipv6_authority_is_bracketed() {
        assert_eq!(
            ProxmoxHost::new_unchecked("fe80::1".to_string()).as_authority(),
            "[fe80::1]"
        );
        assert_eq!(
            ProxmoxHost::new_unchecked("pve1.lan".to_string()).as_authority(),
            "pve1.lan"
        );
    }
}
