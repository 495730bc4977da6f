use crate::core::domain::error::ValidationError;

/// An authentication realm (`pam`, `pve`, or a configured LDAP/AD/OpenID realm id).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxmoxRealm(String);

impl ProxmoxRealm {
    /// Creates a new realm without validation.
    pub(crate) fn new_unchecked(realm: String) -> Self {
        Self(realm)
    }

    /// Returns the realm as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validates a realm id. Proxmox realm ids are 2 to 32 characters, starting with a
/// letter, made of lowercase alphanumerics, `-` and `_`.
pub(crate) fn validate_realm(realm: &str) -> Result<(), ValidationError> {
    if realm.is_empty() {
        return Err(ValidationError::field("realm", "Realm cannot be empty"));
    }
    if !(2..=32).contains(&realm.len()) {
        return Err(ValidationError::Format(
            "Realm length must be between 2 and 32 characters".to_string(),
        ));
    }
    if !realm.starts_with(|c: char| c.is_ascii_lowercase()) {
        return Err(ValidationError::Format(
            "Realm must start with a lowercase letter".to_string(),
        ));
    }
    let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_';
    if !realm.chars().all(allowed) {
        return Err(ValidationError::Format(
            "Realm contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_realms() {
        for realm in ["pam", "pve", "ad-corp", "ldap_2"] {
            assert!(validate_realm(realm).is_ok(), "{realm} should be valid");
        }
    }

    #[test]
    fn test_invalid_realms() {
        for realm in ["", "p", "PAM", "1pve", "pve!", &"r".repeat(33)] {
            assert!(validate_realm(realm).is_err(), "{realm} should be invalid");
        }
    }
}
