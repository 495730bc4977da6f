use crate::core::domain::error::ValidationError;
use zxcvbn::zxcvbn;

/// A Proxmox password, held only for the lifetime of the invocation.
#[derive(Clone)]
pub struct ProxmoxPassword(String);

impl ProxmoxPassword {
    /// Creates a new password without validation.
    pub(crate) fn new_unchecked(password: String) -> Self {
        Self(password)
    }

    /// Returns the password as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ProxmoxPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ProxmoxPassword(***)")
    }
}

/// Validates a password. A strength floor is only enforced when `min_score` is set.
pub(crate) fn validate_password(
    password: &str,
    min_score: Option<zxcvbn::Score>,
) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::field("password", "Password cannot be empty"));
    }
    if password.len() > 256 {
        return Err(ValidationError::Format(
            "Password cannot exceed 256 characters".to_string(),
        ));
    }
    if let Some(min_score) = min_score {
        if zxcvbn(password, &[]).score() < min_score {
            return Err(ValidationError::ConstraintViolation(
                "Password is too weak (increase complexity)".to_string(),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password() {
        assert!(validate_password("hunter2", None).is_ok());
        assert!(validate_password("", None).is_err());
        assert!(validate_password(&"x".repeat(257), None).is_err());
    }

    #[test]
    fn test_strength_floor() {
        assert!(validate_password("password", Some(zxcvbn::Score::Three)).is_err());
        assert!(
            validate_password("c0rrect-H0rse-battery-Staple!", Some(zxcvbn::Score::Three)).is_ok()
        );
    }

    #[test]
    fn test_debug_hides_secret() {
        let password = ProxmoxPassword::new_unchecked("s3cret".to_string());
        assert_eq!(format!("{password:?}"), "ProxmoxPassword(***)");
        assert_eq!(password.as_str(), "s3cret");
    }
}
