//! Signup password rules.

use docman_core::config::AuthConfig;
use docman_core::error::AppError;

/// Checks new passwords at signup: minimum length and confirmation match.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    min_length: usize,
}

impl PasswordPolicy {
    /// Creates a policy from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Validates a new password and its confirmation.
    pub fn validate(&self, password: &str, confirmation: &str) -> Result<(), AppError> {
        if password != confirmation {
            return Err(AppError::validation("Passwords do not match."));
        }
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> PasswordPolicy {
        PasswordPolicy::new(&AuthConfig::default())
    }

    #[test]
    fn test_mismatch_is_reported_first() {
        let err = policy().validate("short", "shorter").unwrap_err();
        assert_eq!(err.message, "Passwords do not match.");
    }

    #[test]
    fn test_min_length_counts_characters() {
        assert!(policy().validate("ééééééé", "ééééééé").is_err());
        assert!(policy().validate("éééééééé", "éééééééé").is_ok());
    }
}
