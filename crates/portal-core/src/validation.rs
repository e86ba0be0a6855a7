//! # Validation Module
//!
//! Input validation for credentials and flow parameters.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: THIS MODULE                                                  │
//! │  ├── Credentials present and sane before any network call              │
//! │  └── Term value shape before exam/grade requests                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Remote portal                                                │
//! │  └── Rejects bad sign-ins with its own error payloads                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Failing here is cheap: no token was fetched, no request was issued.

use crate::error::ValidationError;
use crate::types::Credentials;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Upper bound on credential field length; the portal truncates beyond this.
const MAX_CREDENTIAL_LEN: usize = 128;

// =============================================================================
// Credential Validators
// =============================================================================

/// Validates stored credentials before a sign-in attempt.
///
/// ## Rules
/// - Username and password must be non-empty after trimming
/// - Neither may exceed 128 characters
/// - The cookie may be empty (first sign-in has none)
pub fn validate_credentials(credentials: &Credentials) -> ValidationResult<()> {
    validate_field("username", &credentials.username)?;
    validate_field("password", &credentials.password)?;
    Ok(())
}

fn validate_field(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > MAX_CREDENTIAL_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_CREDENTIAL_LEN,
        });
    }

    Ok(())
}

// =============================================================================
// Term Validators
// =============================================================================

/// Validates a term value before it is used as a request parameter.
///
/// Term values are numeric strings (e.g. "1610").
pub fn validate_term_value(value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "term".to_string(),
        });
    }

    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "term".to_string(),
            reason: "term values are numeric".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
            cookie: String::new(),
        }
    }

    #[test]
    fn test_valid_credentials() {
        assert!(validate_credentials(&credentials("2201734522", "hunter2")).is_ok());
    }

    #[test]
    fn test_empty_username_rejected() {
        let err = validate_credentials(&credentials("  ", "hunter2")).unwrap_err();
        assert!(matches!(err, ValidationError::Required { .. }));
    }

    #[test]
    fn test_empty_password_rejected() {
        let err = validate_credentials(&credentials("2201734522", "")).unwrap_err();
        assert!(matches!(err, ValidationError::Required { .. }));
    }

    #[test]
    fn test_oversized_field_rejected() {
        let long = "a".repeat(200);
        let err = validate_credentials(&credentials(&long, "hunter2")).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { .. }));
    }

    #[test]
    fn test_term_value_numeric() {
        assert!(validate_term_value("1610").is_ok());
        assert!(validate_term_value("").is_err());
        assert!(validate_term_value("16-10").is_err());
    }
}
