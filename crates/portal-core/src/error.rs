//! # Error Types
//!
//! Domain-specific error types for portal-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  portal-core errors (this file)                                        │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  portal-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  portal-sync errors (separate crate)                                   │
//! │  └── SyncError        - What the caller's failure continuation sees    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → SyncError → failure continuation  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (date string, field name, etc.)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
///
/// These errors represent violations of domain rules or malformed record
/// data that makes a merge impossible.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A record carried a date that cannot be normalized to a date key.
    ///
    /// ## When This Occurs
    /// - A finance due-date, exam date, or session date shorter than the
    ///   canonical 10-character key
    /// - A date that does not parse as `yyyy-MM-dd`
    #[error("Invalid date '{value}' in {source_kind} record: {reason}")]
    InvalidDateKey {
        source_kind: &'static str,
        value: String,
        reason: String,
    },

    /// A grade payload referenced a term it does not belong to.
    #[error("Grade data for term {actual} does not match requested term {requested}")]
    TermMismatch { requested: String, actual: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when stored credentials or flow parameters do not meet
/// requirements. Used for early validation before any network call runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g., a term value that is not numeric).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidDateKey {
            source_kind: "exam",
            value: "03/10/2024".to_string(),
            reason: "input contains invalid characters".to_string(),
        };
        assert!(err.to_string().contains("exam"));
        assert!(err.to_string().contains("03/10/2024"));
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "username".to_string(),
        };
        assert_eq!(err.to_string(), "username is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "password".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
