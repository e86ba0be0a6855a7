//! # Sync Error Types
//!
//! Error types for sync operations.
//!
//! ## Error Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sync Error Categories                             │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Authentication │  │     Fetch       │  │     Flow                │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  TokenAcquisit. │  │  Fetch{endpoint}│  │  UnsupportedFlow        │ │
//! │  │  Authentication │  │  (first failing │  │  EmptyCourseSet         │ │
//! │  │  InvalidCreds   │  │   endpoint wins)│  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │     Merge       │  │   Persistence   │  │     Configuration       │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Merge          │  │  Persistence    │  │  InvalidConfig          │ │
//! │  │  (bad date key) │  │  (rolled back)  │  │  InvalidUrl             │ │
//! │  │                 │  │                 │  │  ConfigLoad/ConfigSave  │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every stage propagates failure upward unchanged — no retry, no fallback.
//! The orchestrator logs the error and fires the failure continuation; a
//! persistence error is only surfaced after its transaction has fully rolled
//! back.

use thiserror::Error;

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Sync error type covering all possible sync failures.
///
/// ## Design Principles
/// - Each variant includes enough context for debugging
/// - Errors are categorized for different handling strategies
/// - All errors are `Send + Sync` for async compatibility
#[derive(Debug, Error)]
pub enum SyncError {
    // =========================================================================
    // Authentication Errors
    // =========================================================================
    /// The anti-forgery token call failed.
    #[error("Token acquisition failed: {0}")]
    TokenAcquisition(String),

    /// Sign-in failed (network error or rejected credentials).
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Stored credentials failed validation before any network call.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    // =========================================================================
    // Fetch Errors
    // =========================================================================
    /// A record fetch failed. In a fan-out, the first failing endpoint's
    /// error is the one surfaced.
    #[error("Fetching {endpoint} failed: {message}")]
    Fetch { endpoint: String, message: String },

    // =========================================================================
    // Flow Errors
    // =========================================================================
    /// The caller named a flow kind this engine does not know.
    #[error("No such sync operation: {0}")]
    UnsupportedFlow(String),

    /// RESOURCES was requested without any courses to fetch for.
    #[error("RESOURCES flow requires a non-empty course set")]
    EmptyCourseSet,

    // =========================================================================
    // Merge / Persistence Errors
    // =========================================================================
    /// The journal merge rejected a record (unparseable date).
    #[error("Journal merge failed: {0}")]
    Merge(String),

    /// The snapshot transaction failed and was rolled back.
    #[error("Persistence failed: {0}")]
    Persistence(String),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid sync configuration.
    #[error("Invalid sync configuration: {0}")]
    InvalidConfig(String),

    /// Invalid portal URL.
    #[error("Invalid portal URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoad(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSave(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<portal_db::DbError> for SyncError {
    fn from(err: portal_db::DbError) -> Self {
        SyncError::Persistence(err.to_string())
    }
}

impl From<portal_core::ValidationError> for SyncError {
    fn from(err: portal_core::ValidationError) -> Self {
        SyncError::InvalidCredentials(err.to_string())
    }
}

impl From<url::ParseError> for SyncError {
    fn from(err: url::ParseError) -> Self {
        SyncError::InvalidUrl(err.to_string())
    }
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::ConfigLoad(err.to_string())
    }
}

impl From<toml::de::Error> for SyncError {
    fn from(err: toml::de::Error) -> Self {
        SyncError::ConfigLoad(err.to_string())
    }
}

impl From<toml::ser::Error> for SyncError {
    fn from(err: toml::ser::Error) -> Self {
        SyncError::ConfigSave(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl SyncError {
    /// Returns true if this error came back from the network.
    ///
    /// There is no retry policy in this engine; the categorization exists
    /// for callers that want to distinguish connectivity problems from
    /// local ones when presenting the failure.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            SyncError::TokenAcquisition(_)
                | SyncError::Authentication(_)
                | SyncError::Fetch { .. }
        )
    }

    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            SyncError::InvalidConfig(_)
                | SyncError::InvalidUrl(_)
                | SyncError::ConfigLoad(_)
                | SyncError::ConfigSave(_)
        )
    }

    /// Returns the failing endpoint for fetch errors.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            SyncError::Fetch { endpoint, .. } => Some(endpoint),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_errors() {
        assert!(SyncError::TokenAcquisition("timeout".into()).is_network());
        assert!(SyncError::Authentication("401".into()).is_network());
        assert!(SyncError::Fetch {
            endpoint: "sessions".into(),
            message: "connection reset".into()
        }
        .is_network());

        assert!(!SyncError::EmptyCourseSet.is_network());
        assert!(!SyncError::Merge("bad date".into()).is_network());
    }

    #[test]
    fn test_config_errors() {
        assert!(SyncError::InvalidUrl("not a url".into()).is_config_error());
        assert!(!SyncError::UnsupportedFlow("BOGUS".into()).is_config_error());
    }

    #[test]
    fn test_fetch_error_carries_endpoint() {
        let err = SyncError::Fetch {
            endpoint: "grades".into(),
            message: "500".into(),
        };
        assert_eq!(err.endpoint(), Some("grades"));
        assert!(err.to_string().contains("grades"));

        assert_eq!(SyncError::EmptyCourseSet.endpoint(), None);
    }

    #[test]
    fn test_db_error_maps_to_persistence() {
        let db_err = portal_db::DbError::TransactionFailed("rollback".into());
        let err: SyncError = db_err.into();
        assert!(matches!(err, SyncError::Persistence(_)));
    }
}
