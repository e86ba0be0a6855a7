//! # portal-db: Persistence Layer for the Portal Sync Engine
//!
//! This crate provides local offline storage for synced portal data.
//! It uses SQLite via sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Portal Data Flow                                 │
//! │                                                                         │
//! │  portal-sync (COMMON flow: fetch ──► merge ──► persist)                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     portal-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (snapshot.rs) │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SnapshotRepo  │    │ 001_init.sql │  │   │
//! │  │   │ WAL + FKs     │    │ JournalRepo   │    │              │  │   │
//! │  │   │               │    │ Term/Grade/   │    │              │  │   │
//! │  │   │               │    │ PreferenceRepo│    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (offline display reads from here)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (snapshot, journal, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use portal_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/portal.db")).await?;
//!
//! // The COMMON flow hands one generation to the gateway:
//! db.snapshot().replace(&snapshot).await?;
//!
//! // The display reads it back:
//! let entries = db.journal().list_entries().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::grade::GradeRepository;
pub use repository::journal::JournalRepository;
pub use repository::prefs::{keys as pref_keys, PreferenceRepository};
pub use repository::snapshot::SnapshotRepository;
pub use repository::term::TermRepository;
