//! # portal-core: Pure Domain Logic for the Portal Sync Engine
//!
//! This crate is the **heart** of the sync engine. It holds the record types
//! and the journal merge as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Portal Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  portal-sync (Orchestration)                    │   │
//! │  │    tokens ──► sign-in ──► terms ──► fan-out fetch ──► merge     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ portal-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  journal  │  │   error   │  │ validation│  │   │
//! │  │   │  Records  │  │   merge   │  │ CoreError │  │   rules   │  │   │
//! │  │   │  Snapshot │  │ date keys │  │ Validation│  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    portal-db (Persistence)                      │   │
//! │  │          SQLite snapshot replace, preferences, reads            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Record types (SessionRecord, ExamRecord, FinanceRecord, ...)
//! - [`journal`] - Date-key normalization and the journal merge
//! - [`error`] - Domain error types
//! - [`validation`] - Credential and term validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: the merge is deterministic - same input = same output
//! 2. **No I/O**: database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: billing amounts are cents (i64), never floats
//! 4. **Explicit Errors**: all errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod journal;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use portal_core::JournalEntry` instead of
// `use portal_core::types::JournalEntry`

pub use error::{CoreError, CoreResult, ValidationError};
pub use journal::{date_key, merge_journal, DATE_KEY_LEN, DATE_KEY_PATTERN};
pub use types::*;
