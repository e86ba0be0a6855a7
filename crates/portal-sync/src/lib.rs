//! # portal-sync: Sync Engine for the Portal App
//!
//! This crate coordinates synchronization against the university's
//! academic-records service: token acquisition, authenticated sign-in,
//! parallel record fetches, the journal merge, and atomic snapshot
//! persistence.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sync Engine Architecture                         │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                    SyncAgent (Main Orchestrator)                 │  │
//! │  │                                                                  │  │
//! │  │  Runs one of three flows per call:                               │  │
//! │  │    INIT      - authenticate + bootstrap                          │  │
//! │  │    COMMON    - fetch ► merge ► persist                           │  │
//! │  │    RESOURCES - fetch course resources                            │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ PortalGateway  │  │   Protocol     │  │  portal-db             │    │
//! │  │ (client.rs)    │  │ (protocol.rs)  │  │                        │    │
//! │  │                │  │                │  │ Snapshot replace       │    │
//! │  │ reqwest client │  │ Wire DTOs +    │  │ Terms, preferences     │    │
//! │  │ behind a trait │  │ body parsers   │  │ (cookie refresh)       │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! │  GUARANTEES:                                                           │
//! │  • Sign-in strictly precedes any data fetch                            │
//! │  • Term discovery strictly precedes exam/grade fetch                   │
//! │  • Fan-out joins before merge; merge precedes persistence             │
//! │  • Exactly one of the caller's continuations fires per sync call      │
//! │  • No retry anywhere; failures propagate unchanged                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`agent`] - Main `SyncAgent` orchestrator and the flow state machine
//! - [`client`] - `PortalGateway` trait and the reqwest implementation
//! - [`config`] - Sync configuration (base URL, transport timeouts)
//! - [`error`] - Sync error taxonomy
//! - [`protocol`] - Wire DTOs and profile/finance-summary parsers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use portal_db::{Database, DbConfig};
//! use portal_sync::{PortalClient, SyncAgent, SyncConfig, SyncFlow};
//!
//! let config = SyncConfig::load_or_default(None);
//! let db = Database::new(DbConfig::new("portal.db")).await?;
//! let agent = SyncAgent::new(PortalClient::new(&config)?, db);
//!
//! agent
//!     .sync_with(
//!         SyncFlow::Common,
//!         |report| println!("synced {} journal entries", report.entries),
//!         |error| eprintln!("sync failed: {error}"),
//!     )
//!     .await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod agent;
pub mod client;
pub mod config;
pub mod error;
pub mod protocol;

// =============================================================================
// Re-exports
// =============================================================================

pub use agent::{NoOpObserver, SyncAgent, SyncFlow, SyncObserver, SyncReport};
pub use client::{PortalClient, PortalGateway};
pub use config::{PortalSettings, SyncConfig, TransportSettings};
pub use error::{SyncError, SyncResult};
pub use protocol::{AuthResponse, ExamRequestBody, Tokens};
