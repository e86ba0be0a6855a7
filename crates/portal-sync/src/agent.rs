//! # Sync Agent
//!
//! Main orchestrator for the sync engine. Sequences token acquisition,
//! sign-in, record fetches, the journal merge, and snapshot persistence into
//! the three named flows.
//!
//! ## Flow Sequences
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         SyncAgent Flows                                 │
//! │                                                                         │
//! │  INIT                                                                  │
//! │  ────                                                                  │
//! │  tokens ──► sign-in ──► bootstrap                                      │
//! │                                                                         │
//! │  COMMON                                                                │
//! │  ──────                                                                │
//! │  tokens ──► sign-in ──► terms ──► sign-in (cookie refresh) ──► terms   │
//! │       │                                                                 │
//! │       ▼  current term = first of the fetched sequence                  │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │ fan-out (wait-all, fail-fast):                                   │  │
//! │  │   finances │ sessions │ exams(term) │ grades(term) │ profile │   │  │
//! │  │   financeSummary                                                 │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  merge ──► snapshot replace ──► report                                 │
//! │                                                                         │
//! │  RESOURCES                                                             │
//! │  ─────────                                                             │
//! │  tokens ──► sign-in ──► resources(courses)                             │
//! │                                                                         │
//! │  DELIVERY: exactly one of the success/failure continuations fires,     │
//! │  never both, never neither. Failures are logged to the telemetry       │
//! │  sink (tracing + observer) before the failure continuation runs.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ordering guarantees: sign-in strictly precedes any data fetch; term
//! discovery strictly precedes the exam/grade fetch; merge precedes
//! persistence; persistence precedes success delivery. There is no retry and
//! no cancellation beyond the transport's own timeouts.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::client::PortalGateway;
use crate::error::{SyncError, SyncResult};
use crate::protocol::{parse_finance_summary, parse_profile, ExamRequestBody, Tokens};
use portal_core::validation::{validate_credentials, validate_term_value};
use portal_core::{merge_journal, CourseRef, Credentials, SyncSnapshot};
use portal_db::Database;

// =============================================================================
// Sync Flow
// =============================================================================

/// The three sync flows, as a closed set.
///
/// Callers that still speak the historical string kinds go through
/// [`SyncFlow::parse`], which is where an unrecognized kind fails — before
/// any network call is attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncFlow {
    /// First-run bootstrap: authenticate and initialize, no fetch/merge.
    Init,

    /// The full fetch + merge + persist cycle.
    Common,

    /// Fetch course resources for the supplied course set.
    Resources(Vec<CourseRef>),
}

impl SyncFlow {
    /// Maps a caller-supplied flow kind onto a flow.
    ///
    /// ## Errors
    /// - [`SyncError::UnsupportedFlow`] for an unrecognized kind
    /// - [`SyncError::EmptyCourseSet`] for RESOURCES without courses
    pub fn parse(kind: &str, courses: Option<Vec<CourseRef>>) -> SyncResult<Self> {
        match kind {
            "INIT" => Ok(SyncFlow::Init),
            "COMMON" => Ok(SyncFlow::Common),
            "RESOURCES" => match courses {
                Some(courses) if !courses.is_empty() => Ok(SyncFlow::Resources(courses)),
                _ => Err(SyncError::EmptyCourseSet),
            },
            other => Err(SyncError::UnsupportedFlow(other.to_string())),
        }
    }

    /// The flow's string kind.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncFlow::Init => "INIT",
            SyncFlow::Common => "COMMON",
            SyncFlow::Resources(_) => "RESOURCES",
        }
    }
}

// =============================================================================
// Sync Report
// =============================================================================

/// Per-flow outcome handed to the success continuation.
///
/// This is the whole of the engine's flow state: there is no global
/// in-flight flag, so a failed flow leaves nothing behind to reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Flow kind this report belongs to.
    pub flow: String,

    /// Terms known after the flow.
    pub terms: usize,

    /// Records fetched by the COMMON fan-out.
    pub sessions: usize,
    pub exams: usize,
    pub finances: usize,

    /// Journal entries produced by the merge (duplicates per date included).
    pub entries: usize,

    /// Course resources fetched by the RESOURCES flow.
    pub resources: usize,
}

impl SyncReport {
    fn for_flow(flow: &str) -> Self {
        SyncReport {
            flow: flow.to_string(),
            ..SyncReport::default()
        }
    }
}

// =============================================================================
// Observer Trait
// =============================================================================

/// Telemetry sink for flow lifecycle events.
pub trait SyncObserver: Send + Sync {
    /// A flow has started.
    fn flow_started(&self, _flow: &str) {}

    /// A flow finished successfully.
    fn flow_completed(&self, _report: &SyncReport) {}

    /// A flow failed; called before the failure continuation fires.
    fn flow_failed(&self, _flow: &str, _error: &SyncError) {}
}

/// No-op observer used when the caller supplies none.
pub struct NoOpObserver;

impl SyncObserver for NoOpObserver {}

// =============================================================================
// Sync Agent
// =============================================================================

/// Main sync agent that orchestrates the flows.
pub struct SyncAgent<A: PortalGateway> {
    /// Gateway to the academic-records service.
    api: A,

    /// Local store (snapshot gateway, preferences, terms).
    db: Database,

    /// Telemetry observer.
    observer: Arc<dyn SyncObserver>,
}

impl<A: PortalGateway> SyncAgent<A> {
    /// Creates a new sync agent.
    pub fn new(api: A, db: Database) -> Self {
        Self::with_observer(api, db, Arc::new(NoOpObserver))
    }

    /// Creates a new sync agent with a custom observer.
    pub fn with_observer(api: A, db: Database, observer: Arc<dyn SyncObserver>) -> Self {
        SyncAgent { api, db, observer }
    }

    /// Runs one flow to completion.
    ///
    /// The returned report (or error) is the flow's entire state; nothing
    /// global is mutated besides the persisted data itself.
    pub async fn sync(&self, flow: SyncFlow) -> SyncResult<SyncReport> {
        let kind = flow.kind();
        info!(flow = kind, "Sync started");
        self.observer.flow_started(kind);

        let result = match flow {
            SyncFlow::Init => self.run_init().await,
            SyncFlow::Common => self.run_common().await,
            SyncFlow::Resources(courses) => self.run_resources(&courses).await,
        };

        match &result {
            Ok(report) => {
                info!(flow = kind, entries = report.entries, "Sync completed");
                self.observer.flow_completed(report);
            }
            Err(e) => {
                error!(flow = kind, error = %e, "Sync failed");
                self.observer.flow_failed(kind, e);
            }
        }

        result
    }

    /// Runs one flow and delivers the outcome to exactly one continuation.
    ///
    /// `FnOnce` makes double delivery unrepresentable; the match makes
    /// non-delivery unrepresentable.
    pub async fn sync_with<S, F>(&self, flow: SyncFlow, on_success: S, on_failure: F)
    where
        S: FnOnce(SyncReport),
        F: FnOnce(SyncError),
    {
        match self.sync(flow).await {
            Ok(report) => on_success(report),
            Err(e) => on_failure(e),
        }
    }

    // =========================================================================
    // Flows
    // =========================================================================

    async fn run_init(&self) -> SyncResult<SyncReport> {
        let (credentials, tokens) = self.prepare().await?;
        let cookie = self
            .sign_in_and_refresh(&credentials, &tokens, credentials.cookie.clone())
            .await?;

        self.api.bootstrap(&cookie).await?;

        Ok(SyncReport::for_flow("INIT"))
    }

    async fn run_common(&self) -> SyncResult<SyncReport> {
        let (credentials, tokens) = self.prepare().await?;

        let mut cookie = self
            .sign_in_and_refresh(&credentials, &tokens, credentials.cookie.clone())
            .await?;

        let terms = self.api.get_terms(&cookie).await?;
        self.db.terms().upsert_terms(&terms).await?;

        // Re-sign-in refreshes the cookie before the fan-out; the term list
        // is fetched again under the fresh session.
        cookie = self
            .sign_in_and_refresh(&credentials, &tokens, cookie)
            .await?;

        let terms = self.api.get_terms(&cookie).await?;
        self.db.terms().upsert_terms(&terms).await?;

        let current = terms.first().cloned().ok_or_else(|| SyncError::Fetch {
            endpoint: "terms".to_string(),
            message: "portal returned no terms".to_string(),
        })?;
        validate_term_value(&current.value).map_err(|e| SyncError::Fetch {
            endpoint: "terms".to_string(),
            message: e.to_string(),
        })?;

        debug!(term = %current.value, "Fan-out fetch for current term");

        // Wait-all, fail-fast: the first failing endpoint's error wins and
        // the remaining fetches are dropped.
        let exam_body = ExamRequestBody::new(current.value.clone());
        let (finances, sessions, exams, grade, profile_body, summary_body) = tokio::try_join!(
            self.api.get_finances(&cookie),
            self.api.get_sessions(&cookie),
            self.api.get_exams(&exam_body, &cookie),
            self.api.get_grades(&current.value, &cookie),
            self.api.get_profile(&cookie),
            self.api.get_finance_summary(&cookie),
        )?;

        let profile = parse_profile(&profile_body)?;
        let summary = parse_finance_summary(&summary_body)?;

        let entries =
            merge_journal(&exams, &finances, &sessions).map_err(|e| SyncError::Merge(e.to_string()))?;

        let report = SyncReport {
            flow: "COMMON".to_string(),
            terms: terms.len(),
            sessions: sessions.len(),
            exams: exams.len(),
            finances: finances.len(),
            entries: entries.len(),
            resources: 0,
        };

        let snapshot = SyncSnapshot {
            entries,
            sessions,
            exams,
            finances,
            grade,
            profile,
            summary,
        };
        self.db.snapshot().replace(&snapshot).await?;

        Ok(report)
    }

    async fn run_resources(&self, courses: &[CourseRef]) -> SyncResult<SyncReport> {
        if courses.is_empty() {
            return Err(SyncError::EmptyCourseSet);
        }

        let (credentials, tokens) = self.prepare().await?;
        let cookie = self
            .sign_in_and_refresh(&credentials, &tokens, credentials.cookie.clone())
            .await?;

        let resources = self.api.get_resources(&cookie, courses).await?;

        let mut report = SyncReport::for_flow("RESOURCES");
        report.resources = resources.len();
        Ok(report)
    }

    // =========================================================================
    // Shared Steps
    // =========================================================================

    /// Reads credentials fresh from the preference store, validates them,
    /// and fetches the anti-forgery tokens.
    ///
    /// Fresh reads pick up a cookie refreshed by a concurrent flow; the
    /// cookie itself is still racy across flows by design.
    async fn prepare(&self) -> SyncResult<(Credentials, Tokens)> {
        let credentials = self.db.prefs().credentials().await?;
        validate_credentials(&credentials)?;

        let tokens = self.api.get_tokens().await?;
        Ok((credentials, tokens))
    }

    /// Signs in and persists a refreshed cookie when the response carries
    /// one. This is the sole cookie write in the engine.
    async fn sign_in_and_refresh(
        &self,
        credentials: &Credentials,
        tokens: &Tokens,
        cookie: String,
    ) -> SyncResult<String> {
        let auth = self
            .api
            .sign_in(&credentials.username, &credentials.password, tokens, &cookie)
            .await?;

        match auth.cookie {
            Some(fresh) => {
                self.db.prefs().set_cookie(&fresh).await?;
                Ok(fresh)
            }
            None => Ok(cookie),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
