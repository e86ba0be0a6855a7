//! # Domain Types
//!
//! Core record types used throughout the Portal sync engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Record Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  SessionRecord  │   │   ExamRecord    │   │  FinanceRecord  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  date           │   │  date           │   │  due_date       │       │
//! │  │  course_id      │   │  course_id      │   │  amount_cents   │       │
//! │  │  room, times    │   │  room, shift    │   │  description    │       │
//! │  └────────┬────────┘   └────────┬────────┘   └────────┬────────┘       │
//! │           │                     │                     │                │
//! │           └──────────┬──────────┴──────────┬──────────┘                │
//! │                      ▼                     │                            │
//! │            ┌──────────────────┐            │                            │
//! │            │   JournalEntry   │◄───────────┘                            │
//! │            │  ──────────────  │  id = canonical date key               │
//! │            │  back-references │  (references by record id,             │
//! │            │  to all three    │   never copies)                        │
//! │            └──────────────────┘                                        │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Term       │   │   GradeRecord   │   │     Profile     │       │
//! │  │  value, label   │   │  credit         │   │  name, major    │       │
//! │  │  position       │   │  gradings[]     │   │  degree, nim    │       │
//! │  │  (0 = current)  │   │  scores[]       │   │  birthday       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every fetched record gets a UUID v4 `id` when it is mapped off the wire.
//! Journal entries back-reference records by that id; the store persists the
//! references as link rows, so entries never duplicate record payloads.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Term
// =============================================================================

/// An academic term identifier.
///
/// The portal returns terms as an ordered sequence; the first element is the
/// current term and gates which exam/grade data is requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// Opaque term value used as a request parameter (e.g. "1610").
    pub value: String,

    /// Human-readable label (e.g. "Odd Semester 2024/2025").
    pub label: String,

    /// Position in the fetched sequence. Position 0 is the current term.
    pub position: i64,
}

impl Term {
    /// Returns true if this is the current term.
    pub fn is_current(&self) -> bool {
        self.position == 0
    }
}

// =============================================================================
// Schedule Records
// =============================================================================

/// A scheduled class occurrence. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// UUID v4, assigned when the record is mapped off the wire.
    pub id: String,

    /// Raw session date string as returned by the portal.
    pub date: String,

    pub course_id: String,
    pub course_name: String,
    pub room: String,
    pub start_time: String,
    pub end_time: String,
}

/// An exam occurrence. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamRecord {
    /// UUID v4, assigned when the record is mapped off the wire.
    pub id: String,

    /// Raw exam date string as returned by the portal (`yyyy-MM-dd`).
    pub date: String,

    pub course_id: String,
    pub course_name: String,
    pub room: String,
    pub shift: String,
}

/// A billing due item.
///
/// Amounts are integer cents, never floats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinanceRecord {
    /// UUID v4, assigned when the record is mapped off the wire.
    pub id: String,

    /// Raw due-date string as returned by the portal.
    pub due_date: String,

    pub amount_cents: i64,
    pub description: String,
}

// =============================================================================
// Grades
// =============================================================================

/// Per-term credit totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditRecord {
    /// Term this credit row belongs to. Stamped from the enclosing
    /// [`GradeRecord`] before persistence.
    pub term: String,

    pub credits_attempted: i64,
    pub credits_earned: i64,
    pub grade_points: f64,
}

/// A per-assessment grading weight (e.g. "Mid Exam 30%").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingRecord {
    pub id: String,
    pub course_id: String,
    pub assessment: String,
    pub weight_pct: i64,
}

/// A per-assessment score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: String,
    pub course_id: String,
    pub assessment: String,
    pub score: f64,
}

/// Composite grade payload for one term.
///
/// The sub-collections are replaced independently of the credit row during
/// persistence: each is deleted-then-inserted on its own, and the credit row
/// is upserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeRecord {
    pub term: String,
    pub credit: CreditRecord,
    pub gradings: Vec<GradingRecord>,
    pub scores: Vec<ScoreRecord>,
}

// =============================================================================
// Profile & Finance Summary
// =============================================================================

/// Student profile scalars.
///
/// Stored as discrete preference rows, field by field — these are not store
/// entities and are not covered by snapshot atomicity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub student_id: String,
    pub major: String,
    pub degree: String,
    pub birthday: String,
}

/// Charge/payment totals, stored as preference rows like [`Profile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinanceSummary {
    pub charge_cents: i64,
    pub payment_cents: i64,
}

// =============================================================================
// Courses & Credentials
// =============================================================================

/// Reference to a course, input to the RESOURCES flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseRef {
    pub course_id: String,
    pub class_section: String,
}

/// Stored credentials.
///
/// Owned by the preference store; read fresh at the start of every flow.
/// Only the authenticator writes `cookie` back after a successful sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub cookie: String,
}

// =============================================================================
// Journal
// =============================================================================

/// Merged per-date view over sessions, finances, and exams.
///
/// `id` is the canonical 10-character date key derived from whichever source
/// record contributed the entry. The three lists hold record ids, not record
/// copies. The merge does NOT deduplicate ids: when more than one source list
/// contributes an entry for the same date, multiple entries with the same id
/// exist, each fully cross-populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Canonical date key, `yyyy-MM-dd`.
    pub id: String,

    /// Ids of every [`SessionRecord`] whose date equals `id`.
    pub sessions: Vec<String>,

    /// Ids of every [`FinanceRecord`] whose due-date equals `id`.
    pub finances: Vec<String>,

    /// Ids of every [`ExamRecord`] whose date equals `id`.
    pub exams: Vec<String>,
}

impl JournalEntry {
    /// Creates an empty entry for a canonical date key.
    pub fn new(id: impl Into<String>) -> Self {
        JournalEntry {
            id: id.into(),
            sessions: Vec::new(),
            finances: Vec::new(),
            exams: Vec::new(),
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// One generation of synced data, handed to the persistence gateway as a
/// unit.
///
/// The entry list plus the three record collections are replaced atomically;
/// grade sub-collections and the credit row ride in the same transaction;
/// profile and finance summary are best-effort preference writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSnapshot {
    pub entries: Vec<JournalEntry>,
    pub sessions: Vec<SessionRecord>,
    pub exams: Vec<ExamRecord>,
    pub finances: Vec<FinanceRecord>,
    pub grade: GradeRecord,
    pub profile: Profile,
    pub summary: FinanceSummary,
}

// =============================================================================
// Helpers
// =============================================================================

/// Generates a fresh record id.
///
/// Records get their identity at wire-mapping time so journal entries can
/// back-reference them before anything touches the store.
pub fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_is_current() {
        let current = Term {
            value: "1610".to_string(),
            label: "Odd Semester".to_string(),
            position: 0,
        };
        let past = Term {
            value: "1520".to_string(),
            label: "Even Semester".to_string(),
            position: 3,
        };
        assert!(current.is_current());
        assert!(!past.is_current());
    }

    #[test]
    fn test_journal_entry_starts_empty() {
        let entry = JournalEntry::new("2024-03-10");
        assert_eq!(entry.id, "2024-03-10");
        assert!(entry.sessions.is_empty());
        assert!(entry.finances.is_empty());
        assert!(entry.exams.is_empty());
    }

    #[test]
    fn test_record_ids_are_unique() {
        assert_ne!(new_record_id(), new_record_id());
    }
}
