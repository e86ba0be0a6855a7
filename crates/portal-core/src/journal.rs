//! # Journal Merge
//!
//! Combines the exam, finance, and session record sets into a single list of
//! date-keyed journal entries with back-references.
//!
//! ## Merge Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Journal Merge                                   │
//! │                                                                         │
//! │  finances ──► one entry per record, id = date_key(due_date)            │
//! │  exams    ──► one entry per record, id = date_key(date)                │
//! │  sessions ──► one entry per record, id = date_key(date)                │
//! │       │                                                                 │
//! │       ▼  (concatenated, NOT deduplicated)                              │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Cross-population pass                              │   │
//! │  │                                                                 │   │
//! │  │  for each entry:                                                │   │
//! │  │    scan ALL sessions  ─ append ids where date == entry.id       │   │
//! │  │    scan ALL finances  ─ append ids where due_date == entry.id   │   │
//! │  │    scan ALL exams     ─ append ids where date == entry.id       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Vec<JournalEntry> — unordered, one entry per SOURCE RECORD            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A date contributed by several source lists therefore appears as several
//! entries, each fully cross-populated with the same references. Downstream
//! readers group by date and must tolerate the duplicates.
//!
//! Cost is O(n·(s+f+e)). The data volume is a handful of terms' worth of
//! records, so the quadratic scan is not a concern at this layer.

use crate::error::{CoreError, CoreResult};
use crate::types::{ExamRecord, FinanceRecord, JournalEntry, SessionRecord};

use chrono::NaiveDate;

/// Canonical date-key pattern.
pub const DATE_KEY_PATTERN: &str = "%Y-%m-%d";

/// Length of the canonical date key (`yyyy-MM-dd`).
pub const DATE_KEY_LEN: usize = 10;

// =============================================================================
// Date-Key Normalization
// =============================================================================

/// Derives the canonical 10-character date key from a raw record date.
///
/// Takes the first [`DATE_KEY_LEN`] characters, parses them as `yyyy-MM-dd`,
/// and reformats with the same pattern. Source strings may carry a trailing
/// time component (`"2024-03-10 23:59:00"`); only the date prefix survives.
///
/// ## Errors
/// [`CoreError::InvalidDateKey`] when the raw value is shorter than the key
/// or the prefix does not parse.
pub fn date_key(raw: &str, source_kind: &'static str) -> CoreResult<String> {
    let prefix = raw.get(..DATE_KEY_LEN).ok_or_else(|| CoreError::InvalidDateKey {
        source_kind,
        value: raw.to_string(),
        reason: format!("shorter than the {DATE_KEY_LEN}-character date key"),
    })?;

    let date = NaiveDate::parse_from_str(prefix, DATE_KEY_PATTERN).map_err(|e| {
        CoreError::InvalidDateKey {
            source_kind,
            value: raw.to_string(),
            reason: e.to_string(),
        }
    })?;

    Ok(date.format(DATE_KEY_PATTERN).to_string())
}

// =============================================================================
// Merge
// =============================================================================

/// Merges the three record collections into journal entries.
///
/// One entry is created per source record (finances first, then exams, then
/// sessions), and every entry is then cross-populated against all three full
/// collections. The correlation pass compares the RAW record date string
/// against the entry's canonical id — records whose raw date carries a time
/// suffix correlate to nothing, matching the portal's historical behavior.
///
/// The result is unordered and may contain several entries with the same id;
/// the store orders and groups at read time.
pub fn merge_journal(
    exams: &[ExamRecord],
    finances: &[FinanceRecord],
    sessions: &[SessionRecord],
) -> CoreResult<Vec<JournalEntry>> {
    let mut items = Vec::with_capacity(finances.len() + exams.len() + sessions.len());

    for finance in finances {
        items.push(JournalEntry::new(date_key(&finance.due_date, "finance")?));
    }
    for exam in exams {
        items.push(JournalEntry::new(date_key(&exam.date, "exam")?));
    }
    for session in sessions {
        items.push(JournalEntry::new(date_key(&session.date, "session")?));
    }

    for item in items.iter_mut() {
        for session in sessions {
            if item.id == session.date {
                item.sessions.push(session.id.clone());
            }
        }
        for finance in finances {
            if item.id == finance.due_date {
                item.finances.push(finance.id.clone());
            }
        }
        for exam in exams {
            if item.id == exam.date {
                item.exams.push(exam.id.clone());
            }
        }
    }

    Ok(items)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::new_record_id;

    fn finance(due_date: &str) -> FinanceRecord {
        FinanceRecord {
            id: new_record_id(),
            due_date: due_date.to_string(),
            amount_cents: 1_250_000,
            description: "Tuition installment".to_string(),
        }
    }

    fn exam(date: &str) -> ExamRecord {
        ExamRecord {
            id: new_record_id(),
            date: date.to_string(),
            course_id: "COMP6047".to_string(),
            course_name: "Algorithm Design".to_string(),
            room: "R-401".to_string(),
            shift: "1".to_string(),
        }
    }

    fn session(date: &str) -> SessionRecord {
        SessionRecord {
            id: new_record_id(),
            date: date.to_string(),
            course_id: "COMP6047".to_string(),
            course_name: "Algorithm Design".to_string(),
            room: "R-401".to_string(),
            start_time: "07:20".to_string(),
            end_time: "09:00".to_string(),
        }
    }

    #[test]
    fn test_date_key_passthrough() {
        assert_eq!(date_key("2024-03-10", "finance").unwrap(), "2024-03-10");
    }

    #[test]
    fn test_date_key_truncates_time_suffix() {
        assert_eq!(
            date_key("2024-03-10 23:59:00", "finance").unwrap(),
            "2024-03-10"
        );
    }

    #[test]
    fn test_date_key_rejects_short_input() {
        let err = date_key("2024-3-1", "session").unwrap_err();
        assert!(matches!(err, CoreError::InvalidDateKey { .. }));
    }

    #[test]
    fn test_date_key_rejects_unparseable_input() {
        let err = date_key("10/03/2024", "exam").unwrap_err();
        assert!(matches!(err, CoreError::InvalidDateKey { .. }));
    }

    #[test]
    fn test_single_finance_produces_single_entry() {
        let finances = [finance("2024-03-10")];
        let entries = merge_journal(&[], &finances, &[]).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "2024-03-10");
        assert_eq!(entries[0].finances, vec![finances[0].id.clone()]);
        assert!(entries[0].sessions.is_empty());
        assert!(entries[0].exams.is_empty());
    }

    #[test]
    fn test_same_date_from_two_sources_yields_two_entries() {
        let finances = [finance("2024-03-10")];
        let exams = [exam("2024-03-10")];
        let entries = merge_journal(&exams, &finances, &[]).unwrap();

        // One entry per contributing source record, both cross-populated
        // identically.
        assert_eq!(entries.len(), 2);
        for entry in &entries {
            assert_eq!(entry.id, "2024-03-10");
            assert_eq!(entry.finances, vec![finances[0].id.clone()]);
            assert_eq!(entry.exams, vec![exams[0].id.clone()]);
            assert!(entry.sessions.is_empty());
        }
    }

    #[test]
    fn test_three_sources_on_one_date_yield_three_entries() {
        let finances = [finance("2024-03-10")];
        let exams = [exam("2024-03-10")];
        let sessions = [session("2024-03-10")];
        let entries = merge_journal(&exams, &finances, &sessions).unwrap();

        assert_eq!(entries.len(), 3);
        for entry in &entries {
            assert_eq!(entry.sessions.len(), 1);
            assert_eq!(entry.finances.len(), 1);
            assert_eq!(entry.exams.len(), 1);
        }
    }

    #[test]
    fn test_distinct_dates_stay_separate() {
        let finances = [finance("2024-03-10")];
        let sessions = [session("2024-04-02"), session("2024-04-02")];
        let entries = merge_journal(&[], &finances, &sessions).unwrap();

        assert_eq!(entries.len(), 3);

        let finance_entry = entries.iter().find(|e| e.id == "2024-03-10").unwrap();
        assert_eq!(finance_entry.finances.len(), 1);
        assert!(finance_entry.sessions.is_empty());

        // Both session entries for 2024-04-02 reference both sessions.
        let session_entries: Vec<_> =
            entries.iter().filter(|e| e.id == "2024-04-02").collect();
        assert_eq!(session_entries.len(), 2);
        for entry in session_entries {
            assert_eq!(entry.sessions.len(), 2);
            assert!(entry.finances.is_empty());
        }
    }

    #[test]
    fn test_correlation_compares_raw_dates() {
        // The entry id is normalized but correlation is against the raw
        // string, so a due-date with a time suffix produces an entry that
        // references nothing.
        let finances = [finance("2024-03-10 23:59:00")];
        let entries = merge_journal(&[], &finances, &[]).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "2024-03-10");
        assert!(entries[0].finances.is_empty());
    }

    #[test]
    fn test_empty_inputs_produce_no_entries() {
        assert!(merge_journal(&[], &[], &[]).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_source_date_fails_merge() {
        let finances = [finance("bad-date!!")];
        assert!(merge_journal(&[], &finances, &[]).is_err());
    }
}
