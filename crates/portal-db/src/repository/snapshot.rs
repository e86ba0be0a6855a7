//! # Snapshot Repository
//!
//! The persistence gateway: replaces one whole generation of synced data
//! inside a single transaction.
//!
//! ## The Replace Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Snapshot Replace (one transaction)                     │
//! │                                                                         │
//! │  1. DELETE journal_entries (link rows cascade)                         │
//! │  2. DELETE exams, finances, sessions                                   │
//! │                                                                         │
//! │  3. INSERT sessions, exams, finances        ← leaves first             │
//! │  4. INSERT journal_entries + link rows      ← index references leaves  │
//! │                                                                         │
//! │  5. Grade sub-collections:                                             │
//! │     gradings non-empty? DELETE all gradings, INSERT batch              │
//! │     scores   non-empty? DELETE all scores,  INSERT batch               │
//! │     (empty batches leave the previous rows untouched)                  │
//! │                                                                         │
//! │  6. UPSERT credit row, stamped with the grade's term                   │
//! │                                                                         │
//! │  COMMIT ← all visible, or none (any error rolls everything back)       │
//! │                                                                         │
//! │  AFTER COMMIT (non-transactional, field-by-field):                     │
//! │  7. profile + finance-summary preference scalars                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no incremental diffing: the store is fully replaced per entity
//! kind each cycle. A reader can never observe a half-replaced entity set.

use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::prefs::PreferenceRepository;
use portal_core::{GradeRecord, SyncSnapshot};

/// Repository for atomic snapshot replacement.
#[derive(Debug, Clone)]
pub struct SnapshotRepository {
    pool: SqlitePool,
}

impl SnapshotRepository {
    /// Creates a new SnapshotRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SnapshotRepository { pool }
    }

    /// Replaces the persisted generation with `snapshot`.
    ///
    /// Entity writes are atomic: any failure rolls the whole transaction
    /// back and the previous generation stays visible. The profile and
    /// finance-summary preference scalars are written after the commit and
    /// are not covered by that atomicity; their errors still propagate.
    pub async fn replace(&self, snapshot: &SyncSnapshot) -> DbResult<()> {
        debug!(
            entries = snapshot.entries.len(),
            sessions = snapshot.sessions.len(),
            exams = snapshot.exams.len(),
            finances = snapshot.finances.len(),
            "Replacing snapshot"
        );

        let mut tx = self.pool.begin().await?;

        // Previous generation: index first, then leaves.
        sqlx::query("DELETE FROM journal_entries")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM exams").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM finances").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM sessions").execute(&mut *tx).await?;

        // New generation: leaves before the index so every link row has a
        // target.
        for session in &snapshot.sessions {
            sqlx::query(
                "INSERT INTO sessions (id, date, course_id, course_name, room, start_time, end_time) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(&session.id)
            .bind(&session.date)
            .bind(&session.course_id)
            .bind(&session.course_name)
            .bind(&session.room)
            .bind(&session.start_time)
            .bind(&session.end_time)
            .execute(&mut *tx)
            .await?;
        }

        for exam in &snapshot.exams {
            sqlx::query(
                "INSERT INTO exams (id, date, course_id, course_name, room, shift) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(&exam.id)
            .bind(&exam.date)
            .bind(&exam.course_id)
            .bind(&exam.course_name)
            .bind(&exam.room)
            .bind(&exam.shift)
            .execute(&mut *tx)
            .await?;
        }

        for finance in &snapshot.finances {
            sqlx::query(
                "INSERT INTO finances (id, due_date, amount_cents, description) \
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(&finance.id)
            .bind(&finance.due_date)
            .bind(finance.amount_cents)
            .bind(&finance.description)
            .execute(&mut *tx)
            .await?;
        }

        for entry in &snapshot.entries {
            let result = sqlx::query("INSERT INTO journal_entries (date_key) VALUES (?1)")
                .bind(&entry.id)
                .execute(&mut *tx)
                .await?;
            let entry_id = result.last_insert_rowid();

            for session_id in &entry.sessions {
                sqlx::query("INSERT INTO journal_sessions (entry_id, session_id) VALUES (?1, ?2)")
                    .bind(entry_id)
                    .bind(session_id)
                    .execute(&mut *tx)
                    .await?;
            }
            for finance_id in &entry.finances {
                sqlx::query("INSERT INTO journal_finances (entry_id, finance_id) VALUES (?1, ?2)")
                    .bind(entry_id)
                    .bind(finance_id)
                    .execute(&mut *tx)
                    .await?;
            }
            for exam_id in &entry.exams {
                sqlx::query("INSERT INTO journal_exams (entry_id, exam_id) VALUES (?1, ?2)")
                    .bind(entry_id)
                    .bind(exam_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        insert_grade(&mut tx, &snapshot.grade).await?;

        tx.commit().await?;

        // Preference scalars ride outside entity atomicity: overwritten
        // field by field, best-effort, errors still surfaced.
        let prefs = PreferenceRepository::new(self.pool.clone());
        prefs.save_profile(&snapshot.profile).await?;
        prefs.save_finance_summary(&snapshot.summary).await?;

        debug!("Snapshot replaced");
        Ok(())
    }
}

/// Writes the grade payload inside the snapshot transaction.
///
/// Sub-collections are replaced wholesale, each on its own; an empty batch
/// leaves the previous rows in place. The credit row is stamped with the
/// grade's term and upserted.
async fn insert_grade(tx: &mut Transaction<'_, Sqlite>, grade: &GradeRecord) -> DbResult<()> {
    if !grade.gradings.is_empty() {
        sqlx::query("DELETE FROM gradings").execute(&mut **tx).await?;
        for grading in &grade.gradings {
            sqlx::query(
                "INSERT INTO gradings (id, course_id, assessment, weight_pct) \
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(&grading.id)
            .bind(&grading.course_id)
            .bind(&grading.assessment)
            .bind(grading.weight_pct)
            .execute(&mut **tx)
            .await?;
        }
    }

    if !grade.scores.is_empty() {
        sqlx::query("DELETE FROM scores").execute(&mut **tx).await?;
        for score in &grade.scores {
            sqlx::query(
                "INSERT INTO scores (id, course_id, assessment, score) \
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(&score.id)
            .bind(&score.course_id)
            .bind(&score.assessment)
            .bind(score.score)
            .execute(&mut **tx)
            .await?;
        }
    }

    sqlx::query(
        "INSERT INTO credits (term, credits_attempted, credits_earned, grade_points) \
         VALUES (?1, ?2, ?3, ?4) \
         ON CONFLICT (term) DO UPDATE SET \
             credits_attempted = excluded.credits_attempted, \
             credits_earned = excluded.credits_earned, \
             grade_points = excluded.grade_points",
    )
    .bind(&grade.term)
    .bind(grade.credit.credits_attempted)
    .bind(grade.credit.credits_earned)
    .bind(grade.credit.grade_points)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use portal_core::{
        merge_journal, new_record_id, CreditRecord, ExamRecord, FinanceRecord, FinanceSummary,
        GradeRecord, GradingRecord, Profile, ScoreRecord, SessionRecord,
    };

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

    fn finance(due_date: &str) -> FinanceRecord {
        FinanceRecord {
            id: new_record_id(),
            due_date: due_date.to_string(),
            amount_cents: 1_250_000,
            description: "Tuition installment".to_string(),
        }
    }

    fn grade(term: &str) -> GradeRecord {
        GradeRecord {
            term: term.to_string(),
            credit: CreditRecord {
                term: term.to_string(),
                credits_attempted: 24,
                credits_earned: 24,
                grade_points: 3.5,
            },
            gradings: vec![GradingRecord {
                id: new_record_id(),
                course_id: "COMP6047".to_string(),
                assessment: "Mid Exam".to_string(),
                weight_pct: 30,
            }],
            scores: vec![ScoreRecord {
                id: new_record_id(),
                course_id: "COMP6047".to_string(),
                assessment: "Mid Exam".to_string(),
                score: 85.0,
            }],
        }
    }

    fn snapshot(
        sessions: Vec<SessionRecord>,
        exams: Vec<ExamRecord>,
        finances: Vec<FinanceRecord>,
        grade: GradeRecord,
    ) -> SyncSnapshot {
        let entries = merge_journal(&exams, &finances, &sessions).unwrap();
        SyncSnapshot {
            entries,
            sessions,
            exams,
            finances,
            grade,
            profile: Profile {
                name: "Avery Lee".to_string(),
                student_id: "2201734522".to_string(),
                major: "Computer Science".to_string(),
                degree: "Undergraduate".to_string(),
                birthday: "1999-05-17".to_string(),
            },
            summary: FinanceSummary {
                charge_cents: 12_500_000,
                payment_cents: 10_000_000,
            },
        }
    }

    #[tokio::test]
    async fn test_replace_persists_full_generation() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let snap = snapshot(
            vec![session("2024-03-10")],
            vec![exam("2024-03-10")],
            vec![finance("2024-03-12")],
            grade("1610"),
        );

        db.snapshot().replace(&snap).await.unwrap();

        let journal = db.journal();
        // One entry per source record: finance, exam, session.
        assert_eq!(journal.count_entries().await.unwrap(), 3);
        assert_eq!(journal.count_sessions().await.unwrap(), 1);
        assert_eq!(journal.count_exams().await.unwrap(), 1);
        assert_eq!(journal.count_finances().await.unwrap(), 1);

        let entries = journal.list_entries().await.unwrap();
        assert_eq!(entries.len(), 3);
        // Ordered by date key: the shared 2024-03-10 pair precedes the
        // finance-only 2024-03-12 entry.
        assert_eq!(entries[0].id, "2024-03-10");
        assert_eq!(entries[2].id, "2024-03-12");
        assert_eq!(entries[2].finances.len(), 1);

        let credit = db.grades().credit_for_term("1610").await.unwrap().unwrap();
        assert_eq!(credit.credits_earned, 24);

        let prefs = db.prefs();
        assert_eq!(prefs.read("name", "").await.unwrap(), "Avery Lee");
        assert_eq!(prefs.finance_summary().await.unwrap().charge_cents, 12_500_000);
    }

    #[tokio::test]
    async fn test_replace_twice_keeps_exactly_one_generation() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let first = snapshot(
            vec![session("2024-03-10"), session("2024-03-11")],
            vec![],
            vec![],
            grade("1610"),
        );
        db.snapshot().replace(&first).await.unwrap();

        let second = snapshot(vec![session("2024-05-01")], vec![], vec![], grade("1610"));
        db.snapshot().replace(&second).await.unwrap();

        let journal = db.journal();
        assert_eq!(journal.count_sessions().await.unwrap(), 1);
        assert_eq!(journal.count_entries().await.unwrap(), 1);

        let entries = journal.list_entries().await.unwrap();
        assert_eq!(entries[0].id, "2024-05-01");
    }

    #[tokio::test]
    async fn test_failed_replace_rolls_back_journal() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let good = snapshot(vec![session("2024-03-10")], vec![], vec![], grade("1610"));
        db.snapshot().replace(&good).await.unwrap();

        // Duplicate grading ids violate the primary key AFTER the journal
        // replace has already run inside the transaction.
        let mut bad = snapshot(vec![session("2024-06-01")], vec![], vec![], grade("1610"));
        let dup = GradingRecord {
            id: "dup".to_string(),
            course_id: "COMP6047".to_string(),
            assessment: "Final Exam".to_string(),
            weight_pct: 40,
        };
        bad.grade.gradings = vec![dup.clone(), dup];

        let err = db.snapshot().replace(&bad).await.unwrap_err();
        assert!(matches!(err, crate::error::DbError::UniqueViolation { .. }));

        // The pre-transaction generation is fully intact.
        let journal = db.journal();
        assert_eq!(journal.count_entries().await.unwrap(), 1);
        let entries = journal.list_entries().await.unwrap();
        assert_eq!(entries[0].id, "2024-03-10");
        assert_eq!(journal.count_sessions().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_empty_grade_batches_leave_previous_rows() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.snapshot()
            .replace(&snapshot(vec![], vec![], vec![], grade("1610")))
            .await
            .unwrap();
        assert_eq!(db.grades().gradings().await.unwrap().len(), 1);

        // A grade payload with empty sub-collections must not wipe them.
        let mut sparse = grade("1610");
        sparse.gradings = vec![];
        sparse.scores = vec![];
        db.snapshot()
            .replace(&snapshot(vec![], vec![], vec![], sparse))
            .await
            .unwrap();

        assert_eq!(db.grades().gradings().await.unwrap().len(), 1);
        assert_eq!(db.grades().scores().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_credit_row_is_upserted_per_term() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.snapshot()
            .replace(&snapshot(vec![], vec![], vec![], grade("1610")))
            .await
            .unwrap();

        let mut updated = grade("1610");
        updated.credit.grade_points = 3.8;
        db.snapshot()
            .replace(&snapshot(vec![], vec![], vec![], updated))
            .await
            .unwrap();

        let credit = db.grades().credit_for_term("1610").await.unwrap().unwrap();
        assert_eq!(credit.grade_points, 3.8);
    }

    #[tokio::test]
    async fn test_duplicate_date_entries_survive_persistence() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let snap = snapshot(
            vec![session("2024-03-10")],
            vec![exam("2024-03-10")],
            vec![finance("2024-03-10")],
            grade("1610"),
        );

        db.snapshot().replace(&snap).await.unwrap();

        let entries = db.journal().list_entries().await.unwrap();
        assert_eq!(entries.len(), 3);
        for entry in &entries {
            assert_eq!(entry.id, "2024-03-10");
            assert_eq!(entry.sessions.len(), 1);
            assert_eq!(entry.finances.len(), 1);
            assert_eq!(entry.exams.len(), 1);
        }
    }
}
