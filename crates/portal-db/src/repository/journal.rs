//! # Journal Repository
//!
//! Read access to the journal index for the offline display. Entries come
//! back date-ordered with their record back-references resolved from the
//! link tables.
//!
//! Several entries may share one date key — the merge keeps one entry per
//! contributing source record — so readers group by date and must tolerate
//! duplicates.

use std::collections::HashMap;

use sqlx::{Row, SqlitePool};

use crate::error::DbResult;
use portal_core::JournalEntry;

/// Repository for journal reads.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    pool: SqlitePool,
}

impl JournalRepository {
    /// Creates a new JournalRepository.
    pub fn new(pool: SqlitePool) -> Self {
        JournalRepository { pool }
    }

    /// Lists all journal entries ordered by date key.
    pub async fn list_entries(&self) -> DbResult<Vec<JournalEntry>> {
        let rows = sqlx::query(
            "SELECT entry_id, date_key FROM journal_entries ORDER BY date_key, entry_id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut entries = Vec::with_capacity(rows.len());
        let mut by_row_id: HashMap<i64, usize> = HashMap::with_capacity(rows.len());

        for row in rows {
            let row_id: i64 = row.get("entry_id");
            by_row_id.insert(row_id, entries.len());
            entries.push(JournalEntry::new(row.get::<String, _>("date_key")));
        }

        self.attach_links(
            &mut entries,
            &by_row_id,
            "SELECT entry_id, session_id AS record_id FROM journal_sessions ORDER BY rowid",
            |entry, id| entry.sessions.push(id),
        )
        .await?;
        self.attach_links(
            &mut entries,
            &by_row_id,
            "SELECT entry_id, finance_id AS record_id FROM journal_finances ORDER BY rowid",
            |entry, id| entry.finances.push(id),
        )
        .await?;
        self.attach_links(
            &mut entries,
            &by_row_id,
            "SELECT entry_id, exam_id AS record_id FROM journal_exams ORDER BY rowid",
            |entry, id| entry.exams.push(id),
        )
        .await?;

        Ok(entries)
    }

    async fn attach_links(
        &self,
        entries: &mut [JournalEntry],
        by_row_id: &HashMap<i64, usize>,
        query: &str,
        mut push: impl FnMut(&mut JournalEntry, String),
    ) -> DbResult<()> {
        let rows = sqlx::query(query).fetch_all(&self.pool).await?;

        for row in rows {
            let row_id: i64 = row.get("entry_id");
            if let Some(&index) = by_row_id.get(&row_id) {
                push(&mut entries[index], row.get("record_id"));
            }
        }

        Ok(())
    }

    /// Number of journal entries in the current generation.
    pub async fn count_entries(&self) -> DbResult<i64> {
        self.count("SELECT COUNT(*) FROM journal_entries").await
    }

    /// Number of session records in the current generation.
    pub async fn count_sessions(&self) -> DbResult<i64> {
        self.count("SELECT COUNT(*) FROM sessions").await
    }

    /// Number of exam records in the current generation.
    pub async fn count_exams(&self) -> DbResult<i64> {
        self.count("SELECT COUNT(*) FROM exams").await
    }

    /// Number of finance records in the current generation.
    pub async fn count_finances(&self) -> DbResult<i64> {
        self.count("SELECT COUNT(*) FROM finances").await
    }

    async fn count(&self, query: &str) -> DbResult<i64> {
        Ok(sqlx::query_scalar(query).fetch_one(&self.pool).await?)
    }
}
