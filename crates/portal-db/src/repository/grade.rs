//! # Grade Repository
//!
//! Read access to the grade tables. Writes happen inside the snapshot
//! transaction (see [`crate::repository::snapshot`]): sub-collections are
//! clean-inserted independently and the credit row is upserted.

use sqlx::{Row, SqlitePool};

use crate::error::DbResult;
use portal_core::{CreditRecord, GradingRecord, ScoreRecord};

/// Repository for grade reads.
#[derive(Debug, Clone)]
pub struct GradeRepository {
    pool: SqlitePool,
}

impl GradeRepository {
    /// Creates a new GradeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        GradeRepository { pool }
    }

    /// Returns the credit row for a term, if synced.
    pub async fn credit_for_term(&self, term: &str) -> DbResult<Option<CreditRecord>> {
        let row = sqlx::query(
            "SELECT term, credits_attempted, credits_earned, grade_points \
             FROM credits WHERE term = ?1",
        )
        .bind(term)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| CreditRecord {
            term: row.get("term"),
            credits_attempted: row.get("credits_attempted"),
            credits_earned: row.get("credits_earned"),
            grade_points: row.get("grade_points"),
        }))
    }

    /// Lists all grading weights for the synced term.
    pub async fn gradings(&self) -> DbResult<Vec<GradingRecord>> {
        let rows = sqlx::query(
            "SELECT id, course_id, assessment, weight_pct FROM gradings ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| GradingRecord {
                id: row.get("id"),
                course_id: row.get("course_id"),
                assessment: row.get("assessment"),
                weight_pct: row.get("weight_pct"),
            })
            .collect())
    }

    /// Lists all assessment scores for the synced term.
    pub async fn scores(&self) -> DbResult<Vec<ScoreRecord>> {
        let rows =
            sqlx::query("SELECT id, course_id, assessment, score FROM scores ORDER BY rowid")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|row| ScoreRecord {
                id: row.get("id"),
                course_id: row.get("course_id"),
                assessment: row.get("assessment"),
                score: row.get("score"),
            })
            .collect())
    }
}
