//! # Term Repository
//!
//! Academic term persistence. Terms are upserted in fetched order, never
//! bulk-deleted: the portal's term list only ever grows, and position 0 is
//! the current term that gates exam/grade requests.

use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use portal_core::Term;

/// Repository for academic terms.
#[derive(Debug, Clone)]
pub struct TermRepository {
    pool: SqlitePool,
}

impl TermRepository {
    /// Creates a new TermRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TermRepository { pool }
    }

    /// Upserts a fetched term sequence, preserving its order.
    pub async fn upsert_terms(&self, terms: &[Term]) -> DbResult<()> {
        debug!(count = terms.len(), "Upserting terms");

        let mut tx = self.pool.begin().await?;

        for term in terms {
            sqlx::query(
                "INSERT INTO terms (value, label, position) VALUES (?1, ?2, ?3) \
                 ON CONFLICT (value) DO UPDATE \
                 SET label = excluded.label, position = excluded.position",
            )
            .bind(&term.value)
            .bind(&term.label)
            .bind(term.position)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Lists all terms in portal order (current first).
    pub async fn list(&self) -> DbResult<Vec<Term>> {
        let rows = sqlx::query("SELECT value, label, position FROM terms ORDER BY position")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| Term {
                value: row.get("value"),
                label: row.get("label"),
                position: row.get("position"),
            })
            .collect())
    }

    /// Returns the current term, if any terms have been synced.
    pub async fn current(&self) -> DbResult<Option<Term>> {
        let row =
            sqlx::query("SELECT value, label, position FROM terms ORDER BY position LIMIT 1")
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|row| Term {
            value: row.get("value"),
            label: row.get("label"),
            position: row.get("position"),
        }))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn term(value: &str, position: i64) -> Term {
        Term {
            value: value.to_string(),
            label: format!("Term {value}"),
            position,
        }
    }

    #[tokio::test]
    async fn test_upsert_and_list_preserves_order() {
        let terms = Database::new(DbConfig::in_memory()).await.unwrap().terms();

        terms
            .upsert_terms(&[term("1610", 0), term("1520", 1), term("1510", 2)])
            .await
            .unwrap();

        let listed = terms.list().await.unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].value, "1610");
        assert_eq!(listed[2].value, "1510");
    }

    #[tokio::test]
    async fn test_upsert_twice_does_not_duplicate() {
        let terms = Database::new(DbConfig::in_memory()).await.unwrap().terms();

        terms.upsert_terms(&[term("1610", 0)]).await.unwrap();
        terms.upsert_terms(&[term("1610", 0)]).await.unwrap();

        assert_eq!(terms.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_current_is_position_zero() {
        let terms = Database::new(DbConfig::in_memory()).await.unwrap().terms();

        assert!(terms.current().await.unwrap().is_none());

        terms
            .upsert_terms(&[term("1610", 0), term("1520", 1)])
            .await
            .unwrap();

        let current = terms.current().await.unwrap().unwrap();
        assert_eq!(current.value, "1610");
        assert!(current.is_current());
    }
}
