//! # Preference Repository
//!
//! Scalar key/value storage for credentials, the session cookie, profile
//! fields, and the finance summary.
//!
//! ## Storage Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Preference Storage                                 │
//! │                                                                         │
//! │  read(key, default)  ──► stored value, or the default when absent      │
//! │  write(key, value)   ──► upsert, one row per key                       │
//! │                                                                         │
//! │  Preference writes are PER-KEY and NON-TRANSACTIONAL: profile and      │
//! │  finance-summary fields are overwritten field by field, never as an    │
//! │  atomic unit. Snapshot atomicity covers store entities only.           │
//! │                                                                         │
//! │  The cookie is written in exactly one place: after a sign-in whose     │
//! │  response carried a Set-Cookie header.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use portal_core::{Credentials, FinanceSummary, Profile};

/// Preference keys.
pub mod keys {
    pub const COOKIE: &str = "cookie";
    pub const USERNAME: &str = "username";
    pub const PASSWORD: &str = "password";
    pub const MAJOR: &str = "major";
    pub const DEGREE: &str = "degree";
    pub const BIRTHDAY: &str = "birthday";
    pub const NAME: &str = "name";
    pub const STUDENT_ID: &str = "student_id";
    pub const FINANCE_CHARGE: &str = "finance_charge";
    pub const FINANCE_PAYMENT: &str = "finance_payment";
}

/// Repository for scalar preference storage.
#[derive(Debug, Clone)]
pub struct PreferenceRepository {
    pool: SqlitePool,
}

impl PreferenceRepository {
    /// Creates a new PreferenceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PreferenceRepository { pool }
    }

    /// Reads a preference value, falling back to `default` when absent.
    pub async fn read(&self, key: &str, default: &str) -> DbResult<String> {
        let row = sqlx::query("SELECT value FROM preferences WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row
            .map(|r| r.get::<String, _>("value"))
            .unwrap_or_else(|| default.to_string()))
    }

    /// Writes a preference value, replacing any prior value for the key.
    pub async fn write(&self, key: &str, value: &str) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO preferences (key, value) VALUES (?1, ?2) \
             ON CONFLICT (key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // =========================================================================
    // Typed Helpers
    // =========================================================================

    /// Reads the stored credentials.
    ///
    /// Read fresh at the start of every flow so a cookie refreshed by a
    /// concurrent flow is picked up.
    pub async fn credentials(&self) -> DbResult<Credentials> {
        Ok(Credentials {
            username: self.read(keys::USERNAME, "").await?,
            password: self.read(keys::PASSWORD, "").await?,
            cookie: self.read(keys::COOKIE, "").await?,
        })
    }

    /// Reads the current session cookie.
    pub async fn cookie(&self) -> DbResult<String> {
        self.read(keys::COOKIE, "").await
    }

    /// Replaces the session cookie.
    ///
    /// The sole cookie write path: called only after a successful sign-in
    /// whose response carried a Set-Cookie header.
    pub async fn set_cookie(&self, cookie: &str) -> DbResult<()> {
        debug!("Refreshing session cookie");
        self.write(keys::COOKIE, cookie).await
    }

    /// Stores credentials (used by the driver on first run).
    pub async fn set_credentials(&self, username: &str, password: &str) -> DbResult<()> {
        self.write(keys::USERNAME, username).await?;
        self.write(keys::PASSWORD, password).await?;
        Ok(())
    }

    /// Writes profile scalars field by field.
    pub async fn save_profile(&self, profile: &Profile) -> DbResult<()> {
        self.write(keys::MAJOR, &profile.major).await?;
        self.write(keys::DEGREE, &profile.degree).await?;
        self.write(keys::BIRTHDAY, &profile.birthday).await?;
        self.write(keys::NAME, &profile.name).await?;
        self.write(keys::STUDENT_ID, &profile.student_id).await?;
        Ok(())
    }

    /// Writes finance-summary scalars field by field.
    pub async fn save_finance_summary(&self, summary: &FinanceSummary) -> DbResult<()> {
        self.write(keys::FINANCE_CHARGE, &summary.charge_cents.to_string())
            .await?;
        self.write(keys::FINANCE_PAYMENT, &summary.payment_cents.to_string())
            .await?;
        Ok(())
    }

    /// Reads the stored finance summary, defaulting to zero totals.
    pub async fn finance_summary(&self) -> DbResult<FinanceSummary> {
        let charge = self.read(keys::FINANCE_CHARGE, "0").await?;
        let payment = self.read(keys::FINANCE_PAYMENT, "0").await?;

        Ok(FinanceSummary {
            charge_cents: charge.parse().unwrap_or(0),
            payment_cents: payment.parse().unwrap_or(0),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_read_returns_default_when_absent() {
        let prefs = test_db().await.prefs();
        assert_eq!(prefs.read("missing", "fallback").await.unwrap(), "fallback");
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let prefs = test_db().await.prefs();
        prefs.write(keys::MAJOR, "Computer Science").await.unwrap();
        assert_eq!(
            prefs.read(keys::MAJOR, "").await.unwrap(),
            "Computer Science"
        );
    }

    #[tokio::test]
    async fn test_write_replaces_prior_value() {
        let prefs = test_db().await.prefs();
        prefs.set_cookie("PHPSESSID=old").await.unwrap();
        prefs.set_cookie("PHPSESSID=new").await.unwrap();
        assert_eq!(prefs.cookie().await.unwrap(), "PHPSESSID=new");
    }

    #[tokio::test]
    async fn test_credentials_round_trip() {
        let prefs = test_db().await.prefs();
        prefs.set_credentials("2201734522", "hunter2").await.unwrap();

        let creds = prefs.credentials().await.unwrap();
        assert_eq!(creds.username, "2201734522");
        assert_eq!(creds.password, "hunter2");
        assert_eq!(creds.cookie, "");
    }

    #[tokio::test]
    async fn test_finance_summary_round_trip() {
        let prefs = test_db().await.prefs();
        let summary = FinanceSummary {
            charge_cents: 12_500_000,
            payment_cents: 10_000_000,
        };
        prefs.save_finance_summary(&summary).await.unwrap();
        assert_eq!(prefs.finance_summary().await.unwrap(), summary);
    }

    #[tokio::test]
    async fn test_finance_summary_defaults_to_zero() {
        let prefs = test_db().await.prefs();
        let summary = prefs.finance_summary().await.unwrap();
        assert_eq!(summary.charge_cents, 0);
        assert_eq!(summary.payment_cents, 0);
    }
}
