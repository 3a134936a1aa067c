//! SQLite database store implementation.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result as SqlResult};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use super::models::*;
use crate::core::{Theme, ThemeStore};

/// Database error types.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Migration error: {0}")]
    Migration(String),
    #[error("Not found")]
    NotFound,
}

/// Thread-safe database store.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Create a new store with the given database path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init()?;
        Ok(store)
    }

    /// Initialize the database with migrations.
    fn init(&self) -> Result<(), DbError> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(include_str!("../../migrations/000001_init.up.sql"))
            .map_err(|e| DbError::Migration(format!("Migration 1 failed: {}", e)))?;
        Ok(())
    }

    // --- Accounts ---

    /// Add a new account and return its ID.
    pub fn add_account(&self, name: &str, plan: &str) -> Result<i64, DbError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO accounts (name, plan) VALUES (?1, ?2)",
            params![name, plan],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Get an account by ID.
    pub fn get_account(&self, id: i64) -> Result<Account, DbError> {
        let conn = self.conn.lock().unwrap();
        let account = conn.query_row(
            "SELECT id, name, plan FROM accounts WHERE id = ?1",
            params![id],
            |row| {
                Ok(Account {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    plan: row.get(2)?,
                })
            },
        )?;
        Ok(account)
    }

    // --- Monitors ---

    /// Add a new monitor and return its ID.
    pub fn add_monitor(&self, monitor: &mut Monitor) -> Result<i64, DbError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO monitors (account_id, app_name, slug, health_url, theme, alerts_enabled, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                monitor.account_id,
                monitor.app_name,
                monitor.slug,
                monitor.health_url,
                monitor.theme,
                monitor.alerts_enabled as i64,
                monitor.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ],
        )?;
        let id = conn.last_insert_rowid();
        monitor.id = id;
        Ok(id)
    }

    /// Get a monitor by its status page slug.
    pub fn get_monitor_by_slug(&self, slug: &str) -> Result<Monitor, DbError> {
        let conn = self.conn.lock().unwrap();
        let monitor = conn.query_row(
            "SELECT id, account_id, app_name, slug, health_url, theme, alerts_enabled, created_at
             FROM monitors WHERE slug = ?1",
            params![slug],
            row_to_monitor,
        )?;
        Ok(monitor)
    }

    /// Count monitors owned by an account. Gates the add-monitor action.
    pub fn monitor_count(&self, account_id: i64) -> Result<i64, DbError> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM monitors WHERE account_id = ?1",
            params![account_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Delete a monitor and its history.
    pub fn delete_monitor(&self, id: i64) -> Result<(), DbError> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM daily_uptime WHERE monitor_id = ?1", params![id])?;
        conn.execute("DELETE FROM monitor_status WHERE monitor_id = ?1", params![id])?;
        conn.execute("DELETE FROM monitors WHERE id = ?1", params![id])?;
        Ok(())
    }

    // --- Daily uptime history ---

    /// Upsert one day of uptime counts for a monitor.
    pub fn upsert_daily_uptime(&self, row: &DailyUptimeRow) -> Result<(), DbError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO daily_uptime (monitor_id, date, total_checks, successful_checks)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(monitor_id, date) DO UPDATE SET
             total_checks=excluded.total_checks, successful_checks=excluded.successful_checks",
            params![
                row.monitor_id,
                row.date.format("%Y-%m-%d").to_string(),
                row.total_checks,
                row.successful_checks,
            ],
        )?;
        Ok(())
    }

    /// Get daily uptime rows for a monitor on or after `since`, ascending.
    pub fn get_daily_uptime(
        &self,
        monitor_id: i64,
        since: NaiveDate,
    ) -> Result<Vec<DailyUptimeRow>, DbError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT monitor_id, date, total_checks, successful_checks FROM daily_uptime
             WHERE monitor_id = ?1 AND date >= ?2 ORDER BY date ASC",
        )?;

        let rows = stmt
            .query_map(
                params![monitor_id, since.format("%Y-%m-%d").to_string()],
                |row| {
                    let date_str: String = row.get(1)?;
                    Ok(DailyUptimeRow {
                        monitor_id: row.get(0)?,
                        date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
                            .unwrap_or_default(),
                        total_checks: row.get(2)?,
                        successful_checks: row.get(3)?,
                    })
                },
            )?
            .collect::<SqlResult<Vec<_>>>()?;

        Ok(rows)
    }

    // --- Live status ---

    /// Upsert the last live check result for a monitor.
    pub fn upsert_live_status(&self, status: &LiveStatus) -> Result<(), DbError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO monitor_status (monitor_id, status_code, checked_at, ssl_days_remaining)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(monitor_id) DO UPDATE SET
             status_code=excluded.status_code, checked_at=excluded.checked_at,
             ssl_days_remaining=excluded.ssl_days_remaining",
            params![
                status.monitor_id,
                status.status_code,
                status.checked_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                status.ssl_days_remaining,
            ],
        )?;
        Ok(())
    }

    /// Get the last live check result for a monitor, if any.
    pub fn get_live_status(&self, monitor_id: i64) -> Result<Option<LiveStatus>, DbError> {
        let conn = self.conn.lock().unwrap();
        let status = conn
            .query_row(
                "SELECT monitor_id, status_code, checked_at, ssl_days_remaining
                 FROM monitor_status WHERE monitor_id = ?1",
                params![monitor_id],
                |row| {
                    let checked_str: String = row.get(2)?;
                    Ok(LiveStatus {
                        monitor_id: row.get(0)?,
                        status_code: row.get(1)?,
                        checked_at: parse_db_time(&checked_str).unwrap_or_else(Utc::now),
                        ssl_days_remaining: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(status)
    }

    // --- Themes ---

    /// Get the owner-set default theme for a status page.
    pub fn get_owner_theme(&self, slug: &str) -> Result<Option<String>, DbError> {
        let conn = self.conn.lock().unwrap();
        let theme = conn
            .query_row(
                "SELECT theme FROM monitors WHERE slug = ?1",
                params![slug],
                |row| row.get(0),
            )
            .optional()?;
        Ok(theme)
    }

    /// Set the owner default theme for a status page.
    pub fn set_owner_theme(&self, slug: &str, theme: &str) -> Result<(), DbError> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            "UPDATE monitors SET theme = ?1 WHERE slug = ?2",
            params![theme, slug],
        )?;
        if updated == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }

    /// Get a viewer's local theme override for a status page.
    pub fn get_viewer_override(&self, viewer_id: &str, slug: &str) -> Result<Option<String>, DbError> {
        let conn = self.conn.lock().unwrap();
        let theme = conn
            .query_row(
                "SELECT theme FROM viewer_theme_overrides WHERE viewer_id = ?1 AND slug = ?2",
                params![viewer_id, slug],
                |row| row.get(0),
            )
            .optional()?;
        Ok(theme)
    }

    /// Set a viewer's local theme override for a status page.
    pub fn set_viewer_override(&self, viewer_id: &str, slug: &str, theme: &str) -> Result<(), DbError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO viewer_theme_overrides (viewer_id, slug, theme) VALUES (?1, ?2, ?3)
             ON CONFLICT(viewer_id, slug) DO UPDATE SET theme=excluded.theme",
            params![viewer_id, slug, theme],
        )?;
        Ok(())
    }

    /// Clear a viewer's local theme override for a status page.
    pub fn delete_viewer_override(&self, viewer_id: &str, slug: &str) -> Result<(), DbError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM viewer_theme_overrides WHERE viewer_id = ?1 AND slug = ?2",
            params![viewer_id, slug],
        )?;
        Ok(())
    }

    /// Set the owner default theme and clear the owner's own override in a
    /// single transaction, so a concurrent reader can never see the old
    /// override layered over the new default.
    pub fn set_owner_theme_and_clear_override(
        &self,
        viewer_id: &str,
        slug: &str,
        theme: &str,
    ) -> Result<(), DbError> {
        let conn = self.conn.lock().unwrap();
        let tx = conn.unchecked_transaction()?;

        let updated = tx.execute(
            "UPDATE monitors SET theme = ?1 WHERE slug = ?2",
            params![theme, slug],
        )?;
        if updated == 0 {
            return Err(DbError::NotFound);
        }
        tx.execute(
            "DELETE FROM viewer_theme_overrides WHERE viewer_id = ?1 AND slug = ?2",
            params![viewer_id, slug],
        )?;

        tx.commit()?;
        Ok(())
    }

    /// View this store through a specific viewer's eyes for theme reads
    /// and writes.
    pub fn themes_for<'a>(&'a self, viewer_id: &'a str) -> ScopedThemeStore<'a> {
        ScopedThemeStore {
            store: self,
            viewer_id,
        }
    }
}

/// A [`ThemeStore`] bound to one viewer identity, as the core contract
/// expects (viewer identity implicit to the store's scope).
pub struct ScopedThemeStore<'a> {
    store: &'a Store,
    viewer_id: &'a str,
}

impl ThemeStore for ScopedThemeStore<'_> {
    type Error = DbError;

    fn owner_default(&self, slug: &str) -> Result<Option<Theme>, DbError> {
        Ok(self
            .store
            .get_owner_theme(slug)?
            .and_then(|s| s.parse().ok()))
    }

    fn write_owner_default(&mut self, slug: &str, theme: Theme) -> Result<(), DbError> {
        self.store.set_owner_theme(slug, theme.as_str())
    }

    fn viewer_override(&self, slug: &str) -> Result<Option<Theme>, DbError> {
        Ok(self
            .store
            .get_viewer_override(self.viewer_id, slug)?
            .and_then(|s| s.parse().ok()))
    }

    fn write_viewer_override(&mut self, slug: &str, theme: Theme) -> Result<(), DbError> {
        self.store.set_viewer_override(self.viewer_id, slug, theme.as_str())
    }

    fn delete_viewer_override(&mut self, slug: &str) -> Result<(), DbError> {
        self.store.delete_viewer_override(self.viewer_id, slug)
    }

    fn write_owner_default_and_clear_override(
        &mut self,
        slug: &str,
        theme: Theme,
    ) -> Result<(), DbError> {
        self.store
            .set_owner_theme_and_clear_override(self.viewer_id, slug, theme.as_str())
    }
}

fn row_to_monitor(row: &rusqlite::Row<'_>) -> SqlResult<Monitor> {
    let created_str: String = row.get(7)?;
    Ok(Monitor {
        id: row.get(0)?,
        account_id: row.get(1)?,
        app_name: row.get(2)?,
        slug: row.get(3)?,
        health_url: row.get(4)?,
        theme: row.get(5)?,
        alerts_enabled: row.get::<_, i64>(6)? != 0,
        created_at: parse_db_time(&created_str).unwrap_or_else(Utc::now),
    })
}

/// Parse a datetime string from the database.
fn parse_db_time(s: &str) -> Option<DateTime<Utc>> {
    let formats = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%SZ"];

    for fmt in &formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(DateTime::from_naive_utc_and_offset(dt, Utc));
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{effective_theme, set_owner_default, set_viewer_override};
    use tempfile::NamedTempFile;

    fn test_store() -> (NamedTempFile, Store) {
        let tmp = NamedTempFile::new().unwrap();
        let store = Store::new(tmp.path()).unwrap();
        (tmp, store)
    }

    fn seed_monitor(store: &Store, plan: &str, slug: &str) -> Monitor {
        let account_id = store.add_account("ada", plan).unwrap();
        let mut monitor = Monitor {
            account_id,
            app_name: "My API".to_string(),
            slug: slug.to_string(),
            health_url: "https://api.example.com/health".to_string(),
            ..Default::default()
        };
        store.add_monitor(&mut monitor).unwrap();
        monitor
    }

    #[test]
    fn test_monitor_crud() {
        let (_tmp, store) = test_store();
        let monitor = seed_monitor(&store, "pro", "my-api");
        assert!(monitor.id > 0);

        let fetched = store.get_monitor_by_slug("my-api").unwrap();
        assert_eq!(fetched.app_name, "My API");
        assert_eq!(fetched.theme, "cyberpunk");
        assert_eq!(store.monitor_count(monitor.account_id).unwrap(), 1);

        store.delete_monitor(monitor.id).unwrap();
        assert!(store.get_monitor_by_slug("my-api").is_err());
        assert_eq!(store.monitor_count(monitor.account_id).unwrap(), 0);
    }

    #[test]
    fn test_daily_uptime_rows() {
        let (_tmp, store) = test_store();
        let monitor = seed_monitor(&store, "free", "my-api");

        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        store
            .upsert_daily_uptime(&DailyUptimeRow {
                monitor_id: monitor.id,
                date,
                total_checks: 100,
                successful_checks: 97,
            })
            .unwrap();

        // Upsert replaces the day's counts
        store
            .upsert_daily_uptime(&DailyUptimeRow {
                monitor_id: monitor.id,
                date,
                total_checks: 120,
                successful_checks: 118,
            })
            .unwrap();

        let rows = store
            .get_daily_uptime(monitor.id, chrono::NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].total_checks, 120);

        // Rows before the cutoff are excluded
        let rows = store
            .get_daily_uptime(monitor.id, chrono::NaiveDate::from_ymd_opt(2024, 3, 11).unwrap())
            .unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_live_status_upsert() {
        let (_tmp, store) = test_store();
        let monitor = seed_monitor(&store, "free", "my-api");

        assert!(store.get_live_status(monitor.id).unwrap().is_none());

        store
            .upsert_live_status(&LiveStatus {
                monitor_id: monitor.id,
                status_code: 200,
                checked_at: Utc::now(),
                ssl_days_remaining: Some(42),
            })
            .unwrap();

        let status = store.get_live_status(monitor.id).unwrap().unwrap();
        assert_eq!(status.status_code, 200);
        assert_eq!(status.ssl_days_remaining, Some(42));
    }

    #[test]
    fn test_scoped_theme_store() {
        let (_tmp, store) = test_store();
        seed_monitor(&store, "pro", "my-api");

        let mut owner = store.themes_for("owner");
        set_viewer_override(&mut owner, "my-api", Theme::Retro).unwrap();
        assert_eq!(effective_theme(&owner, "my-api").unwrap(), Theme::Retro);

        // Owner publishes a new default; their own override is cleared...
        set_owner_default(&mut owner, "my-api", Theme::Minimal).unwrap();
        assert_eq!(effective_theme(&owner, "my-api").unwrap(), Theme::Minimal);

        // ...but another viewer's override is untouched.
        let mut visitor = store.themes_for("visitor");
        set_viewer_override(&mut visitor, "my-api", Theme::Matrix).unwrap();
        set_owner_default(&mut store.themes_for("owner"), "my-api", Theme::Cyberpunk).unwrap();
        assert_eq!(
            effective_theme(&store.themes_for("visitor"), "my-api").unwrap(),
            Theme::Matrix
        );
    }

    #[test]
    fn test_owner_theme_unknown_slug() {
        let (_tmp, store) = test_store();
        assert!(matches!(
            store.set_owner_theme("ghost", "matrix"),
            Err(DbError::NotFound)
        ));
        assert_eq!(store.get_owner_theme("ghost").unwrap(), None);
    }
}
