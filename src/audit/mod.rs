//! Audit log: SQLite-based operation history.
//!
//! Stores a record of every mutating vault operation (add-vault, new-site,
//! update-record, delete-site, ...) in a local SQLite database named
//! `.gpam.audit.db`, next to the vault file.
//!
//! Designed for graceful degradation: if the database can't be opened or
//! written to, operations silently continue without logging.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::errors::{GpamError, Result};

/// File name of the audit database.
pub const DB_FILE_NAME: &str = ".gpam.audit.db";

/// A single audit log entry.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub operation: String,
    pub vault: Option<String>,
    pub site: Option<String>,
    pub details: Option<String>,
}

/// SQLite-backed audit log.
pub struct AuditLog {
    conn: Connection,
}

impl AuditLog {
    /// Open (or create) the audit database inside `dir`.
    ///
    /// Returns `None` if the database can't be opened; callers should
    /// treat this as "audit logging unavailable" and continue normally.
    pub fn open(dir: &Path) -> Option<Self> {
        let db_path = Self::db_path(dir);
        let conn = Connection::open(&db_path).ok()?;

        // Owner-only, like the vault file it describes.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&db_path, perms);
        }

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS audit_log (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp   TEXT NOT NULL,
                operation   TEXT NOT NULL,
                vault       TEXT,
                site        TEXT,
                details     TEXT
            );",
        )
        .ok()?;

        Some(Self { conn })
    }

    /// Record an operation. Fire-and-forget: failures are logged at warn level and otherwise ignored.
    pub fn log(
        &self,
        operation: &str,
        vault: Option<&str>,
        site: Option<&str>,
        details: Option<&str>,
    ) {
        let now = Utc::now().to_rfc3339();
        if let Err(e) = self.conn.execute(
            "INSERT INTO audit_log (timestamp, operation, vault, site, details)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![now, operation, vault, site, details],
        ) {
            tracing::warn!(error = %e, operation, "audit entry not written");
        }
    }

    /// Query recent audit entries.
    ///
    /// - `limit`: maximum number of entries to return (most recent first).
    /// - `since`: if provided, only return entries newer than this timestamp.
    pub fn query(&self, limit: usize, since: Option<DateTime<Utc>>) -> Result<Vec<AuditEntry>> {
        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        let since = since.map(|ts| ts.to_rfc3339());

        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, timestamp, operation, vault, site, details
                 FROM audit_log
                 WHERE ?1 IS NULL OR timestamp >= ?1
                 ORDER BY id DESC
                 LIMIT ?2",
            )
            .map_err(|e| GpamError::AuditError(format!("query prepare: {e}")))?;

        let rows = stmt
            .query_map(rusqlite::params![since, limit_i64], |row| {
                let ts_str: String = row.get(1)?;
                let timestamp = DateTime::parse_from_rfc3339(&ts_str)
                    .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));

                Ok(AuditEntry {
                    id: row.get(0)?,
                    timestamp,
                    operation: row.get(2)?,
                    vault: row.get(3)?,
                    site: row.get(4)?,
                    details: row.get(5)?,
                })
            })
            .map_err(|e| GpamError::AuditError(format!("query exec: {e}")))?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(|e| GpamError::AuditError(format!("row parse: {e}")))?);
        }

        Ok(entries)
    }

    /// Path of the audit database inside `dir`.
    pub fn db_path(dir: &Path) -> PathBuf {
        dir.join(DB_FILE_NAME)
    }

    /// Directory holding the audit database for a given vault file.
    pub fn dir_for(vault_file: &Path) -> PathBuf {
        match vault_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

/// Convenience helper: log an audit event for the vault file at `vault_file`.
///
/// Opens the audit database, logs the event, and silently ignores any errors.
/// This is safe to call from any command; it never fails the parent operation.
pub fn log_audit(
    vault_file: &Path,
    op: &str,
    vault: Option<&str>,
    site: Option<&str>,
    details: Option<&str>,
) {
    if let Some(audit) = AuditLog::open(&AuditLog::dir_for(vault_file)) {
        audit.log(op, vault, site, details);
    }
}
