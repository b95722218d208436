//! Registry of processed manifests per patient.
//!
//! The document pipeline writes a manifest per run; this registry remembers
//! where they live so chat can pick up the latest one automatically.

use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::errors::StoreError;

/// Handle to the registry database file.
#[derive(Clone, Debug)]
pub struct ManifestRegistry {
    path: PathBuf,
}

impl ManifestRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn conn(&self) -> Result<Connection, StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(&self.path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS manifests(
                patient_id TEXT,
                manifest_path TEXT,
                ts INTEGER
            )",
            [],
        )?;
        Ok(conn)
    }

    /// Registers a manifest for a patient. The timestamp prefers the file's
    /// mtime so re-registration keeps runs in produced order; a missing
    /// file falls back to now.
    pub fn register(&self, patient_id: &str, manifest_path: &str) -> Result<(), StoreError> {
        let ts = file_mtime_epoch(Path::new(manifest_path))
            .unwrap_or_else(|| Utc::now().timestamp());
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO manifests (patient_id, manifest_path, ts) VALUES (?1, ?2, ?3)",
            params![patient_id, manifest_path, ts],
        )?;
        debug!(patient_id, manifest_path, ts, "manifest registered");
        Ok(())
    }

    /// Path of the most recently produced manifest, if any.
    pub fn latest(&self, patient_id: &str) -> Result<Option<String>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT manifest_path FROM manifests
             WHERE patient_id=?1 ORDER BY ts DESC, rowid DESC LIMIT 1",
        )?;
        Ok(stmt
            .query_row(params![patient_id], |row| row.get(0))
            .optional()?)
    }

    /// Recent manifests, newest first, as `(path, ts)` pairs.
    pub fn list(
        &self,
        patient_id: &str,
        limit: usize,
    ) -> Result<Vec<(String, i64)>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT manifest_path, ts FROM manifests
             WHERE patient_id=?1 ORDER BY ts DESC, rowid DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![patient_id, limit as i64], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

fn file_mtime_epoch(path: &Path) -> Option<i64> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    let secs = modified.duration_since(UNIX_EPOCH).ok()?.as_secs();
    i64::try_from(secs).ok()
}
