//! Embryology updates: per-day lab observations and a markdown summary.

use std::path::PathBuf;

use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::StoreError;

/// Handle to the embryology database file.
#[derive(Clone, Debug)]
pub struct EmbryologyDb {
    path: PathBuf,
}

/// One lab update for a patient's cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbryologyUpdate {
    pub id: i64,
    pub patient_id: String,
    /// 0 = OPU, then 1..6.
    pub day: i64,
    pub date_utc: Option<i64>,
    /// fertilization / cleavage / blastocyst / transfer.
    pub stage: Option<String>,
    /// Total embryos observed.
    pub total: Option<i64>,
    /// Number meeting the grade threshold.
    pub good: Option<i64>,
    /// Short free text like "4BB, 3BA".
    pub grades: Option<String>,
    pub notes: Option<String>,
    /// Per-embryo detail blob.
    pub details: Value,
    pub ts: i64,
}

/// Input for recording an update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEmbryologyUpdate {
    pub patient_id: String,
    pub day: i64,
    #[serde(default)]
    pub date_utc: Option<i64>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub total: Option<i64>,
    #[serde(default)]
    pub good: Option<i64>,
    #[serde(default)]
    pub grades: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub details: Option<Value>,
}

impl EmbryologyDb {
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
            "CREATE TABLE IF NOT EXISTS updates(
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                patient_id TEXT NOT NULL,
                day INTEGER NOT NULL,
                date_utc INTEGER,
                stage TEXT,
                total INTEGER,
                good INTEGER,
                grades TEXT,
                notes TEXT,
                details_json TEXT,
                ts INTEGER DEFAULT (strftime('%s','now'))
            )",
            [],
        )?;
        Ok(conn)
    }

    /// Records one update and returns its id.
    pub fn add_update(&self, upd: &NewEmbryologyUpdate) -> Result<i64, StoreError> {
        let details_json = serde_json::to_string(upd.details.as_ref().unwrap_or(&Value::Null))?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO updates
             (patient_id, day, date_utc, stage, total, good, grades, notes, details_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                upd.patient_id,
                upd.day,
                upd.date_utc,
                upd.stage,
                upd.total,
                upd.good,
                upd.grades,
                upd.notes,
                details_json
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// All updates for a patient, in cycle order (day ASC, then insertion).
    pub fn list_updates(
        &self,
        patient_id: &str,
        limit: usize,
    ) -> Result<Vec<EmbryologyUpdate>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM updates WHERE patient_id=?1 ORDER BY day ASC, ts ASC, id ASC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![patient_id, limit as i64], update_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// The most recent update by cycle day.
    pub fn latest_update(
        &self,
        patient_id: &str,
    ) -> Result<Option<EmbryologyUpdate>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM updates WHERE patient_id=?1 ORDER BY day DESC, ts DESC, id DESC LIMIT 1",
        )?;
        Ok(stmt.query_row(params![patient_id], update_row).optional()?)
    }
}

fn update_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EmbryologyUpdate> {
    let details_json: Option<String> = row.get("details_json")?;
    let details = details_json
        .as_deref()
        .and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or(Value::Null);
    Ok(EmbryologyUpdate {
        id: row.get("id")?,
        patient_id: row.get("patient_id")?,
        day: row.get("day")?,
        date_utc: row.get("date_utc")?,
        stage: row.get("stage")?,
        total: row.get("total")?,
        good: row.get("good")?,
        grades: row.get("grades")?,
        notes: row.get("notes")?,
        details,
        ts: row.get("ts")?,
    })
}

/// Renders a patient's updates as the markdown card shown in chat.
///
/// Deterministic plain rendering; no model involved.
pub fn render_updates_markdown(patient_id: &str, updates: &[EmbryologyUpdate]) -> String {
    if updates.is_empty() {
        return format!(
            "No embryology updates on file for **{patient_id}** yet. \
             A staff member can add these for you."
        );
    }

    let mut out = format!("**Embryology updates for {patient_id}**\n");
    for u in updates {
        let stage = u.stage.as_deref().unwrap_or("update");
        out.push_str(&format!("\n- **Day {}** ({stage})", u.day));
        if let (Some(good), Some(total)) = (u.good, u.total) {
            out.push_str(&format!(": {good}/{total} embryos meeting criteria"));
        } else if let Some(total) = u.total {
            out.push_str(&format!(": {total} embryos observed"));
        }
        if let Some(grades) = u.grades.as_deref() {
            if !grades.is_empty() {
                out.push_str(&format!(" — grades {grades}"));
            }
        }
        if let Some(notes) = u.notes.as_deref() {
            if !notes.is_empty() {
                out.push_str(&format!(" ({notes})"));
            }
        }
    }
    out.push_str("\n\n_If anything looks unclear, the care team can walk you through it._");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn db() -> (tempfile::TempDir, EmbryologyDb) {
        let dir = tempfile::tempdir().unwrap();
        let db = EmbryologyDb::new(dir.path().join("embryology.db"));
        (dir, db)
    }

    fn upd(day: i64, stage: &str, good: i64, total: i64) -> NewEmbryologyUpdate {
        NewEmbryologyUpdate {
            patient_id: "p01".into(),
            day,
            date_utc: Some(1_700_000_000 + day * 86_400),
            stage: Some(stage.into()),
            total: Some(total),
            good: Some(good),
            grades: Some("4BB, 3BA".into()),
            notes: None,
            details: Some(json!({"embryos": [{"grade": "4BB"}]})),
        }
    }

    #[test]
    fn list_is_day_ordered_and_latest_is_max_day() {
        let (_dir, db) = db();
        db.add_update(&upd(3, "cleavage", 5, 8)).unwrap();
        db.add_update(&upd(0, "OPU", 0, 10)).unwrap();
        db.add_update(&upd(5, "blastocyst", 3, 5)).unwrap();

        let all = db.list_updates("p01", 50).unwrap();
        assert_eq!(all.iter().map(|u| u.day).collect::<Vec<_>>(), vec![0, 3, 5]);

        let latest = db.latest_update("p01").unwrap().unwrap();
        assert_eq!(latest.day, 5);
        assert_eq!(latest.details["embryos"][0]["grade"], "4BB");
    }

    #[test]
    fn markdown_summary_shapes() {
        let (_dir, db) = db();
        assert!(render_updates_markdown("p01", &[]).contains("No embryology updates"));

        db.add_update(&upd(5, "blastocyst", 3, 5)).unwrap();
        let all = db.list_updates("p01", 50).unwrap();
        let md = render_updates_markdown("p01", &all);
        assert!(md.contains("**Day 5** (blastocyst)"));
        assert!(md.contains("3/5 embryos"));
        assert!(md.contains("grades 4BB, 3BA"));
    }
}
