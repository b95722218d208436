//! Clinic operations database: appointments and treatment plans.

use std::path::PathBuf;

use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::StoreError;

/// Handle to the clinic database file. Cloneable; connections are opened
/// per call.
#[derive(Clone, Debug)]
pub struct ClinicDb {
    path: PathBuf,
}

/// A scheduled visit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub patient_id: String,
    /// Visit time, epoch seconds UTC.
    pub appt_time: i64,
    pub tz: String,
    pub appt_type: Option<String>,
    pub clinician: Option<String>,
    pub notes: Option<String>,
    /// `scheduled | completed | cancelled | pending`.
    pub status: String,
    pub ts: i64,
}

/// Input for creating an appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAppointment {
    pub patient_id: String,
    pub appt_time: i64,
    #[serde(default = "default_tz")]
    pub tz: String,
    #[serde(default)]
    pub appt_type: Option<String>,
    #[serde(default)]
    pub clinician: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
}

fn default_tz() -> String {
    "UTC".to_string()
}

fn default_status() -> String {
    "scheduled".to_string()
}

/// A treatment plan row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Treatment {
    pub id: i64,
    pub patient_id: String,
    /// e.g. "IVF antagonist", "IUI", "FET".
    pub regimen: Option<String>,
    /// Meds or protocol name.
    pub protocol: Option<String>,
    pub start_ts: Option<i64>,
    pub end_ts: Option<i64>,
    /// `ongoing | paused | completed`.
    pub status: String,
    pub notes: Option<String>,
    pub ts: i64,
}

/// Input for adding a treatment plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTreatment {
    pub patient_id: String,
    #[serde(default)]
    pub regimen: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub start_ts: Option<i64>,
    #[serde(default)]
    pub end_ts: Option<i64>,
    #[serde(default = "default_treatment_status")]
    pub status: String,
    #[serde(default)]
    pub notes: Option<String>,
}

fn default_treatment_status() -> String {
    "ongoing".to_string()
}

impl ClinicDb {
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
        migrate(&conn)?;
        Ok(conn)
    }

    // -------- Appointments --------

    /// Inserts an appointment and returns its id.
    pub fn create_appointment(&self, appt: &NewAppointment) -> Result<i64, StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO appointments
             (patient_id, appt_time, tz, appt_type, clinician, notes, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                appt.patient_id,
                appt.appt_time,
                appt.tz,
                appt.appt_type,
                appt.clinician,
                appt.notes,
                appt.status
            ],
        )?;
        let id = conn.last_insert_rowid();
        debug!(patient_id = %appt.patient_id, id, "appointment created");
        Ok(id)
    }

    /// Lists a patient's appointments, optionally bounded in time,
    /// soonest first.
    pub fn list_appointments(
        &self,
        patient_id: &str,
        from_utc: Option<i64>,
        to_utc: Option<i64>,
        limit: usize,
    ) -> Result<Vec<Appointment>, StoreError> {
        let conn = self.conn()?;
        let mut sql = String::from("SELECT * FROM appointments WHERE patient_id=?1");
        if from_utc.is_some() {
            sql.push_str(" AND appt_time>=?2");
        }
        if to_utc.is_some() {
            sql.push_str(if from_utc.is_some() {
                " AND appt_time<=?3"
            } else {
                " AND appt_time<=?2"
            });
        }
        sql.push_str(" ORDER BY appt_time ASC LIMIT ");
        sql.push_str(&limit.to_string());

        let mut stmt = conn.prepare(&sql)?;
        let rows = match (from_utc, to_utc) {
            (Some(f), Some(t)) => stmt.query_map(params![patient_id, f, t], appointment_row)?,
            (Some(f), None) => stmt.query_map(params![patient_id, f], appointment_row)?,
            (None, Some(t)) => stmt.query_map(params![patient_id, t], appointment_row)?,
            (None, None) => stmt.query_map(params![patient_id], appointment_row)?,
        };
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Next upcoming scheduled appointment at or after `now_utc`.
    pub fn next_appointment(
        &self,
        patient_id: &str,
        now_utc: i64,
    ) -> Result<Option<Appointment>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM appointments
             WHERE patient_id=?1 AND appt_time>=?2 AND status='scheduled'
             ORDER BY appt_time ASC LIMIT 1",
        )?;
        Ok(stmt
            .query_row(params![patient_id, now_utc], appointment_row)
            .optional()?)
    }

    /// Updates an appointment's status. Returns whether a row changed.
    pub fn set_appointment_status(&self, id: i64, status: &str) -> Result<bool, StoreError> {
        let conn = self.conn()?;
        let n = conn.execute(
            "UPDATE appointments SET status=?1 WHERE id=?2",
            params![status, id],
        )?;
        Ok(n > 0)
    }

    // -------- Treatments --------

    /// Inserts a treatment plan and returns its id.
    pub fn add_treatment(&self, tx: &NewTreatment) -> Result<i64, StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO treatments
             (patient_id, regimen, protocol, start_ts, end_ts, status, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                tx.patient_id,
                tx.regimen,
                tx.protocol,
                tx.start_ts,
                tx.end_ts,
                tx.status,
                tx.notes
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// The patient's most recently recorded treatment plan.
    pub fn current_treatment(&self, patient_id: &str) -> Result<Option<Treatment>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM treatments WHERE patient_id=?1 ORDER BY ts DESC, id DESC LIMIT 1",
        )?;
        Ok(stmt.query_row(params![patient_id], treatment_row).optional()?)
    }
}

fn migrate(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS appointments(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            patient_id TEXT NOT NULL,
            appt_time INTEGER NOT NULL,
            tz TEXT DEFAULT 'UTC',
            appt_type TEXT,
            clinician TEXT,
            notes TEXT,
            status TEXT DEFAULT 'scheduled',
            ts INTEGER DEFAULT (strftime('%s','now'))
        );
        CREATE TABLE IF NOT EXISTS treatments(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            patient_id TEXT NOT NULL,
            regimen TEXT,
            protocol TEXT,
            start_ts INTEGER,
            end_ts INTEGER,
            status TEXT DEFAULT 'ongoing',
            notes TEXT,
            ts INTEGER DEFAULT (strftime('%s','now'))
        );",
    )?;
    Ok(())
}

fn appointment_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Appointment> {
    Ok(Appointment {
        id: row.get("id")?,
        patient_id: row.get("patient_id")?,
        appt_time: row.get("appt_time")?,
        tz: row.get("tz")?,
        appt_type: row.get("appt_type")?,
        clinician: row.get("clinician")?,
        notes: row.get("notes")?,
        status: row.get("status")?,
        ts: row.get("ts")?,
    })
}

fn treatment_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Treatment> {
    Ok(Treatment {
        id: row.get("id")?,
        patient_id: row.get("patient_id")?,
        regimen: row.get("regimen")?,
        protocol: row.get("protocol")?,
        start_ts: row.get("start_ts")?,
        end_ts: row.get("end_ts")?,
        status: row.get("status")?,
        notes: row.get("notes")?,
        ts: row.get("ts")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> (tempfile::TempDir, ClinicDb) {
        let dir = tempfile::tempdir().unwrap();
        let db = ClinicDb::new(dir.path().join("clinic.db"));
        (dir, db)
    }

    fn appt(patient: &str, time: i64, status: &str) -> NewAppointment {
        NewAppointment {
            patient_id: patient.into(),
            appt_time: time,
            tz: "UTC".into(),
            appt_type: Some("scan".into()),
            clinician: Some("Dr. Rao".into()),
            notes: None,
            status: status.into(),
        }
    }

    #[test]
    fn next_appointment_skips_past_and_cancelled() {
        let (_dir, db) = db();
        db.create_appointment(&appt("p01", 1_000, "scheduled")).unwrap();
        db.create_appointment(&appt("p01", 5_000, "cancelled")).unwrap();
        db.create_appointment(&appt("p01", 9_000, "scheduled")).unwrap();
        db.create_appointment(&appt("p02", 6_000, "scheduled")).unwrap();

        let next = db.next_appointment("p01", 2_000).unwrap().unwrap();
        assert_eq!(next.appt_time, 9_000);
        assert_eq!(next.clinician.as_deref(), Some("Dr. Rao"));
    }

    #[test]
    fn list_respects_time_bounds() {
        let (_dir, db) = db();
        for t in [100, 200, 300] {
            db.create_appointment(&appt("p01", t, "scheduled")).unwrap();
        }
        let all = db.list_appointments("p01", None, None, 20).unwrap();
        assert_eq!(all.len(), 3);

        let mid = db.list_appointments("p01", Some(150), Some(250), 20).unwrap();
        assert_eq!(mid.len(), 1);
        assert_eq!(mid[0].appt_time, 200);
    }

    #[test]
    fn status_update() {
        let (_dir, db) = db();
        let id = db.create_appointment(&appt("p01", 100, "scheduled")).unwrap();
        assert!(db.set_appointment_status(id, "completed").unwrap());
        assert!(!db.set_appointment_status(id + 99, "completed").unwrap());
    }

    #[test]
    fn current_treatment_is_latest() {
        let (_dir, db) = db();
        db.add_treatment(&NewTreatment {
            patient_id: "p01".into(),
            regimen: Some("IUI".into()),
            protocol: None,
            start_ts: Some(1),
            end_ts: None,
            status: "completed".into(),
            notes: None,
        })
        .unwrap();
        db.add_treatment(&NewTreatment {
            patient_id: "p01".into(),
            regimen: Some("IVF antagonist".into()),
            protocol: Some("Gonal-F 225".into()),
            start_ts: Some(2),
            end_ts: None,
            status: "ongoing".into(),
            notes: None,
        })
        .unwrap();

        let cur = db.current_treatment("p01").unwrap().unwrap();
        assert_eq!(cur.regimen.as_deref(), Some("IVF antagonist"));
        assert!(db.current_treatment("p02").unwrap().is_none());
    }
}
