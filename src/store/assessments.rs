// Saved risk assessments, persisted in SQLite

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::models::risk::SavedAssessment;
use crate::utils::now_iso;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS assessments (
    id TEXT PRIMARY KEY,
    saved_at TEXT NOT NULL,
    body TEXT NOT NULL
)";

pub struct AssessmentStore {
    conn: Mutex<Connection>,
}

impl AssessmentStore {
    /// Open (or create) the database file
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open SQLite database: {}", path.display()))?;
        tracing::info!("Saving assessments to {}", path.display());
        Self::init(conn)
    }

    /// Database that lives only as long as the process
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory SQLite")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(SCHEMA, [])
            .context("Failed to create assessments table")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Persist an assessment body and return its record
    pub fn save(&self, assessment: Value) -> Result<SavedAssessment> {
        let record = SavedAssessment {
            assessment_id: new_assessment_id(),
            saved_at: now_iso(),
            assessment,
        };
        let body = serde_json::to_string(&record.assessment)
            .context("Failed to serialize assessment")?;

        self.lock()?
            .execute(
                "INSERT INTO assessments (id, saved_at, body) VALUES (?1, ?2, ?3)",
                params![record.assessment_id, record.saved_at, body],
            )
            .context("Failed to insert assessment")?;

        tracing::info!(assessment_id = %record.assessment_id, "Assessment saved");
        Ok(record)
    }

    pub fn get(&self, assessment_id: &str) -> Result<Option<SavedAssessment>> {
        let row: Option<(String, String)> = self
            .lock()?
            .query_row(
                "SELECT saved_at, body FROM assessments WHERE id = ?1",
                [assessment_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .context("Failed to load assessment")?;

        row.map(|(saved_at, body)| {
            let assessment = serde_json::from_str(&body)
                .with_context(|| format!("Stored assessment {} is not valid JSON", assessment_id))?;
            Ok(SavedAssessment {
                assessment_id: assessment_id.to_string(),
                saved_at,
                assessment,
            })
        })
        .transpose()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("assessment database lock poisoned"))
    }
}

/// `assessment_<YYYYmmddHHMMSS>_<8 hex chars>`
fn new_assessment_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "assessment_{}_{}",
        Local::now().format("%Y%m%d%H%M%S"),
        &suffix[..8]
    )
}
