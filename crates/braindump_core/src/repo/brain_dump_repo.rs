//! Brain dump repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert/get/list/patch primitives over `brain_dumps` storage.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `BrainDump::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - `complete_analysis` writes all analysis fields and `processed` in one
//!   statement.
//! - Listing order is creation order, newest first.
//! - Unprocessed IDs come back in creation order, oldest first.

use crate::db::DbError;
use crate::model::brain_dump::{
    Analysis, BrainDump, BrainDumpId, BrainDumpValidationError, UserId,
};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

const BRAIN_DUMP_SELECT_SQL: &str = "SELECT
    uuid,
    user_id,
    original_text,
    summary,
    what_matters,
    what_doesnt,
    actionable_focus,
    processed,
    created_at
FROM brain_dumps";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for brain dump persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(BrainDumpValidationError),
    Db(DbError),
    NotFound(BrainDumpId),
    InvalidData(String),
    /// Connection lock was poisoned by a panicking holder.
    Poisoned,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "brain dump not found: {id}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted brain dump data: {message}")
            }
            Self::Poisoned => write!(f, "database connection lock poisoned"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) | Self::Poisoned => None,
        }
    }
}

impl From<BrainDumpValidationError> for RepoError {
    fn from(value: BrainDumpValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for brain dump storage.
///
/// Implementations are shared between request callers and background
/// workers, so they must be thread-safe.
pub trait BrainDumpRepository: Send + Sync {
    /// Persists a new record and returns its ID.
    fn insert(&self, record: &BrainDump) -> RepoResult<BrainDumpId>;
    /// Loads one record regardless of owner.
    fn get(&self, id: BrainDumpId) -> RepoResult<Option<BrainDump>>;
    /// Lists records owned by `owner`, newest first, at most `limit` items.
    fn list_recent_by_owner(&self, owner: &UserId, limit: u32) -> RepoResult<Vec<BrainDump>>;
    /// Writes analysis fields and marks the record processed.
    fn complete_analysis(&self, id: BrainDumpId, analysis: &Analysis) -> RepoResult<()>;
    /// Lists IDs of records still awaiting analysis, oldest first.
    fn list_unprocessed_ids(&self) -> RepoResult<Vec<BrainDumpId>>;
}

/// SQLite-backed brain dump repository.
pub struct SqliteBrainDumpRepository {
    conn: Mutex<Connection>,
}

impl SqliteBrainDumpRepository {
    /// Wraps a connection that already has migrations applied.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| RepoError::Poisoned)
    }
}

impl BrainDumpRepository for SqliteBrainDumpRepository {
    fn insert(&self, record: &BrainDump) -> RepoResult<BrainDumpId> {
        record.validate()?;

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO brain_dumps (
                uuid,
                user_id,
                original_text,
                summary,
                what_matters,
                what_doesnt,
                actionable_focus,
                processed
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                record.id.to_string(),
                record.user_id.as_str(),
                record.original_text.as_str(),
                record.analysis.summary.as_str(),
                encode_points(&record.analysis.what_matters)?,
                encode_points(&record.analysis.what_doesnt)?,
                record.analysis.actionable_focus.as_str(),
                bool_to_int(record.processed),
            ],
        )?;

        Ok(record.id)
    }

    fn get(&self, id: BrainDumpId) -> RepoResult<Option<BrainDump>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("{BRAIN_DUMP_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_brain_dump_row(row)?));
        }

        Ok(None)
    }

    fn list_recent_by_owner(&self, owner: &UserId, limit: u32) -> RepoResult<Vec<BrainDump>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "{BRAIN_DUMP_SELECT_SQL}
             WHERE user_id = ?1
             ORDER BY seq DESC
             LIMIT ?2;"
        ))?;

        let mut rows = stmt.query(params![owner.as_str(), i64::from(limit)])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_brain_dump_row(row)?);
        }

        Ok(records)
    }

    fn complete_analysis(&self, id: BrainDumpId, analysis: &Analysis) -> RepoResult<()> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE brain_dumps
             SET
                summary = ?1,
                what_matters = ?2,
                what_doesnt = ?3,
                actionable_focus = ?4,
                processed = 1,
                updated_at = (CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER))
             WHERE uuid = ?5;",
            params![
                analysis.summary.as_str(),
                encode_points(&analysis.what_matters)?,
                encode_points(&analysis.what_doesnt)?,
                analysis.actionable_focus.as_str(),
                id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn list_unprocessed_ids(&self) -> RepoResult<Vec<BrainDumpId>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT uuid
             FROM brain_dumps
             WHERE processed = 0
             ORDER BY seq ASC;",
        )?;

        let mut rows = stmt.query([])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get(0)?;
            ids.push(parse_uuid(&uuid_text)?);
        }

        Ok(ids)
    }
}

fn parse_uuid(uuid_text: &str) -> RepoResult<BrainDumpId> {
    Uuid::parse_str(uuid_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid uuid value `{uuid_text}` in brain_dumps.uuid"
        ))
    })
}

fn parse_brain_dump_row(row: &Row<'_>) -> RepoResult<BrainDump> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text)?;

    let processed = match row.get::<_, i64>("processed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid processed value `{other}` in brain_dumps.processed"
            )));
        }
    };

    let what_matters: String = row.get("what_matters")?;
    let what_doesnt: String = row.get("what_doesnt")?;

    let record = BrainDump {
        id,
        user_id: UserId::new(row.get::<_, String>("user_id")?),
        original_text: row.get("original_text")?,
        analysis: Analysis {
            summary: row.get("summary")?,
            what_matters: decode_points(&what_matters, "what_matters")?,
            what_doesnt: decode_points(&what_doesnt, "what_doesnt")?,
            actionable_focus: row.get("actionable_focus")?,
        },
        processed,
        created_at: row.get("created_at")?,
    };
    record.validate()?;
    Ok(record)
}

fn encode_points(points: &[String]) -> RepoResult<String> {
    serde_json::to_string(points)
        .map_err(|err| RepoError::InvalidData(format!("failed to encode points: {err}")))
}

fn decode_points(value: &str, column: &str) -> RepoResult<Vec<String>> {
    serde_json::from_str(value).map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid string array in brain_dumps.{column}: {err}"
        ))
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
