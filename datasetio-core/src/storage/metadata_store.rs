use crate::error::{DatasetError, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// One dataset document. The (owner, project, name) triple is the identity;
/// `content_path` points at the backing file relative to the storage root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub owner: String,
    pub project: String,
    pub name: String,
    pub content_path: String,
    pub size_bytes: u64,
    pub sha256: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub owner: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Document store for dataset and project records, backed by SQLite.
/// Records are persisted as JSON documents in `inline_data`; the identity
/// fields are mirrored into indexed columns, with a unique index over
/// (owner, project, name) so racing inserts cannot both land.
pub struct MetadataStore {
    db_path: PathBuf,
}

struct DatasetRow {
    owner: String,
    project: String,
    name: String,
    content_path: String,
    inline_data: Vec<u8>,
}

impl MetadataStore {
    pub fn open(db_path: PathBuf) -> Result<Self> {
        let store = Self { db_path };
        store.init_schema()?;
        Ok(store)
    }

    fn get_conn(&self) -> Result<Connection> {
        let conn = Connection::open(&self.db_path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(conn)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.get_conn()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS projects (
                pk INTEGER PRIMARY KEY AUTOINCREMENT,
                owner TEXT NOT NULL,
                name TEXT NOT NULL,
                inline_data BLOB NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE(owner, name)
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS datasets (
                pk INTEGER PRIMARY KEY AUTOINCREMENT,
                owner TEXT NOT NULL,
                project TEXT NOT NULL,
                name TEXT NOT NULL,
                content_path TEXT NOT NULL,
                inline_data BLOB NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE(owner, project, name)
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_datasets_scope
             ON datasets(owner, project)",
            [],
        )?;

        Ok(())
    }

    /// Liveness probe. Failures are reported as `StoreUnavailable`, distinct
    /// from not-found conditions.
    pub fn ping(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)
            .map_err(|error| DatasetError::StoreUnavailable(error.to_string()))?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(|error| DatasetError::StoreUnavailable(error.to_string()))?;
        Ok(())
    }

    /// Returns false when a project with the same (owner, name) already exists.
    pub fn insert_project(&self, record: &ProjectRecord) -> Result<bool> {
        let conn = self.get_conn()?;
        let inline_data = serde_json::to_vec(record)?;

        let affected = conn.execute(
            "INSERT INTO projects (owner, name, inline_data, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(owner, name) DO NOTHING",
            params![
                record.owner,
                record.name,
                inline_data,
                record.created_at.to_rfc3339(),
            ],
        )?;

        Ok(affected > 0)
    }

    pub fn find_project(&self, owner: &str, name: &str) -> Result<Option<ProjectRecord>> {
        let conn = self.get_conn()?;

        let inline_data: Option<Vec<u8>> = conn
            .query_row(
                "SELECT inline_data FROM projects WHERE owner = ?1 AND name = ?2",
                params![owner, name],
                |row| row.get(0),
            )
            .optional()?;

        match inline_data {
            Some(data) => {
                let mut record: ProjectRecord = serde_json::from_slice(&data)?;
                record.owner = owner.to_string();
                record.name = name.to_string();
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Inserts one dataset record. Returns false when the unique index over
    /// (owner, project, name) rejects the insert, i.e. a record for the same
    /// triple already landed.
    pub fn insert_dataset(&self, record: &DatasetRecord) -> Result<bool> {
        let conn = self.get_conn()?;
        let inline_data = serde_json::to_vec(record)?;

        let result = conn.execute(
            "INSERT INTO datasets (
                owner,
                project,
                name,
                content_path,
                inline_data,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.owner,
                record.project,
                record.name,
                record.content_path,
                inline_data,
                record.created_at.to_rfc3339(),
                record.updated_at.to_rfc3339(),
            ],
        );

        match result {
            Ok(_) => Ok(true),
            Err(rusqlite::Error::SqliteFailure(error, _))
                if error.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Ok(false)
            }
            Err(error) => Err(error.into()),
        }
    }

    pub fn find_dataset(
        &self,
        owner: &str,
        project: &str,
        name: &str,
    ) -> Result<Option<DatasetRecord>> {
        let conn = self.get_conn()?;

        let row: Option<DatasetRow> = conn
            .query_row(
                "SELECT owner, project, name, content_path, inline_data
                 FROM datasets
                 WHERE owner = ?1 AND project = ?2 AND name = ?3",
                params![owner, project, name],
                Self::dataset_row,
            )
            .optional()?;

        match row {
            Some(row) => Ok(Some(Self::decode_dataset_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn list_datasets(&self, owner: &str, project: &str) -> Result<Vec<DatasetRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT owner, project, name, content_path, inline_data
             FROM datasets
             WHERE owner = ?1 AND project = ?2
             ORDER BY name ASC",
        )?;

        let mut rows = stmt.query(params![owner, project])?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            let row = Self::dataset_row(row)?;
            records.push(Self::decode_dataset_row(row)?);
        }

        Ok(records)
    }

    pub fn list_all_datasets(&self) -> Result<Vec<DatasetRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT owner, project, name, content_path, inline_data
             FROM datasets
             ORDER BY owner ASC, project ASC, name ASC",
        )?;

        let mut rows = stmt.query([])?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            let row = Self::dataset_row(row)?;
            records.push(Self::decode_dataset_row(row)?);
        }

        Ok(records)
    }

    /// Replaces the mutable fields of the record keyed by the original
    /// (owner, project, name) triple. Returns the record as written, or None
    /// when no record matched the triple.
    pub fn update_dataset(
        &self,
        owner: &str,
        project: &str,
        name: &str,
        updated: &DatasetRecord,
    ) -> Result<Option<DatasetRecord>> {
        let conn = self.get_conn()?;
        let inline_data = serde_json::to_vec(updated)?;

        let affected = conn.execute(
            "UPDATE datasets
             SET name = ?4,
                 content_path = ?5,
                 inline_data = ?6,
                 updated_at = ?7
             WHERE owner = ?1 AND project = ?2 AND name = ?3",
            params![
                owner,
                project,
                name,
                updated.name,
                updated.content_path,
                inline_data,
                updated.updated_at.to_rfc3339(),
            ],
        )?;

        if affected == 0 {
            return Ok(None);
        }

        Ok(Some(updated.clone()))
    }

    /// Atomic find-and-remove: one DELETE .. RETURNING statement, so no
    /// record can be observed between the lookup and the removal.
    pub fn delete_dataset(
        &self,
        owner: &str,
        project: &str,
        name: &str,
    ) -> Result<Option<DatasetRecord>> {
        let conn = self.get_conn()?;

        let row: Option<DatasetRow> = conn
            .query_row(
                "DELETE FROM datasets
                 WHERE owner = ?1 AND project = ?2 AND name = ?3
                 RETURNING owner, project, name, content_path, inline_data",
                params![owner, project, name],
                Self::dataset_row,
            )
            .optional()?;

        match row {
            Some(row) => Ok(Some(Self::decode_dataset_row(row)?)),
            None => Ok(None),
        }
    }

    fn dataset_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DatasetRow> {
        Ok(DatasetRow {
            owner: row.get(0)?,
            project: row.get(1)?,
            name: row.get(2)?,
            content_path: row.get(3)?,
            inline_data: row.get(4)?,
        })
    }

    fn decode_dataset_row(row: DatasetRow) -> Result<DatasetRecord> {
        let mut record: DatasetRecord = serde_json::from_slice(&row.inline_data)?;
        record.owner = row.owner;
        record.project = row.project;
        record.name = row.name;
        record.content_path = row.content_path;
        Ok(record)
    }
}
