//! SQLite-backed Store implementation

use std::fs;
use std::path::{Path, PathBuf};

use eyre::{Context, Result, eyre};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OptionalExtension, Transaction, params, params_from_iter};
use tracing::{debug, info};

use crate::record::{Filter, IndexValue, Record};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS records (
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    data TEXT NOT NULL,
    updated_at INTEGER NOT NULL,
    PRIMARY KEY (collection, id)
);
CREATE TABLE IF NOT EXISTS record_indexes (
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    field TEXT NOT NULL,
    val,
    PRIMARY KEY (collection, id, field)
);
CREATE INDEX IF NOT EXISTS idx_record_indexes_field ON record_indexes (collection, field, val);
"#;

/// Persistent record store
pub struct Store {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Store {
    /// Open or create a store in the given directory
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).context(format!("Failed to create store directory {}", dir.display()))?;
        let db_path = dir.join(crate::DB_FILE);
        debug!(?db_path, "Store::open: called");

        let conn = Connection::open(&db_path).context(format!("Failed to open database {}", db_path.display()))?;
        conn.execute_batch(SCHEMA).context("Failed to initialize schema")?;

        info!(path = %db_path.display(), "Opened trip store");
        Ok(Self {
            conn,
            path: Some(db_path),
        })
    }

    /// Open a throwaway in-memory store
    pub fn open_in_memory() -> Result<Self> {
        debug!("Store::open_in_memory: called");
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA).context("Failed to initialize schema")?;
        Ok(Self { conn, path: None })
    }

    /// Path to the backing database file (None when in-memory)
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Insert a new record, failing if the id already exists
    pub fn create<T: Record>(&mut self, record: T) -> Result<String> {
        let collection = T::collection_name();
        let id = record.id().to_string();
        debug!(%collection, %id, "Store::create: called");

        let data = serde_json::to_string(&record)?;
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO records (collection, id, data, updated_at) VALUES (?1, ?2, ?3, ?4)",
            params![collection, id, data, record.updated_at()],
        )
        .context(format!("Failed to insert {}/{}", collection, id))?;
        write_indexes(&tx, collection, &id, &record)?;
        tx.commit()?;

        Ok(id)
    }

    /// Fetch a record by id
    pub fn get<T: Record>(&self, id: &str) -> Result<Option<T>> {
        let collection = T::collection_name();
        debug!(%collection, %id, "Store::get: called");

        let data: Option<String> = self
            .conn
            .query_row(
                "SELECT data FROM records WHERE collection = ?1 AND id = ?2",
                params![collection, id],
                |row| row.get(0),
            )
            .optional()?;

        match data {
            Some(data) => {
                let record = serde_json::from_str(&data).context(format!("Corrupt record {}/{}", collection, id))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Replace an existing record, failing if it does not exist
    pub fn update<T: Record>(&mut self, record: T) -> Result<()> {
        let collection = T::collection_name();
        let id = record.id().to_string();
        debug!(%collection, %id, "Store::update: called");

        let data = serde_json::to_string(&record)?;
        let tx = self.conn.transaction()?;
        let changed = tx.execute(
            "UPDATE records SET data = ?3, updated_at = ?4 WHERE collection = ?1 AND id = ?2",
            params![collection, id, data, record.updated_at()],
        )?;
        if changed == 0 {
            return Err(eyre!("Record not found: {}/{}", collection, id));
        }
        write_indexes(&tx, collection, &id, &record)?;
        tx.commit()?;

        Ok(())
    }

    /// Delete a record and its indexes
    pub fn delete<T: Record>(&mut self, id: &str) -> Result<()> {
        let collection = T::collection_name();
        debug!(%collection, %id, "Store::delete: called");

        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM record_indexes WHERE collection = ?1 AND id = ?2",
            params![collection, id],
        )?;
        tx.execute(
            "DELETE FROM records WHERE collection = ?1 AND id = ?2",
            params![collection, id],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// List records matching every filter, most recently updated first
    pub fn list<T: Record>(&self, filters: &[Filter]) -> Result<Vec<T>> {
        let collection = T::collection_name();
        debug!(%collection, filter_count = filters.len(), "Store::list: called");

        let mut sql = String::from("SELECT data FROM records WHERE collection = ?");
        let mut values: Vec<SqlValue> = vec![SqlValue::Text(collection.to_string())];

        for filter in filters {
            sql.push_str(&format!(
                " AND id IN (SELECT id FROM record_indexes WHERE collection = ? AND field = ? AND val {} ?)",
                filter.op.as_sql()
            ));
            values.push(SqlValue::Text(collection.to_string()));
            values.push(SqlValue::Text(filter.field.clone()));
            values.push(to_sql_value(&filter.value));
        }
        sql.push_str(" ORDER BY updated_at DESC, id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values), |row| row.get::<_, String>(0))?;

        let mut records = Vec::new();
        for row in rows {
            let data = row?;
            records.push(serde_json::from_str(&data).context(format!("Corrupt record in {}", collection))?);
        }
        Ok(records)
    }

    /// Rewrite the index rows for every record of a type
    pub fn rebuild_indexes<T: Record>(&mut self) -> Result<usize> {
        let collection = T::collection_name();
        debug!(%collection, "Store::rebuild_indexes: called");

        let records: Vec<T> = self.list(&[])?;
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM record_indexes WHERE collection = ?1",
            params![collection],
        )?;
        for record in &records {
            write_indexes(&tx, collection, record.id(), record)?;
        }
        tx.commit()?;

        Ok(records.len())
    }
}

fn to_sql_value(value: &IndexValue) -> SqlValue {
    match value {
        IndexValue::String(s) => SqlValue::Text(s.clone()),
        IndexValue::Int(i) => SqlValue::Integer(*i),
        IndexValue::Bool(b) => SqlValue::Integer(i64::from(*b)),
    }
}

fn write_indexes<T: Record>(tx: &Transaction<'_>, collection: &str, id: &str, record: &T) -> Result<()> {
    tx.execute(
        "DELETE FROM record_indexes WHERE collection = ?1 AND id = ?2",
        params![collection, id],
    )?;
    for (field, value) in record.indexed_fields() {
        tx.execute(
            "INSERT INTO record_indexes (collection, id, field, val) VALUES (?1, ?2, ?3, ?4)",
            params![collection, id, field, to_sql_value(&value)],
        )?;
    }
    Ok(())
}
