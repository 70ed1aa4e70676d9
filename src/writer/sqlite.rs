use anyhow::{Context, Result};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::Path;
use tracing::debug;

use super::schema_gen::{generate_create_table, generate_insert, quote_ident};
use crate::parser::{RawTable, SqlValue};
use crate::schema::TableSchema;
use crate::sources::{
    ensure_registry, register, registered_sources, unregister, DataSource, REGISTRY_TABLE,
};
use crate::ui::Ui;

const BATCH_SIZE: usize = 1000;

/// A registry entry together with the state of its table
#[derive(Debug, Clone, PartialEq)]
pub struct TableStatus {
    pub source: DataSource,
    /// `None` when the registered table is missing
    pub rows: Option<u64>,
}

pub struct SqliteWriter {
    conn: Connection,
}

impl SqliteWriter {
    /// Open (or create) the target database. Existing tables are kept.
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database: {:?}", db_path))?;
        Self::from_connection(conn)
    }

    /// Wrap an already open connection
    pub fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -64000;",
        )
        .context("Failed to configure database")?;

        ensure_registry(&conn)?;

        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Check whether a table of this name exists
    pub fn table_exists(&self, name: &str) -> Result<bool> {
        table_exists(&self.conn, name)
    }

    /// Number of rows in a table
    pub fn row_count(&self, name: &str) -> Result<u64> {
        row_count(&self.conn, name)
    }

    /// Registered sources, ordered by table name
    pub fn registered(&self) -> Result<Vec<DataSource>> {
        registered_sources(&self.conn)
    }

    /// Every registered source with its current row count
    pub fn status(&self) -> Result<Vec<TableStatus>> {
        read_status(&self.conn)
    }

    /// Register the source, create its table and insert every row.
    /// With `replace`, an existing table of the same name is dropped first.
    /// Runs in a single transaction; nothing changes if any step fails.
    pub fn load_table(
        &mut self,
        source: &DataSource,
        schema: &TableSchema,
        table: &RawTable,
        replace: bool,
        ui: &mut impl Ui,
    ) -> Result<u64> {
        let create_sql = generate_create_table(schema);
        let insert_sql = generate_insert(schema);
        debug!("{}", create_sql);

        let tx = self.conn.transaction()?;

        if replace {
            tx.execute(&format!("DROP TABLE IF EXISTS {}", quote_ident(&schema.name)), [])
                .with_context(|| format!("Failed to drop table: {}", schema.name))?;
            unregister(&tx, &schema.name)?;
        }

        register(&tx, source)?;
        tx.execute(&create_sql, [])
            .with_context(|| format!("Failed to create table: {}", schema.name))?;

        let total = table.row_count() as u64;
        let mut count: u64 = 0;

        for batch in table.rows.chunks(BATCH_SIZE) {
            insert_batch(&tx, &insert_sql, schema, batch)
                .with_context(|| format!("Failed to insert rows into: {}", schema.name))?;
            count += batch.len() as u64;
            ui.set_progress(count, total, schema.name.as_str());
        }

        tx.commit()
            .with_context(|| format!("Failed to commit table: {}", schema.name))?;

        Ok(count)
    }

    /// Finalize the database
    pub fn finalize(self) -> Result<()> {
        self.conn.execute_batch("PRAGMA optimize;")?;
        Ok(())
    }
}

/// Open an existing database for inspection only. Nothing is created or
/// configured, so the file is left exactly as it was.
pub fn open_read_only(db_path: &Path) -> Result<Connection> {
    Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("Failed to open database: {:?}", db_path))
}

/// Check whether a table of this name exists. SQLite identifiers are
/// case-insensitive, so `Types` counts as `types`.
pub fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let found: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
            params![name],
            |row| row.get(0),
        )
        .optional()
        .with_context(|| format!("Failed to look up table: {}", name))?;
    Ok(found.is_some())
}

fn row_count(conn: &Connection, name: &str) -> Result<u64> {
    let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(name));
    let count: i64 = conn
        .query_row(&sql, [], |row| row.get(0))
        .with_context(|| format!("Failed to count rows in: {}", name))?;
    Ok(count as u64)
}

/// Registry entries with row counts. A database without a registry has none.
pub fn read_status(conn: &Connection) -> Result<Vec<TableStatus>> {
    if !table_exists(conn, REGISTRY_TABLE)? {
        return Ok(Vec::new());
    }

    registered_sources(conn)?
        .into_iter()
        .map(|source| -> Result<TableStatus> {
            let rows = if table_exists(conn, &source.name)? {
                Some(row_count(conn, &source.name)?)
            } else {
                None
            };
            Ok(TableStatus { source, rows })
        })
        .collect()
}

/// Insert a batch of rows into the database
fn insert_batch(
    tx: &rusqlite::Transaction,
    sql: &str,
    schema: &TableSchema,
    batch: &[Vec<Option<String>>],
) -> Result<()> {
    let mut stmt = tx.prepare_cached(sql)?;

    for row in batch {
        for (idx, col) in schema.columns.iter().enumerate() {
            let value = SqlValue::from_cell(row[idx].as_deref(), col.col_type);
            value.bind_to(idx + 1, &mut stmt)?;
        }
        stmt.raw_execute()?;
    }

    Ok(())
}
