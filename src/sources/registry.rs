//! Persisted record of which datasets were loaded and from where

use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use super::catalog::DataSource;

/// Name of the registry table inside the target database
pub const REGISTRY_TABLE: &str = "data_sources";

const CREATE_REGISTRY: &str = "CREATE TABLE IF NOT EXISTS data_sources (
    table_name VARCHAR PRIMARY KEY NOT NULL,
    url VARCHAR NOT NULL
)";

/// Create the registry table if it is missing
pub fn ensure_registry(conn: &Connection) -> Result<()> {
    conn.execute(CREATE_REGISTRY, [])
        .context("Failed to create source registry")?;
    Ok(())
}

/// Record a source. A name that is already registered keeps its first URL.
pub fn register(conn: &Connection, source: &DataSource) -> Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO data_sources (table_name, url) VALUES (?1, ?2)",
        params![source.name, source.url],
    )
    .with_context(|| format!("Failed to register source: {}", source.name))?;
    Ok(())
}

/// Remove a source from the registry
pub fn unregister(conn: &Connection, name: &str) -> Result<()> {
    conn.execute(
        "DELETE FROM data_sources WHERE table_name = ?1",
        params![name],
    )
    .with_context(|| format!("Failed to unregister source: {}", name))?;
    Ok(())
}

/// All registered sources, ordered by table name
pub fn registered_sources(conn: &Connection) -> Result<Vec<DataSource>> {
    let mut stmt =
        conn.prepare("SELECT table_name, url FROM data_sources ORDER BY table_name")?;
    let rows = stmt
        .query_map([], |row| Ok(DataSource::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("Failed to read source registry")?;
    Ok(rows)
}
