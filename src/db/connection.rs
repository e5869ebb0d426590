use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::Connection;

use super::error::StoreError;

/// Open the SQLite file at `path` (creating its directory when needed) and run
/// the schema bootstrap once. This is the only place the schema gets created;
/// CRUD helpers assume it already exists.
pub fn open_store(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("failed to create data directory")?;
        }
    }

    let conn = Connection::open(path)
        .with_context(|| format!("failed to open SQLite database at {}", path.display()))?;
    ensure_schema(&conn).context("failed to initialize person table")?;
    info!("person store ready at {}", path.display());

    Ok(conn)
}

/// Create the `person` table if it does not exist yet. Safe to call any
/// number of times: existing rows are never touched.
pub fn ensure_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS person (
            idperson INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
            lastname VARCHAR(45) NOT NULL,
            firstname VARCHAR(45) NOT NULL,
            nickname VARCHAR(45) NOT NULL,
            phone_number VARCHAR(15) NULL,
            address VARCHAR(200) NULL,
            email_address VARCHAR(150) NULL,
            birth_date DATE NULL
        )",
        [],
    )?;
    debug!("person schema ensured");

    Ok(())
}
