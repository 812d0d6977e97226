/// Database connection and schema utilities
///
/// Opens the local SQLite file that holds saved stations, sensors and
/// measurements, and makes sure the three tables exist. There is no
/// migration machinery: the schema is created once and never altered.

use rusqlite::Connection;
use std::path::Path;
use tracing::info;

use crate::error::StoreError;

const SCHEMA_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS stations (
        id          INTEGER PRIMARY KEY,
        stationName TEXT,
        city        TEXT,
        longitude   REAL,
        latitude    REAL
    );

    CREATE TABLE IF NOT EXISTS sensors (
        id        INTEGER PRIMARY KEY,
        stationId INTEGER REFERENCES stations(id),
        paramName TEXT
    );

    CREATE TABLE IF NOT EXISTS measurements (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        sensorId        INTEGER REFERENCES sensors(id),
        stationId       INTEGER REFERENCES stations(id),
        paramName       TEXT,
        stationName     TEXT,
        value           REAL,
        date            TEXT,
        historicalValue REAL,
        historicalDate  TEXT,
        UNIQUE(sensorId, date)
    );
    CREATE INDEX IF NOT EXISTS idx_measurements_sensor
        ON measurements(sensorId);
"#;

/// Open (or create) the database file at `path` and ensure the schema.
///
/// Parent directories are created as needed.
pub fn open(path: &Path) -> Result<Connection, StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::CreateDirectory {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }

    info!("Opening database at {}", path.display());
    let conn = Connection::open(path)?;
    prepare(&conn)?;
    Ok(conn)
}

/// Open a throwaway in-memory database with the full schema.
pub fn open_in_memory() -> Result<Connection, StoreError> {
    let conn = Connection::open_in_memory()?;
    prepare(&conn)?;
    Ok(conn)
}

fn prepare(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    create_schema(conn)
}

/// Create any missing tables. Safe to call on every start.
pub fn create_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
