//! Local persistence for stations, sensors and measurements.
//!
//! Write semantics differ per table:
//! - stations and sensors are reference data: first writer wins
//!   (`INSERT OR IGNORE`), later writes with different fields are ignored;
//! - measurements are keyed on `(sensorId, date)`: last writer wins
//!   (`INSERT OR REPLACE`), every non-key column is overwritten.
//!
//! Every statement binds its parameters; nothing is formatted into SQL.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use tracing::{debug, info};

use crate::db;
use crate::error::StoreError;
use crate::model::{MeasurementRecord, SeriesEntry, Sensor, Station, Timestamp};

pub type Result<T> = std::result::Result<T, StoreError>;

/// Snapshot of every table, for diagnostics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StoreDump {
    pub stations: Vec<Station>,
    pub sensors: Vec<Sensor>,
    pub measurements: Vec<MeasurementRecord>,
}

/// SQLite-backed store. Owns its single connection.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            conn: db::open(path.as_ref())?,
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: db::open_in_memory()?,
        })
    }

    // === Writes ===

    /// Insert a station unless one with the same id is already stored.
    ///
    /// Returns `true` when a row was written.
    pub fn upsert_station(&self, station: &Station) -> Result<bool> {
        write_station(&self.conn, station)
    }

    /// Insert a sensor unless one with the same id is already stored.
    pub fn upsert_sensor(&self, sensor: &Sensor) -> Result<bool> {
        write_sensor(&self.conn, sensor)
    }

    /// Insert or replace the measurement for `(sensor_id, entry.timestamp)`.
    ///
    /// Station name and parameter name are copied from `station` and
    /// `sensor` at write time.
    pub fn upsert_measurement(
        &self,
        sensor_id: i64,
        entry: &SeriesEntry,
        station: &Station,
        sensor: &Sensor,
    ) -> Result<()> {
        write_measurement(&self.conn, sensor_id, entry, station, sensor)
    }

    /// Write a selected station, sensor and reading as one unit.
    ///
    /// Station and sensor keep their first-writer-wins semantics. If any of
    /// the three writes fails, none of them is kept.
    pub fn save_selection(&mut self, station: &Station, sensor: &Sensor, entry: &SeriesEntry) -> Result<()> {
        let tx = self.conn.transaction()?;
        write_station(&tx, station)?;
        write_sensor(&tx, sensor)?;
        write_measurement(&tx, sensor.id, entry, station, sensor)?;
        tx.commit()?;
        Ok(())
    }

    /// Delete every row: measurements, then sensors, then stations.
    pub fn clear_all(&mut self) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM measurements", [])?;
        tx.execute("DELETE FROM sensors", [])?;
        tx.execute("DELETE FROM stations", [])?;
        tx.commit()?;
        info!("All data has been cleared from the database");
        Ok(())
    }

    // === Reads ===

    /// Stored stations, ordered by id.
    pub fn list_stations(&self) -> Result<Vec<Station>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, stationName, city, longitude, latitude FROM stations ORDER BY id",
        )?;
        let stations = stmt
            .query_map([], station_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(stations)
    }

    /// Stored sensors belonging to `station_id`, ordered by id.
    pub fn list_sensors(&self, station_id: i64) -> Result<Vec<Sensor>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, stationId, paramName FROM sensors WHERE stationId = ?1 ORDER BY id",
        )?;
        let sensors = stmt
            .query_map([station_id], sensor_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(sensors)
    }

    /// Every measurement row for `sensor_id`, in insertion order.
    pub fn measurement_rows(&self, sensor_id: i64) -> Result<Vec<MeasurementRecord>> {
        debug!("Reading measurement rows for sensor {}", sensor_id);
        let mut stmt = self.conn.prepare(
            "SELECT sensorId, stationId, paramName, stationName, value, date,
                    historicalValue, historicalDate
             FROM measurements WHERE sensorId = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map([sensor_id], measurement_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// `(param_name, station_name)` for a stored sensor, if both rows exist.
    pub fn sensor_info(&self, sensor_id: i64) -> Result<Option<(String, String)>> {
        let info = self
            .conn
            .query_row(
                "SELECT sensors.paramName, stations.stationName
                 FROM sensors JOIN stations ON sensors.stationId = stations.id
                 WHERE sensors.id = ?1",
                [sensor_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        Ok(info)
    }

    /// Distinct current and historical timestamps stored for a sensor,
    /// ascending. Used to offer a date range to pick from.
    pub fn available_dates(&self, sensor_id: i64) -> Result<Vec<Timestamp>> {
        let mut stmt = self.conn.prepare(
            "SELECT date FROM measurements WHERE sensorId = ?1 AND date IS NOT NULL
             UNION
             SELECT historicalDate FROM measurements WHERE sensorId = ?1 AND historicalDate IS NOT NULL
             ORDER BY 1",
        )?;
        let dates = stmt
            .query_map([sensor_id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(dates)
    }

    /// Read-only listing of all three tables. Each row is also logged.
    pub fn dump(&self) -> Result<StoreDump> {
        info!("Inspecting database contents...");

        let stations = self.list_stations()?;
        info!("Contents of stations table:");
        for station in &stations {
            info!("{:?}", station);
        }

        let mut stmt = self
            .conn
            .prepare("SELECT id, stationId, paramName FROM sensors ORDER BY id")?;
        let sensors = stmt
            .query_map([], sensor_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        info!("Contents of sensors table:");
        for sensor in &sensors {
            info!("{:?}", sensor);
        }

        let mut stmt = self.conn.prepare(
            "SELECT sensorId, stationId, paramName, stationName, value, date,
                    historicalValue, historicalDate
             FROM measurements ORDER BY id",
        )?;
        let measurements = stmt
            .query_map([], measurement_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        info!("Contents of measurements table:");
        for measurement in &measurements {
            info!("{:?}", measurement);
        }

        Ok(StoreDump {
            stations,
            sensors,
            measurements,
        })
    }
}

fn write_station(conn: &Connection, station: &Station) -> Result<bool> {
    info!("Inserting station {} ({})", station.id, station.name);
    let rows = conn.execute(
        "INSERT OR IGNORE INTO stations (id, stationName, city, longitude, latitude)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![station.id, station.name, station.city, station.longitude, station.latitude],
    )?;
    Ok(rows > 0)
}

fn write_sensor(conn: &Connection, sensor: &Sensor) -> Result<bool> {
    info!("Inserting sensor {} ({})", sensor.id, sensor.param_name);
    let rows = conn.execute(
        "INSERT OR IGNORE INTO sensors (id, stationId, paramName) VALUES (?1, ?2, ?3)",
        params![sensor.id, sensor.station_id, sensor.param_name],
    )?;
    Ok(rows > 0)
}

fn write_measurement(
    conn: &Connection,
    sensor_id: i64,
    entry: &SeriesEntry,
    station: &Station,
    sensor: &Sensor,
) -> Result<()> {
    info!(
        "Inserting value {} at {} for station {}, sensor {}",
        entry.value, entry.timestamp, station.id, sensor_id
    );
    conn.execute(
        "INSERT OR REPLACE INTO measurements
            (sensorId, stationId, paramName, stationName, value, date, historicalValue, historicalDate)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            sensor_id,
            station.id,
            sensor.param_name,
            station.name,
            entry.value,
            entry.timestamp,
            entry.historical_value,
            entry.historical_timestamp,
        ],
    )?;
    Ok(())
}

fn station_from_row(row: &Row<'_>) -> rusqlite::Result<Station> {
    Ok(Station {
        id: row.get(0)?,
        name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        city: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        longitude: row.get(3)?,
        latitude: row.get(4)?,
    })
}

fn sensor_from_row(row: &Row<'_>) -> rusqlite::Result<Sensor> {
    Ok(Sensor {
        id: row.get(0)?,
        station_id: row.get(1)?,
        param_name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
    })
}

fn measurement_from_row(row: &Row<'_>) -> rusqlite::Result<MeasurementRecord> {
    Ok(MeasurementRecord {
        sensor_id: row.get(0)?,
        station_id: row.get(1)?,
        param_name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        station_name: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        value: row.get(4)?,
        timestamp: row.get(5)?,
        historical_value: row.get(6)?,
        historical_timestamp: row.get(7)?,
    })
}
