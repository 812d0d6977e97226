/// Core façade used by the presentation layer.
///
/// `Monitor` owns the upstream client and the local store and exposes the
/// handful of operations a front-end needs: browse the catalog, pick a
/// station and sensor, save the reading, analyze what was saved, wipe it.
///
/// Selection state lives in a `Session` value owned by the caller and
/// passed in by reference; the monitor itself keeps none.
///
/// Failure policy:
/// - remote failures come back as `Err(FetchError)` ("unavailable"), which
///   callers must keep distinct from an empty `Ok`;
/// - storage failures are logged and the operation becomes a no-op. Writes
///   report this through their return value, reads return empty results.

use tracing::{error, info, warn};

use crate::analysis::{series, stats};
use crate::config::AppConfig;
use crate::error::{FetchError, StoreError};
use crate::ingest::gios::{self, GiosClient};
use crate::model::{AnalysisResult, SeriesEntry, SeriesPoint, Sensor, Station, Timestamp};
use crate::store::{Store, StoreDump};

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// What the user has selected so far.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub selected_station: Option<Station>,
    pub selected_sensor: Option<Sensor>,
    /// Reading fetched for the selected sensor, waiting to be saved.
    pub pending: Option<SeriesEntry>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Result of `Monitor::save_measurement`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// The session lacks a station, sensor or reading.
    NothingToSave,
    /// The store rejected the write; details were logged.
    Failed,
}

// ---------------------------------------------------------------------------
// Monitor
// ---------------------------------------------------------------------------

pub struct Monitor {
    client: GiosClient,
    store: Store,
}

impl Monitor {
    pub fn new(client: GiosClient, store: Store) -> Self {
        Self { client, store }
    }

    /// Build a monitor from configuration, opening the database file.
    pub fn from_config(config: &AppConfig) -> Result<Self, StoreError> {
        let store = Store::open(&config.database_path)?;
        Ok(Self::new(GiosClient::new(config.api_base_url.clone()), store))
    }

    // === Remote catalog ===

    pub fn list_stations(&self) -> Result<Vec<Station>, FetchError> {
        self.client.list_stations()
    }

    /// Stations whose city contains `city`, case-insensitively.
    pub fn lookup_city(&self, city: &str) -> Result<Vec<Station>, FetchError> {
        let stations = self.client.list_stations()?;
        let found: Vec<Station> = gios::filter_by_city(&stations, city).into_iter().cloned().collect();
        if found.is_empty() {
            info!("No measurement centers found for city: {}", city);
        }
        Ok(found)
    }

    pub fn list_sensors(&self, station_id: i64) -> Result<Vec<Sensor>, FetchError> {
        self.client.list_sensors(station_id)
    }

    pub fn fetch_air_quality_index(&self, station_id: i64) -> Result<serde_json::Value, FetchError> {
        self.client.fetch_air_quality_index(station_id)
    }

    // === Selection ===

    /// Select a station and fetch its sensors.
    ///
    /// Any previous sensor and pending reading are cleared, even if the
    /// sensor fetch fails.
    pub fn select_station(&self, session: &mut Session, station: Station) -> Result<Vec<Sensor>, FetchError> {
        info!("Selected station {} ({})", station.id, station.name);
        let station_id = station.id;
        session.selected_station = Some(station);
        session.selected_sensor = None;
        session.pending = None;
        self.client.list_sensors(station_id)
    }

    /// Select a sensor and fetch its current reading into `session.pending`.
    ///
    /// Returns the pending reading, or `None` when the sensor reported no
    /// non-null values.
    pub fn select_sensor<'s>(
        &self,
        session: &'s mut Session,
        sensor: Sensor,
    ) -> Result<Option<&'s SeriesEntry>, FetchError> {
        info!("Selected sensor {} ({})", sensor.id, sensor.param_name);
        let sensor_id = sensor.id;
        session.selected_sensor = Some(sensor);
        session.pending = None;

        let series = self.client.fetch_series(sensor_id)?;
        session.pending = series.current_record();
        Ok(session.pending.as_ref())
    }

    // === Persistence ===

    /// Persist the session's station, sensor and pending reading.
    ///
    /// The three rows are written together; a failure stores none of them.
    pub fn save_measurement(&mut self, session: &Session) -> SaveOutcome {
        let (Some(station), Some(sensor), Some(entry)) = (
            session.selected_station.as_ref(),
            session.selected_sensor.as_ref(),
            session.pending.as_ref(),
        ) else {
            warn!("Save requested with no data to save");
            return SaveOutcome::NothingToSave;
        };

        match self.store.save_selection(station, sensor, entry) {
            Ok(()) => {
                info!(
                    "Saved sensor {} value {} at {}",
                    sensor.id, entry.value, entry.timestamp
                );
                SaveOutcome::Saved
            }
            Err(e) => {
                error!("Error saving measurement for sensor {}: {}", sensor.id, e);
                SaveOutcome::Failed
            }
        }
    }

    /// Wipe every stored row. Returns `false` (after logging) on failure.
    pub fn clear_all(&mut self) -> bool {
        self.store
            .clear_all()
            .inspect_err(|e| error!("Error clearing data: {}", e))
            .is_ok()
    }

    // === Stored data ===

    pub fn stored_stations(&self) -> Vec<Station> {
        self.store
            .list_stations()
            .inspect_err(|e| error!("Error reading stored stations: {}", e))
            .unwrap_or_default()
    }

    pub fn stored_sensors(&self, station_id: i64) -> Vec<Sensor> {
        self.store
            .list_sensors(station_id)
            .inspect_err(|e| error!("Error reading stored sensors for station {}: {}", station_id, e))
            .unwrap_or_default()
    }

    pub fn available_dates(&self, sensor_id: i64) -> Vec<Timestamp> {
        self.store
            .available_dates(sensor_id)
            .inspect_err(|e| error!("Error reading dates for sensor {}: {}", sensor_id, e))
            .unwrap_or_default()
    }

    /// `(param_name, station_name)` for labelling a stored sensor.
    pub fn sensor_info(&self, sensor_id: i64) -> Option<(String, String)> {
        self.store
            .sensor_info(sensor_id)
            .inspect_err(|e| error!("Error reading sensor info for {}: {}", sensor_id, e))
            .ok()
            .flatten()
    }

    pub fn assemble_series(
        &self,
        sensor_id: i64,
        start: Option<Timestamp>,
        end: Option<Timestamp>,
    ) -> Vec<SeriesPoint> {
        series::assemble_series(&self.store, sensor_id, start, end)
            .inspect_err(|e| error!("Error assembling series for sensor {}: {}", sensor_id, e))
            .unwrap_or_default()
    }

    /// Assemble then analyze in one call. `None` when there is no data.
    pub fn analyze(
        &self,
        sensor_id: i64,
        start: Option<Timestamp>,
        end: Option<Timestamp>,
    ) -> Option<AnalysisResult> {
        stats::analyze(&self.assemble_series(sensor_id, start, end))
    }

    pub fn dump(&self) -> Option<StoreDump> {
        self.store
            .dump()
            .inspect_err(|e| error!("Error inspecting database: {}", e))
            .ok()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
