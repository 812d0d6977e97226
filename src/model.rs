/// Shared data types for the air-quality monitoring service.
///
/// Everything here is a plain value: the ingest layer produces these types,
/// the store persists them and the analysis layer reads them back. Nothing
/// in this module touches the network or the database.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Timestamps are naive wall-clock times as published by the upstream API
/// (Polish local time, no offset in the payload).
pub type Timestamp = NaiveDateTime;

/// Canonical text form used when printing timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// A fixed physical monitoring location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// Stable external identifier assigned by the network.
    pub id: i64,
    pub name: String,
    pub city: String,
    /// WGS84 longitude.
    pub longitude: f64,
    /// WGS84 latitude.
    pub latitude: f64,
}

/// An instrument at a station measuring one parameter (e.g. PM10).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    pub id: i64,
    pub station_id: i64,
    /// Measured pollutant, e.g. "pył zawieszony PM10".
    pub param_name: String,
}

// ---------------------------------------------------------------------------
// Measurements
// ---------------------------------------------------------------------------

/// One normalized entry of a sensor's value series as fetched from the API.
///
/// The value is never null here: null entries are dropped while parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesEntry {
    pub timestamp: Timestamp,
    pub value: f64,
    /// Optional companion reading returned alongside the current one.
    pub historical_value: Option<f64>,
    pub historical_timestamp: Option<Timestamp>,
}

impl SeriesEntry {
    pub fn new(timestamp: Timestamp, value: f64) -> Self {
        Self {
            timestamp,
            value,
            historical_value: None,
            historical_timestamp: None,
        }
    }

    pub fn with_historical(mut self, timestamp: Timestamp, value: f64) -> Self {
        self.historical_timestamp = Some(timestamp);
        self.historical_value = Some(value);
        self
    }
}

/// A sensor's value series, newest entry first (the order the API returns).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementSeries {
    pub values: Vec<SeriesEntry>,
}

impl MeasurementSeries {
    /// Picks the reading a user would save from a freshly fetched series.
    ///
    /// The first entry is the current value and the second entry, when
    /// there is one, becomes its historical companion, replacing any
    /// companion the first entry carried. A lone entry keeps its own.
    pub fn current_record(&self) -> Option<SeriesEntry> {
        let mut entries = self.values.iter();
        let mut current = entries.next()?.clone();

        if let Some(previous) = entries.next() {
            current.historical_value = Some(previous.value);
            current.historical_timestamp = Some(previous.timestamp);
        }

        Some(current)
    }
}

/// One persisted observation, including the fields denormalized from the
/// station and sensor at write time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementRecord {
    pub sensor_id: i64,
    pub station_id: i64,
    pub param_name: String,
    pub station_name: String,
    pub value: f64,
    pub timestamp: Timestamp,
    pub historical_value: Option<f64>,
    pub historical_timestamp: Option<Timestamp>,
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// A single `(timestamp, value)` point of an assembled series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub timestamp: Timestamp,
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(timestamp: Timestamp, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Coarse direction of a series, comparing its last value to its first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    Increasing,
    Decreasing,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Increasing => write!(f, "Increasing"),
            Trend::Decreasing => write!(f, "Decreasing"),
        }
    }
}

/// Summary statistics over a non-empty series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub min_value: f64,
    pub min_timestamp: Timestamp,
    pub max_value: f64,
    pub max_timestamp: Timestamp,
    pub mean_value: f64,
    pub trend: Trend,
}

// ---------------------------------------------------------------------------
// Timestamp parsing
// ---------------------------------------------------------------------------

/// Parses the timestamp shapes seen in upstream payloads and user input.
///
/// Accepted: `2024-06-01 13:00:00`, `2024-06-01T13:00:00`, RFC 3339 with an
/// offset (converted to UTC), and a bare `2024-06-01` (midnight).
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(ts);
        }
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_utc());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
