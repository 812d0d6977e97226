/// GIOS pjp-api client: station catalog and sensor measurement series.
///
/// Handles URL construction, JSON response parsing and the blocking HTTP
/// calls for the Polish Chief Inspectorate of Environmental Protection
/// REST service:
///   https://api.gios.gov.pl/pjp-api/rest/
///
/// The API is loose about types: identifiers and coordinates arrive either
/// as JSON numbers or as numeric strings, and measurement values may be
/// `null`. Everything is coerced into the typed records in `crate::model`
/// here so nothing downstream has to care. See `fixtures.rs` for annotated
/// payloads.

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, error, info};

use crate::error::FetchError;
use crate::model::{parse_timestamp, MeasurementSeries, SeriesEntry, Sensor, Station};

// ---------------------------------------------------------------------------
// Serde structures for the pjp-api JSON
// ---------------------------------------------------------------------------

/// A JSON scalar that should hold a number but is sometimes sent as text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Numeric::Number(n) => Some(*n),
            Numeric::Text(s) => s.trim().parse().ok(),
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            Numeric::Number(n) if n.fract() == 0.0 => Some(*n as i64),
            Numeric::Number(_) => None,
            Numeric::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Deserialize)]
struct RawStation {
    id: Numeric,
    #[serde(rename = "stationName")]
    station_name: String,
    city: Option<RawCity>,
    #[serde(rename = "gegrLon")]
    gegr_lon: Numeric,
    #[serde(rename = "gegrLat")]
    gegr_lat: Numeric,
}

#[derive(Deserialize)]
struct RawCity {
    name: String,
}

#[derive(Deserialize)]
struct RawSensor {
    id: Numeric,
    #[serde(rename = "stationId")]
    station_id: Numeric,
    param: RawParam,
}

#[derive(Deserialize)]
struct RawParam {
    #[serde(rename = "paramName")]
    param_name: String,
}

#[derive(Deserialize)]
struct RawSeries {
    values: Vec<RawValue>,
}

#[derive(Deserialize)]
struct RawValue {
    date: String,
    value: Option<Numeric>,
    #[serde(default)]
    historical_value: Option<Numeric>,
    #[serde(default)]
    historical_value_date: Option<String>,
}

// ---------------------------------------------------------------------------
// URL construction
// ---------------------------------------------------------------------------

/// All stations in the network.
pub fn stations_url(base_url: &str) -> String {
    format!("{}/station/findAll", base_url)
}

/// Sensors installed at one station.
pub fn sensors_url(base_url: &str, station_id: i64) -> String {
    format!("{}/station/sensors/{}", base_url, station_id)
}

/// Recent value series for one sensor.
pub fn sensor_data_url(base_url: &str, sensor_id: i64) -> String {
    format!("{}/data/getData/{}", base_url, sensor_id)
}

/// Air-quality index for one station.
pub fn aq_index_url(base_url: &str, station_id: i64) -> String {
    format!("{}/aqindex/getIndex/{}", base_url, station_id)
}

// ---------------------------------------------------------------------------
// Response parsing
// ---------------------------------------------------------------------------

/// Parses the `station/findAll` body into `Station`s.
///
/// # Errors
/// Returns a description of the problem when the JSON is malformed or an
/// id/coordinate cannot be coerced to a number.
pub fn parse_stations(json: &str) -> Result<Vec<Station>, String> {
    let raw: Vec<RawStation> = serde_json::from_str(json)
        .map_err(|e| format!("JSON deserialization failed: {}", e))?;

    raw.into_iter()
        .map(|s| {
            let id = s
                .id
                .as_i64()
                .ok_or_else(|| format!("station id {:?} is not an integer", s.id))?;
            let longitude = s
                .gegr_lon
                .as_f64()
                .ok_or_else(|| format!("station {}: longitude {:?} is not a number", id, s.gegr_lon))?;
            let latitude = s
                .gegr_lat
                .as_f64()
                .ok_or_else(|| format!("station {}: latitude {:?} is not a number", id, s.gegr_lat))?;

            Ok(Station {
                id,
                name: s.station_name,
                city: s.city.map(|c| c.name).unwrap_or_default(),
                longitude,
                latitude,
            })
        })
        .collect()
}

/// Parses the `station/sensors/{id}` body into `Sensor`s.
pub fn parse_sensors(json: &str) -> Result<Vec<Sensor>, String> {
    let raw: Vec<RawSensor> = serde_json::from_str(json)
        .map_err(|e| format!("JSON deserialization failed: {}", e))?;

    raw.into_iter()
        .map(|s| {
            let id = s
                .id
                .as_i64()
                .ok_or_else(|| format!("sensor id {:?} is not an integer", s.id))?;
            let station_id = s
                .station_id
                .as_i64()
                .ok_or_else(|| format!("sensor {}: stationId {:?} is not an integer", id, s.station_id))?;

            Ok(Sensor {
                id,
                station_id,
                param_name: s.param.param_name,
            })
        })
        .collect()
}

/// Parses the `data/getData/{id}` body into a `MeasurementSeries`.
///
/// Entries whose `value` is null or non-finite ("NaN", "inf") are dropped;
/// they are gaps in the upstream series, not errors. A null or non-finite
/// historical value drops the whole companion.
pub fn parse_series(json: &str) -> Result<MeasurementSeries, String> {
    let raw: RawSeries = serde_json::from_str(json)
        .map_err(|e| format!("JSON deserialization failed: {}", e))?;

    let mut values = Vec::with_capacity(raw.values.len());

    for entry in raw.values {
        let Some(raw_value) = entry.value else {
            debug!("Dropping null value at {}", entry.date);
            continue;
        };

        let value = raw_value
            .as_f64()
            .ok_or_else(|| format!("value {:?} at {} is not a number", raw_value, entry.date))?;
        if !value.is_finite() {
            debug!("Dropping non-finite value {} at {}", value, entry.date);
            continue;
        }
        let timestamp = parse_timestamp(&entry.date)
            .ok_or_else(|| format!("unrecognised date '{}'", entry.date))?;

        let historical_value = entry
            .historical_value
            .map(|h| h.as_f64().ok_or_else(|| format!("historical value {:?} is not a number", h)))
            .transpose()?
            .filter(|v| v.is_finite());
        let historical_timestamp = match (historical_value, entry.historical_value_date) {
            (Some(_), Some(raw_date)) => Some(
                parse_timestamp(&raw_date)
                    .ok_or_else(|| format!("unrecognised historical date '{}'", raw_date))?,
            ),
            _ => None,
        };

        values.push(SeriesEntry {
            timestamp,
            value,
            historical_value,
            historical_timestamp,
        });
    }

    Ok(MeasurementSeries { values })
}

// ---------------------------------------------------------------------------
// API client
// ---------------------------------------------------------------------------

/// Blocking client for the pjp-api. One attempt per call; no retries.
#[derive(Debug, Clone)]
pub struct GiosClient {
    http: Client,
    base_url: String,
}

impl GiosClient {
    /// Creates a client for the given base URL (e.g. `DEFAULT_API_BASE_URL`).
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches every station in the network.
    ///
    /// An `Err` means the catalog is unavailable right now; it must not be
    /// read as "no stations exist".
    pub fn list_stations(&self) -> Result<Vec<Station>, FetchError> {
        let url = stations_url(&self.base_url);
        self.get_and_parse(&url, parse_stations)
            .inspect(|stations| info!("Fetched {} stations", stations.len()))
            .inspect_err(|e| error!("Error fetching station list: {}", e))
    }

    /// Fetches the sensors installed at `station_id`.
    pub fn list_sensors(&self, station_id: i64) -> Result<Vec<Sensor>, FetchError> {
        let url = sensors_url(&self.base_url, station_id);
        self.get_and_parse(&url, parse_sensors)
            .inspect_err(|e| error!("Error fetching sensors for station {}: {}", station_id, e))
    }

    /// Fetches the recent value series for `sensor_id`, nulls removed.
    pub fn fetch_series(&self, sensor_id: i64) -> Result<MeasurementSeries, FetchError> {
        let url = sensor_data_url(&self.base_url, sensor_id);
        self.get_and_parse(&url, parse_series)
            .inspect(|series| debug!("Sensor {}: {} non-null values", sensor_id, series.values.len()))
            .inspect_err(|e| error!("Error fetching measurement data for sensor {}: {}", sensor_id, e))
    }

    /// Fetches the air-quality index for a station as untyped JSON.
    pub fn fetch_air_quality_index(&self, station_id: i64) -> Result<serde_json::Value, FetchError> {
        let url = aq_index_url(&self.base_url, station_id);
        self.get_and_parse(&url, |body| {
            serde_json::from_str(body).map_err(|e| format!("JSON deserialization failed: {}", e))
        })
        .inspect_err(|e| error!("Error fetching air quality index for station {}: {}", station_id, e))
    }

    fn get_and_parse<T>(
        &self,
        url: &str,
        parse: impl FnOnce(&str) -> Result<T, String>,
    ) -> Result<T, FetchError> {
        debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .send()
            .map_err(|e| FetchError::Request {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(|e| FetchError::Request {
            url: url.to_string(),
            source: e,
        })?;

        parse(&body).map_err(|message| FetchError::Decode {
            url: url.to_string(),
            message,
        })
    }
}

/// Stations whose city name contains `query`, ignoring case.
pub fn filter_by_city<'a>(stations: &'a [Station], query: &str) -> Vec<&'a Station> {
    let needle = query.trim().to_lowercase();
    stations
        .iter()
        .filter(|s| s.city.to_lowercase().contains(&needle))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
