/// Integration tests for the fetch → save → assemble → analyze pipeline
///
/// These tests verify:
/// 1. The blocking client parses real-shaped pjp-api payloads over HTTP
/// 2. A non-success status is reported as unavailable, never as "no data"
/// 3. Saving a selection writes station, sensor and measurement to disk
/// 4. Stored rows merge into one series and analyze as expected
/// 5. clear_all empties every table
///
/// A tiny_http server on an ephemeral port stands in for the upstream API,
/// and each test gets its own SQLite file in a temporary directory.
///
/// Run with: cargo test --test pipeline_integration

use std::thread;

use tempfile::TempDir;
use tiny_http::{Header, Response, Server};

use airmon_service::error::FetchError;
use airmon_service::ingest::gios::GiosClient;
use airmon_service::model::{parse_timestamp, Timestamp, Trend};
use airmon_service::monitor::{Monitor, SaveOutcome, Session};
use airmon_service::store::Store;

const STATIONS_JSON: &str = r#"[
  {
    "id": "114",
    "stationName": "Wrocław - Bartnicza",
    "gegrLat": "51.115933",
    "gegrLon": "17.141125",
    "city": { "id": 1064, "name": "Wrocław" }
  },
  {
    "id": 400,
    "stationName": "Kraków, Aleja Krasińskiego",
    "gegrLat": 50.057678,
    "gegrLon": 19.926189,
    "city": { "id": 415, "name": "Kraków" }
  }
]"#;

const SENSORS_JSON: &str = r#"[
  { "id": 642, "stationId": 114, "param": { "paramName": "dwutlenek azotu", "paramCode": "NO2" } },
  { "id": 644, "stationId": 114, "param": { "paramName": "pył zawieszony PM10", "paramCode": "PM10" } }
]"#;

// Newest first, no historical companion: the second entry becomes it.
const NO2_SERIES_JSON: &str = r#"{
  "key": "NO2",
  "values": [
    { "date": "2024-06-01 14:00:00", "value": 21.5 },
    { "date": "2024-06-01 13:00:00", "value": 18.5 },
    { "date": "2024-06-01 12:00:00", "value": 17.0 }
  ]
}"#;

// Leading null hour is dropped before the current record is picked.
const PM10_SERIES_JSON: &str = r#"{
  "key": "PM10",
  "values": [
    { "date": "2024-06-01 14:00:00", "value": null },
    { "date": "2024-06-01 13:00:00", "value": 40 },
    { "date": "2024-06-01 12:00:00", "value": "35.5" }
  ]
}"#;

const INDEX_JSON: &str = r#"{ "id": 114, "stIndexLevel": { "id": 1, "indexLevelName": "Dobry" } }"#;

/// Serves the payloads above; station 500's sensor list answers 500.
fn spawn_upstream() -> String {
    let server = Server::http("127.0.0.1:0").expect("bind mock upstream");
    let addr = server
        .server_addr()
        .to_ip()
        .expect("mock upstream has an IP address");

    thread::spawn(move || {
        let json = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
            .expect("static header");

        for request in server.incoming_requests() {
            let body = match request.url() {
                "/station/findAll" => Some(STATIONS_JSON),
                "/station/sensors/114" => Some(SENSORS_JSON),
                "/station/sensors/400" => Some("[]"),
                "/data/getData/642" => Some(NO2_SERIES_JSON),
                "/data/getData/644" => Some(PM10_SERIES_JSON),
                "/data/getData/999" => Some(r#"{ "key": "SO2", "values": [] }"#),
                "/aqindex/getIndex/114" => Some(INDEX_JSON),
                _ => None,
            };

            let response = match body {
                Some(body) => Response::from_string(body).with_header(json.clone()),
                None if request.url() == "/station/sensors/500" => {
                    Response::from_string("internal error").with_status_code(500)
                }
                None => Response::from_string("not found").with_status_code(404),
            };
            let _ = request.respond(response);
        }
    });

    format!("http://{}", addr)
}

fn ts(raw: &str) -> Timestamp {
    parse_timestamp(raw).expect("valid test timestamp")
}

/// Monitor against the mock upstream with a fresh on-disk store.
fn monitor_with_disk_store() -> (Monitor, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let store = Store::open(dir.path().join("air_quality.db")).expect("open store");
    let monitor = Monitor::new(GiosClient::new(spawn_upstream()), store);
    (monitor, dir)
}

/// Selects station 114 and the given sensor, returning the session.
fn select(monitor: &Monitor, sensor_id: i64) -> Session {
    let mut session = Session::new();
    let station = monitor
        .list_stations()
        .expect("catalog available")
        .into_iter()
        .find(|s| s.id == 114)
        .expect("station 114 in catalog");
    let sensor = monitor
        .select_station(&mut session, station)
        .expect("sensors available")
        .into_iter()
        .find(|s| s.id == sensor_id)
        .expect("sensor at station 114");
    monitor
        .select_sensor(&mut session, sensor)
        .expect("series available");
    session
}

// ---------------------------------------------------------------------------
// Client over HTTP
// ---------------------------------------------------------------------------

#[test]
fn test_client_parses_catalog_over_http() {
    let client = GiosClient::new(format!("{}/", spawn_upstream()));

    let stations = client.list_stations().expect("catalog available");
    assert_eq!(stations.len(), 2);
    assert_eq!(stations[0].id, 114);
    assert_eq!(stations[0].city, "Wrocław");
    assert!((stations[1].latitude - 50.057678).abs() < 1e-9);

    let sensors = client.list_sensors(114).expect("sensors available");
    assert_eq!(sensors.len(), 2);
    assert!(sensors.iter().all(|s| s.station_id == 114));
}

#[test]
fn test_station_without_sensors_is_empty_not_unavailable() {
    let client = GiosClient::new(spawn_upstream());
    let sensors = client.list_sensors(400);
    assert!(matches!(sensors, Ok(ref v) if v.is_empty()), "got {:?}", sensors);
}

#[test]
fn test_server_error_is_unavailable() {
    let client = GiosClient::new(spawn_upstream());
    match client.list_sensors(500) {
        Err(FetchError::Status { status, .. }) => assert_eq!(status, 500),
        other => panic!("expected a status error, got {:?}", other),
    }
}

#[test]
fn test_null_values_are_dropped_over_http() {
    let client = GiosClient::new(spawn_upstream());
    let series = client.fetch_series(644).expect("series available");

    assert_eq!(series.values.len(), 2, "null hour should be dropped");
    assert_eq!(series.values[0].value, 40.0);
    assert_eq!(series.values[1].value, 35.5);
}

#[test]
fn test_lookup_city_filters_case_insensitively() {
    let (monitor, _dir) = monitor_with_disk_store();
    let found = monitor.lookup_city("kraków").expect("catalog available");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, 400);

    assert!(monitor.lookup_city("Gdańsk").expect("catalog available").is_empty());
}

#[test]
fn test_air_quality_index_is_passed_through() {
    let (monitor, _dir) = monitor_with_disk_store();
    let index = monitor.fetch_air_quality_index(114).expect("index available");
    assert_eq!(index["stIndexLevel"]["indexLevelName"], "Dobry");
}

// ---------------------------------------------------------------------------
// Save → assemble → analyze
// ---------------------------------------------------------------------------

#[test]
fn test_save_then_analyze() {
    let (mut monitor, _dir) = monitor_with_disk_store();
    let session = select(&monitor, 642);

    let pending = session.pending.as_ref().expect("pending reading");
    assert_eq!(pending.value, 21.5);
    assert_eq!(pending.historical_value, Some(18.5));
    assert_eq!(pending.historical_timestamp, Some(ts("2024-06-01 13:00:00")));

    assert_eq!(monitor.save_measurement(&session), SaveOutcome::Saved);

    let stored = monitor.stored_stations();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "Wrocław - Bartnicza");
    assert_eq!(monitor.stored_sensors(114).len(), 1);

    assert_eq!(
        monitor.sensor_info(642),
        Some(("dwutlenek azotu".to_string(), "Wrocław - Bartnicza".to_string()))
    );
    assert_eq!(
        monitor.available_dates(642),
        vec![ts("2024-06-01 13:00:00"), ts("2024-06-01 14:00:00")]
    );

    let series = monitor.assemble_series(642, None, None);
    let values: Vec<f64> = series.iter().map(|p| p.value).collect();
    assert_eq!(values, vec![18.5, 21.5]);

    let analysis = monitor.analyze(642, None, None).expect("stored data");
    assert_eq!(analysis.min_value, 18.5);
    assert_eq!(analysis.max_value, 21.5);
    assert_eq!(analysis.mean_value, 20.0);
    assert_eq!(analysis.trend, Trend::Increasing);
    assert_eq!(analysis.min_timestamp, ts("2024-06-01 13:00:00"));
}

#[test]
fn test_saving_twice_replaces_the_same_reading() {
    let (mut monitor, _dir) = monitor_with_disk_store();
    let session = select(&monitor, 642);

    assert_eq!(monitor.save_measurement(&session), SaveOutcome::Saved);
    assert_eq!(monitor.save_measurement(&session), SaveOutcome::Saved);

    let dump = monitor.dump().expect("dump");
    assert_eq!(dump.stations.len(), 1);
    assert_eq!(dump.sensors.len(), 1);
    assert_eq!(dump.measurements.len(), 1, "same (sensor, date) must not duplicate");
}

#[test]
fn test_range_filter_after_merge() {
    let (mut monitor, _dir) = monitor_with_disk_store();
    let session = select(&monitor, 644);
    assert_eq!(monitor.save_measurement(&session), SaveOutcome::Saved);

    // Only the historical companion falls inside the window.
    let series = monitor.assemble_series(
        644,
        Some(ts("2024-06-01 11:00:00")),
        Some(ts("2024-06-01 12:30:00")),
    );
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].value, 35.5);

    // Single point: equal endpoints.
    let analysis = monitor
        .analyze(644, Some(ts("2024-06-01 11:00:00")), Some(ts("2024-06-01 12:30:00")))
        .expect("one point in range");
    assert_eq!(analysis.trend, Trend::Decreasing);

    assert!(monitor
        .analyze(644, Some(ts("2024-07-01")), None)
        .is_none());
}

#[test]
fn test_sensor_without_values_has_nothing_to_save() {
    let (mut monitor, _dir) = monitor_with_disk_store();
    let mut session = Session::new();
    let station = monitor
        .list_stations()
        .expect("catalog available")
        .into_iter()
        .find(|s| s.id == 114)
        .expect("station 114");
    monitor
        .select_station(&mut session, station)
        .expect("sensors available");

    let silent = airmon_service::model::Sensor {
        id: 999,
        station_id: 114,
        param_name: "dwutlenek siarki".to_string(),
    };
    let pending = monitor
        .select_sensor(&mut session, silent)
        .expect("series available");
    assert!(pending.is_none());

    assert_eq!(monitor.save_measurement(&session), SaveOutcome::NothingToSave);
    assert!(monitor.stored_stations().is_empty());
}

#[test]
fn test_clear_all_empties_every_table() {
    let (mut monitor, _dir) = monitor_with_disk_store();
    for sensor_id in [642, 644] {
        let session = select(&monitor, sensor_id);
        assert_eq!(monitor.save_measurement(&session), SaveOutcome::Saved);
    }
    assert_eq!(monitor.stored_sensors(114).len(), 2);

    assert!(monitor.clear_all());

    let dump = monitor.dump().expect("dump");
    assert!(dump.stations.is_empty());
    assert!(dump.sensors.is_empty());
    assert!(dump.measurements.is_empty());
    assert!(monitor.analyze(642, None, None).is_none());
}

#[test]
fn test_data_survives_reopen() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("nested").join("air_quality.db");
    let upstream = spawn_upstream();

    {
        let mut monitor = Monitor::new(
            GiosClient::new(upstream.clone()),
            Store::open(&path).expect("open store"),
        );
        let session = select(&monitor, 642);
        assert_eq!(monitor.save_measurement(&session), SaveOutcome::Saved);
    }

    let reopened = Store::open(&path).expect("reopen store");
    let rows = reopened.measurement_rows(642).expect("read rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].value, 21.5);
}
