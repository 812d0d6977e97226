/// airmon_service: air-quality sensor monitoring for the GIOS network.
///
/// # Module structure
///
/// ```text
/// airmon_service
/// ├── model    — shared data types (Station, Sensor, SeriesEntry, AnalysisResult, …)
/// ├── error    — FetchError / StoreError / ConfigError
/// ├── config   — airmon.toml + environment configuration loader
/// ├── db       — SQLite connection and schema
/// ├── store    — insert-or-ignore / insert-or-replace persistence, reads, clear, dump
/// ├── ingest
/// │   ├── gios     — pjp-api: URL construction, JSON parsing, blocking client
/// │   └── fixtures (test only) — representative API response payloads
/// ├── analysis
/// │   ├── series   — merges current + historical values into one sorted series
/// │   └── stats    — min / max / mean / trend
/// └── monitor  — façade + explicit Session state for the presentation layer
/// ```

/// Public modules
pub mod analysis;
pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod model;
pub mod monitor;
pub mod store;
