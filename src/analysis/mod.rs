/// Data analysis for the air-quality monitoring service.
///
/// Submodules:
/// - `series` — merges stored current/historical values into one sorted series.
/// - `stats`  — min/max/mean/trend over an assembled series.

pub mod series;
pub mod stats;

pub use series::assemble_series;
pub use stats::analyze;
