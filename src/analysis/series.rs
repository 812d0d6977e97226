/// Series assembly: merges the current and historical columns of stored
/// measurements into one chronological sequence.
///
/// Each stored row contributes its `(date, value)` point and, when both
/// halves are present, its `(historicalDate, historicalValue)` point. Points
/// are NOT deduplicated by timestamp: if a historical companion lands on the
/// same instant as another row's current value, both points are kept.
///
/// Range filtering happens after the merge, so a historical point inside
/// the range counts even when its row's current date falls outside it.

use crate::error::StoreError;
use crate::model::{MeasurementRecord, SeriesPoint, Timestamp};
use crate::store::Store;

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Builds the sorted point sequence from stored rows.
///
/// All current points come first, then all historical points, then a
/// stable sort by timestamp; equal timestamps keep that input order.
pub fn merge_projections(rows: &[MeasurementRecord]) -> Vec<SeriesPoint> {
    let current = rows
        .iter()
        .filter(|r| !r.value.is_nan())
        .map(|r| SeriesPoint::new(r.timestamp, r.value));

    let historical = rows.iter().filter_map(|r| match (r.historical_timestamp, r.historical_value) {
        (Some(ts), Some(value)) if !value.is_nan() => Some(SeriesPoint::new(ts, value)),
        _ => None,
    });

    let mut points: Vec<SeriesPoint> = current.chain(historical).collect();
    // Vec::sort_by_key is stable.
    points.sort_by_key(|p| p.timestamp);
    points
}

/// Keeps points with `start <= timestamp <= end`; either bound may be open.
pub fn filter_range(
    points: Vec<SeriesPoint>,
    start: Option<Timestamp>,
    end: Option<Timestamp>,
) -> Vec<SeriesPoint> {
    points
        .into_iter()
        .filter(|p| start.is_none_or(|s| p.timestamp >= s))
        .filter(|p| end.is_none_or(|e| p.timestamp <= e))
        .collect()
}

// ---------------------------------------------------------------------------
// Assembly from the store
// ---------------------------------------------------------------------------

/// Reads every stored row for `sensor_id` and returns the merged, sorted,
/// range-filtered series. An unknown sensor yields an empty series.
pub fn assemble_series(
    store: &Store,
    sensor_id: i64,
    start: Option<Timestamp>,
    end: Option<Timestamp>,
) -> Result<Vec<SeriesPoint>, StoreError> {
    let rows = store.measurement_rows(sensor_id)?;
    Ok(filter_range(merge_projections(&rows), start, end))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
