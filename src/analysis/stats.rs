/// Summary statistics over an assembled series.
///
/// Expects the input already sorted by timestamp (as `assemble_series`
/// produces it): "first occurrence" and "first/last value" are positional.

use crate::model::{AnalysisResult, SeriesPoint, Trend};

/// Computes min, max, mean and trend. Returns `None` for an empty series.
///
/// - `min_timestamp` / `max_timestamp` belong to the earliest point reaching
///   the extreme.
/// - `trend` is `Increasing` only when the last value is strictly greater
///   than the first; equal endpoints give `Decreasing`.
pub fn analyze(series: &[SeriesPoint]) -> Option<AnalysisResult> {
    let first = series.first()?;
    let last = series.last()?;

    let mut min = first;
    let mut max = first;
    let mut sum = 0.0;

    for point in series {
        // Strict comparisons keep the earliest point on ties.
        if point.value < min.value {
            min = point;
        }
        if point.value > max.value {
            max = point;
        }
        sum += point.value;
    }

    let trend = if last.value > first.value {
        Trend::Increasing
    } else {
        Trend::Decreasing
    };

    Some(AnalysisResult {
        min_value: min.value,
        min_timestamp: min.timestamp,
        max_value: max.value,
        max_timestamp: max.timestamp,
        mean_value: sum / series.len() as f64,
        trend,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    /// Points on consecutive days starting 2022-01-01.
    fn daily(values: &[f64]) -> Vec<SeriesPoint> {
        let start = NaiveDate::from_ymd_opt(2022, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, v)| SeriesPoint::new(start + Duration::days(i as i64), *v))
            .collect()
    }

    #[test]
    fn test_empty_series_has_no_result() {
        assert!(analyze(&[]).is_none());
    }

    #[test]
    fn test_increasing_series() {
        let series = daily(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let result = analyze(&series).expect("non-empty series");

        assert_eq!(result.min_value, 10.0);
        assert_eq!(result.max_value, 50.0);
        assert_eq!(result.mean_value, 30.0);
        assert_eq!(result.trend, Trend::Increasing);
        assert_eq!(result.min_timestamp, series[0].timestamp);
        assert_eq!(result.max_timestamp, series[4].timestamp);
    }

    #[test]
    fn test_equal_endpoints_are_decreasing() {
        let result = analyze(&daily(&[10.0, 10.0])).expect("non-empty series");
        assert_eq!(result.trend, Trend::Decreasing);
    }

    #[test]
    fn test_decreasing_series() {
        let result = analyze(&daily(&[50.0, 10.0, 20.0])).expect("non-empty series");
        assert_eq!(result.trend, Trend::Decreasing);
        assert_eq!(result.min_value, 10.0);
        assert_eq!(result.max_value, 50.0);
    }

    #[test]
    fn test_ties_resolve_to_earliest_point() {
        let series = daily(&[5.0, 1.0, 9.0, 1.0, 9.0]);
        let result = analyze(&series).expect("non-empty series");

        assert_eq!(result.min_timestamp, series[1].timestamp);
        assert_eq!(result.max_timestamp, series[2].timestamp);
    }

    #[test]
    fn test_single_point() {
        let series = daily(&[7.5]);
        let result = analyze(&series).expect("non-empty series");

        assert_eq!(result.min_value, 7.5);
        assert_eq!(result.max_value, 7.5);
        assert_eq!(result.mean_value, 7.5);
        assert_eq!(result.min_timestamp, result.max_timestamp);
        assert_eq!(result.trend, Trend::Decreasing);
    }

    #[test]
    fn test_mean_of_fractional_values() {
        let result = analyze(&daily(&[1.5, 2.5, 4.0])).expect("non-empty series");
        assert!((result.mean_value - 8.0 / 3.0).abs() < 1e-12);
    }
}
