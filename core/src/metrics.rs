//! Derived-field calculations for production entries.
//!
//! Everything here is a pure function of its inputs. Bad input never
//! produces an error: missing timestamps yield zero elapsed time and
//! unparseable numbers are read as zero.

use chrono::NaiveDateTime;

use crate::time::parse_local_datetime;

pub const ZERO_HOURS: &str = "0 Hrs 0 Min";

/// Whole minutes between `start` and `end`; 0 if either is missing or `end <= start`.
pub fn compute_total_minutes(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> i64 {
    match (start, end) {
        (Some(start), Some(end)) if end > start => (end - start).num_minutes(),
        _ => 0,
    }
}

pub fn format_total_hours(total_minutes: i64) -> String {
    let minutes = total_minutes.max(0);
    format!("{} Hrs {} Min", minutes / 60, minutes % 60)
}

/// Elapsed time between two raw form timestamps, as `"{h} Hrs {m} Min"`.
pub fn compute_total_hours(start: &str, end: &str) -> String {
    let start = parse_local_datetime(start).ok();
    let end = parse_local_datetime(end).ok();
    format_total_hours(compute_total_minutes(start, end))
}

/// Integer percent of `actual` over `target`, 0 when there is no target.
pub fn compute_efficiency(actual: f64, target: f64) -> i64 {
    if target.is_nan() || target <= 0.0 || !actual.is_finite() {
        return 0;
    }
    round_half_up(actual / target * 100.0)
}

pub fn coerce_number(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

pub fn coerce_count(raw: &str) -> u32 {
    let n = coerce_number(raw);
    if n <= 0.0 {
        0
    } else {
        n.trunc().min(u32::MAX as f64) as u32
    }
}

// Halves round towards positive infinity, matching the dashboards the
// figures are compared against.
pub(crate) fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

pub(crate) fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_hours_example() {
        assert_eq!(compute_total_hours("2024-01-01T08:00", "2024-01-01T16:45"), "8 Hrs 45 Min");
    }

    #[test]
    fn test_total_hours_zero_cases() {
        assert_eq!(compute_total_hours("", "2024-01-01T16:45"), ZERO_HOURS);
        assert_eq!(compute_total_hours("2024-01-01T08:00", ""), ZERO_HOURS);
        assert_eq!(compute_total_hours("2024-01-01T08:00", "2024-01-01T08:00"), ZERO_HOURS);
        assert_eq!(compute_total_hours("2024-01-01T09:00", "2024-01-01T08:00"), ZERO_HOURS);
        assert_eq!(compute_total_hours("garbage", "2024-01-01T08:00"), ZERO_HOURS);
    }

    #[test]
    fn test_total_hours_truncates_seconds_and_spans_midnight() {
        assert_eq!(
            compute_total_hours("2024-01-01T22:00:00", "2024-01-02T06:30:59"),
            "8 Hrs 30 Min"
        );
        for minutes in [0_i64, 1, 59, 60, 61, 600, 1439] {
            let label = format_total_hours(minutes);
            assert_eq!(label, format!("{} Hrs {} Min", minutes / 60, minutes % 60));
        }
    }

    #[test]
    fn test_efficiency() {
        assert_eq!(compute_efficiency(450.0, 500.0), 90);
        assert_eq!(compute_efficiency(450.0, 0.0), 0);
        assert_eq!(compute_efficiency(0.0, 0.0), 0);
        assert_eq!(compute_efficiency(1.0, 3.0), 33);
        assert_eq!(compute_efficiency(2.0, 3.0), 67);
        assert_eq!(compute_efficiency(1.0, 200.0), 1); // 0.5 rounds up
        assert_eq!(compute_efficiency(600.0, 500.0), 120);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let first = (compute_efficiency(123.0, 456.0), compute_total_hours("2024-05-05T06:00", "2024-05-05T13:07"));
        let second = (compute_efficiency(123.0, 456.0), compute_total_hours("2024-05-05T06:00", "2024-05-05T13:07"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_coercion() {
        assert_eq!(coerce_number(""), 0.0);
        assert_eq!(coerce_number(" 12.5 "), 12.5);
        assert_eq!(coerce_number("abc"), 0.0);
        assert_eq!(coerce_number("inf"), 0.0);
        assert_eq!(coerce_count("7"), 7);
        assert_eq!(coerce_count("7.9"), 7);
        assert_eq!(coerce_count("-3"), 0);
        assert_eq!(coerce_count("x"), 0);
    }

    #[test]
    fn test_rounding_helpers() {
        assert_eq!(round_half_up(89.5), 90);
        assert_eq!(round_half_up(89.49), 89);
        assert_eq!(round_one_decimal(8.25), 8.3);
        assert_eq!(round_one_decimal(8.0), 8.0);
    }
}
