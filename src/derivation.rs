//! Values and labels derived from backup and node records.

use crate::model::NONE_LABEL;
use chrono::DateTime;

/// Label used in place of an empty storage prefix.
pub const NO_PREFIX_LABEL: &str = "no-prefix";

const TIMESTAMP_LAYOUT: &str = "%Y-%m-%d %H:%M:%S";

/// Render a Unix timestamp as a UTC label.
pub fn format_timestamp(timestamp: i64) -> String {
    match DateTime::from_timestamp(timestamp, 0) {
        Some(datetime) => datetime.format(TIMESTAMP_LAYOUT).to_string(),
        None => NONE_LABEL.to_string(),
    }
}

/// Start label for a node; nodes that never started have none.
pub fn node_start_label(started: i64) -> String {
    if started > 0 {
        format_timestamp(started)
    } else {
        NONE_LABEL.to_string()
    }
}

/// Duration in seconds and the stop time label.
///
/// Unfinished runs report `(0, "none")`. Finished runs are not clamped, so a
/// stop time before the start time yields a negative duration.
pub fn calculate_duration(started: i64, finished: i64) -> (f64, String) {
    if finished == 0 {
        (0.0, NONE_LABEL.to_string())
    } else {
        (finished.saturating_sub(started) as f64, format_timestamp(finished))
    }
}

pub fn prefix_label(prefix: &str) -> &str {
    if prefix.is_empty() {
        NO_PREFIX_LABEL
    } else {
        prefix
    }
}
