//! Date and timestamp helpers

use chrono::{Local, NaiveDate, NaiveDateTime};

/// Calendar date format used in counter keys and identifiers
pub const DATE_FORMAT: &str = "%Y%m%d";

/// Timestamp format embedded in artifact file names
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Today's date in local time
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Current local date-time
pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Format a date as `YYYYMMDD`
pub fn date_stamp(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Format a date-time as `YYYYMMDD_HHMMSS`
pub fn timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}
