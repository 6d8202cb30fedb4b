//! Counter Model
//!
//! Per-day sequence counters persisted by the counter store.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::util::date_stamp;

/// Default namespace tag for daily sequence counters
pub const DEFAULT_NAMESPACE: &str = "sequential";

/// Counter key: namespace tag + calendar date
///
/// Rendered as `{namespace}_{YYYYMMDD}`, e.g. `sequential_20250614`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CounterKey {
    namespace: String,
    date: NaiveDate,
}

impl CounterKey {
    pub fn new(namespace: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            namespace: namespace.into(),
            date,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

impl fmt::Display for CounterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.namespace, date_stamp(self.date))
    }
}

/// Counter record (value stored under a [`CounterKey`])
///
/// `current_number` is the number the next allocation will hand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterRecord {
    pub current_number: u64,
}

impl CounterRecord {
    pub fn new(current_number: u64) -> Self {
        Self { current_number }
    }

    /// Record after one allocation
    pub fn advanced(self) -> Self {
        Self {
            current_number: self.current_number + 1,
        }
    }
}
