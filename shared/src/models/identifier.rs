//! Document Identifier Model

use std::fmt;

use chrono::NaiveDate;

use crate::util::date_stamp;

/// Default identifier prefix
pub const DEFAULT_PREFIX: &str = "MQ";

/// Dated document identifier: `PREFIX-YYYYMMDD-NNN`
///
/// `NNN` is zero-padded to at least three digits; larger values widen.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentIdentifier {
    prefix: String,
    date: NaiveDate,
    number: u64,
}

impl DocumentIdentifier {
    pub fn new(prefix: impl Into<String>, date: NaiveDate, number: u64) -> Self {
        Self {
            prefix: prefix.into(),
            date,
            number,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Numeric part, as written into the document placeholder
    pub fn number(&self) -> u64 {
        self.number
    }
}

impl fmt::Display for DocumentIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{:03}",
            self.prefix,
            date_stamp(self.date),
            self.number
        )
    }
}
