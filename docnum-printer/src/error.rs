//! Error types for the printer library

use std::time::Duration;

use thiserror::Error;

/// Printer error types
#[derive(Debug, Error)]
pub enum PrintError {
    /// Probe process could not be started
    #[error("Probe '{probe}' could not start: {source}")]
    ProbeSpawn {
        probe: String,
        #[source]
        source: std::io::Error,
    },

    /// Probe process ran but reported failure
    #[error("Probe '{probe}' failed: {message}")]
    ProbeFailed { probe: String, message: String },

    /// Timeout waiting for a probe or the host
    #[error("Timeout after {0:?}: {1}")]
    Timeout(Duration, String),

    /// Host refused to make a device the active target
    #[error("Cannot select printer '{device}': {message}")]
    SelectTarget { device: String, message: String },

    /// Host raised an error while submitting the document
    #[error("Print submission failed: {0}")]
    Submission(String),

    /// Document could not be opened or released
    #[error("Document error: {0}")]
    Document(String),

    /// IO error during printing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Windows spooler API error
    #[cfg(windows)]
    #[error("Windows printer error: {0}")]
    WindowsPrinter(String),
}

/// Result type for printer operations
pub type PrintResult<T> = Result<T, PrintError>;
