use std::path::PathBuf;
use std::time::Duration;

use docnum_printer::{DEFAULT_PROBE_TIMEOUT, DEFAULT_SETTLE_DELAY};
use shared::{DEFAULT_NAMESPACE, DEFAULT_PREFIX};

use crate::document::{DEFAULT_ARTIFACT_PREFIX, DEFAULT_PLACEHOLDER};
use crate::host::DEFAULT_SUBMIT_TIMEOUT;
use crate::sequence::DEFAULT_START_NUMBER;

/// Run configuration
///
/// # Environment variables
///
/// Every field can be overridden from the environment (or a `.env` file):
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | COUNTER_FILE | contract_numbers.json | Counter store file |
/// | COUNTER_NAMESPACE | sequential | Counter key namespace |
/// | DOCUMENT_PREFIX | MQ | Identifier prefix |
/// | START_NUMBER | 120 | First number of each day |
/// | TEMPLATE_PATH | template.docx | DOCX template |
/// | OUTPUT_DIR | . | Where artifacts are saved |
/// | PLACEHOLDER_NAME | document_number | Bookmark receiving the number |
/// | ARTIFACT_PREFIX | Contract | Artifact file name prefix |
/// | PROBE_TIMEOUT_MS | 10000 | Per-probe timeout |
/// | PRINT_SETTLE_MS | 3000 | Pause after dispatch |
/// | PRINT_TIMEOUT_MS | 60000 | Per-submission timeout |
/// | RUN_COUNT | 1 | Documents per invocation |
/// | RUN_INTERVAL_MS | 2000 | Pause between documents |
/// | LOG_LEVEL | info | Log level |
/// | LOG_DIR | (unset) | Daily log file directory |
///
/// # Example
///
/// ```ignore
/// TEMPLATE_PATH=C:\docs\validator.docx RUN_COUNT=3 docnum
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub counter_file: PathBuf,
    pub counter_namespace: String,
    pub prefix: String,
    pub start_number: u64,
    pub template_path: PathBuf,
    pub output_dir: PathBuf,
    pub placeholder: String,
    pub artifact_prefix: String,
    pub probe_timeout: Duration,
    pub settle_delay: Duration,
    pub print_timeout: Duration,
    pub run_count: u32,
    pub run_interval: Duration,
    pub log_level: String,
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Unset or unparsable variables fall back to defaults.
    pub fn from_env() -> Self {
        Self {
            counter_file: env_or("COUNTER_FILE", "contract_numbers.json").into(),
            counter_namespace: env_or("COUNTER_NAMESPACE", DEFAULT_NAMESPACE),
            prefix: env_or("DOCUMENT_PREFIX", DEFAULT_PREFIX),
            start_number: env_parse("START_NUMBER").unwrap_or(DEFAULT_START_NUMBER),
            template_path: env_or("TEMPLATE_PATH", "template.docx").into(),
            output_dir: env_or("OUTPUT_DIR", ".").into(),
            placeholder: env_or("PLACEHOLDER_NAME", DEFAULT_PLACEHOLDER),
            artifact_prefix: env_or("ARTIFACT_PREFIX", DEFAULT_ARTIFACT_PREFIX),
            probe_timeout: env_parse("PROBE_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_PROBE_TIMEOUT),
            settle_delay: env_parse("PRINT_SETTLE_MS")
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_SETTLE_DELAY),
            print_timeout: env_parse("PRINT_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_SUBMIT_TIMEOUT),
            run_count: env_parse("RUN_COUNT").unwrap_or(1),
            run_interval: Duration::from_millis(env_parse("RUN_INTERVAL_MS").unwrap_or(2000)),
            log_level: env_or("LOG_LEVEL", "info"),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
        }
    }

    /// Configuration rooted in `dir`, for tests
    pub fn with_work_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            counter_file: dir.join("contract_numbers.json"),
            template_path: dir.join("template.docx"),
            output_dir: dir.join("out"),
            settle_delay: Duration::ZERO,
            run_interval: Duration::ZERO,
            ..Self::from_env()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
