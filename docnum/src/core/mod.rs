//! Core - configuration and run orchestration
//!
//! # Module layout
//!
//! - [`Config`] - environment-driven configuration
//! - [`Orchestrator`] - allocate → materialize → print cycles
//! - [`report`] - console reports around a batch

pub mod config;
pub mod orchestrator;
pub mod report;

pub use config::Config;
pub use orchestrator::{BatchSummary, Orchestrator, RunOutcome};
pub use report::{print_device_report, print_summary};
