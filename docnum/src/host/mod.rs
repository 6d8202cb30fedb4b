//! Print host implementations
//!
//! - [`SpoolerHost`] - submits through `lp` / `Start-Process`
//! - [`HostSession`] - quits the host when the run ends

pub mod session;
pub mod spooler;

pub use session::HostSession;
pub use spooler::{DEFAULT_SUBMIT_TIMEOUT, SpoolDocument, SpoolerHost, run_submission, submit_command};
