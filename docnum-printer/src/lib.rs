//! # docnum-printer
//!
//! Printer discovery and tiered print dispatch.
//!
//! ## Scope
//!
//! This crate handles WHERE and HOW a finished document is printed:
//! - Probing the host for installed printers (`wmic`, `Get-Printer`,
//!   `EnumPrintersW`, `lpstat`)
//! - Classifying printers as physical or virtual
//! - Dispatching to a printer with three fallback tiers
//!
//! Producing the document (numbering, template filling) stays in the
//! application crate. The application also supplies the [`PrintHost`]
//! that actually submits jobs.
//!
//! ## Example
//!
//! ```ignore
//! use docnum_printer::{DeviceEnumerator, PrintDispatcher, PrintHost};
//!
//! let enumerator = DeviceEnumerator::for_platform(Duration::from_secs(10));
//! let document = host.open_document(&artifact)?;
//!
//! let report = PrintDispatcher::new()
//!     .dispatch_fresh(&enumerator, &mut host, document)
//!     .await;
//! if report.success {
//!     println!("Check print queue");
//! }
//! ```

mod dispatcher;
mod enumerator;
mod error;
mod host;
mod probe;
#[cfg(windows)]
mod spooler;

// Re-exports
pub use dispatcher::{
    AttemptPlan, Candidate, DEFAULT_SETTLE_DELAY, DispatchReport, PrintDispatcher,
};
pub use enumerator::{DeviceEnumerator, DeviceSnapshot, physical_only};
pub use error::{PrintError, PrintResult};
pub use host::{PrintHost, PrintRange, PrintRequest};
pub use probe::{
    CommandProbe, DEFAULT_PROBE_TIMEOUT, DeviceProbe, OutputParser, ProbeRole, parse_first_token,
    parse_lpstat_default, parse_name_table, parse_plain_lines, platform_probes,
};

#[cfg(windows)]
pub use spooler::SpoolerProbe;
