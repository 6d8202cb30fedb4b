//! docnum - dated document numbering and printing
//!
//! # Overview
//!
//! Each run allocates the next identifier for today (`MQ-20250614-120`),
//! writes it into a DOCX template, saves the result under a unique name and
//! sends it to a printer, falling back from physical printers to any
//! non-PDF printer to the host's current default.
//!
//! # Module layout
//!
//! ```text
//! docnum/src/
//! ├── core/       # Config, orchestrator, console reports
//! ├── sequence/   # Counter store and allocator
//! ├── document/   # Materializer trait, DOCX template filling
//! ├── host/       # OS spooler host, session guard
//! └── utils/      # Logging
//! ```

pub mod core;
pub mod document;
pub mod host;
pub mod sequence;
pub mod utils;

pub use crate::core::{BatchSummary, Config, Orchestrator, RunOutcome};
pub use document::{DocxMaterializer, MaterializeError, Materializer};
pub use host::{HostSession, SpoolerHost};
pub use sequence::{
    CounterStore, JsonCounterStore, MemoryCounterStore, SequenceAllocator, StoreError,
};

pub use utils::logger::init_logger_with_file;

/// Load `.env`, read the configuration and install logging
pub fn setup_environment() -> Config {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
    config
}

pub fn print_banner() {
    println!(
        r#"
     _
  __| | ___   ___ _ __  _   _ _ __ ___
 / _` |/ _ \ / __| '_ \| | | | '_ ` _ \
| (_| | (_) | (__| | | | |_| | | | | | |
 \__,_|\___/ \___|_| |_|\__,_|_| |_| |_|
"#
    );
    println!(" Automatic document numbering and printing");
    println!("{}", "=".repeat(50));
}
