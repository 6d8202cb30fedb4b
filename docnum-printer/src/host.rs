//! Print host abstraction
//!
//! The host is the external application (or OS facility) that owns an
//! "active printer" setting and can submit an open document to it. The
//! dispatcher only ever talks to this trait.

use std::path::Path;

use crate::error::PrintResult;

/// Page range of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintRange {
    /// The whole document
    AllDocument,
    /// Leave the range to the host's defaults
    HostDefault,
}

/// Submission parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintRequest {
    pub copies: u32,
    pub range: PrintRange,
    /// Return only after the host has spooled the job
    pub background: bool,
    pub print_to_file: bool,
}

impl PrintRequest {
    /// Single copy of the full document, spooled in the foreground
    pub fn full_document() -> Self {
        Self {
            copies: 1,
            range: PrintRange::AllDocument,
            background: false,
            print_to_file: false,
        }
    }

    /// Single copy, host decides the range (manual fallback)
    pub fn host_default() -> Self {
        Self {
            range: PrintRange::HostDefault,
            ..Self::full_document()
        }
    }
}

impl Default for PrintRequest {
    fn default() -> Self {
        Self::full_document()
    }
}

/// Trait for print hosts
///
/// The host is a single exclusively-owned session. Only submission is
/// async; everything else is quick bookkeeping.
#[allow(async_fn_in_trait)]
pub trait PrintHost {
    /// Open document handle
    type Document;

    /// Open an artifact for printing
    fn open_document(&mut self, path: &Path) -> PrintResult<Self::Document>;

    /// Make `device` the active output target
    fn set_active_printer(&mut self, device: &str) -> PrintResult<()>;

    /// Currently active output target, if the host knows it
    fn active_printer(&self) -> Option<String>;

    /// Submit the document to the active target
    async fn print_out(
        &mut self,
        document: &mut Self::Document,
        request: &PrintRequest,
    ) -> PrintResult<()>;

    /// Release a document handle
    fn close_document(&mut self, document: Self::Document) -> PrintResult<()>;

    /// End the host session
    fn quit(&mut self) -> PrintResult<()> {
        Ok(())
    }
}
