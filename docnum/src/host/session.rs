//! Host session guard
//!
//! One session per process run. Dropping the guard quits the host on every
//! exit path; a failing quit is logged and swallowed.

use std::ops::{Deref, DerefMut};

use docnum_printer::PrintHost;
use tracing::{info, warn};

pub struct HostSession<H: PrintHost> {
    host: H,
}

impl<H: PrintHost> HostSession<H> {
    pub fn start(host: H) -> Self {
        info!("Print host session started");
        Self { host }
    }
}

impl<H: PrintHost> Deref for HostSession<H> {
    type Target = H;

    fn deref(&self) -> &H {
        &self.host
    }
}

impl<H: PrintHost> DerefMut for HostSession<H> {
    fn deref_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

impl<H: PrintHost> Drop for HostSession<H> {
    fn drop(&mut self) {
        match self.host.quit() {
            Ok(()) => info!("Print host session closed"),
            Err(e) => warn!(error = %e, "Print host did not quit cleanly, ignoring"),
        }
    }
}
