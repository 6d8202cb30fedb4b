//! Windows spooler probe
//!
//! Lists installed printers through `EnumPrintersW` (local + connections).
//! Unlike the command probes this does not depend on `wmic` (removed from
//! recent Windows builds) or PowerShell being available.

use std::time::Duration;

use async_trait::async_trait;
use tracing::instrument;

use crate::error::{PrintError, PrintResult};
use crate::probe::{DEFAULT_PROBE_TIMEOUT, DeviceProbe};

/// Native spooler probe
#[derive(Debug, Clone)]
pub struct SpoolerProbe {
    timeout: Duration,
}

impl SpoolerProbe {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Set probe timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// List printer names via `EnumPrintersW`
    pub fn list() -> PrintResult<Vec<String>> {
        use windows::Win32::Graphics::Printing::{
            EnumPrintersW, PRINTER_ENUM_CONNECTIONS, PRINTER_ENUM_LOCAL, PRINTER_INFO_5W,
        };

        const LEVEL: u32 = 5;
        let flags = PRINTER_ENUM_LOCAL | PRINTER_ENUM_CONNECTIONS;
        let mut needed: u32 = 0;
        let mut returned: u32 = 0;

        // First call only reports the buffer size
        let _ = unsafe { EnumPrintersW(flags, None, LEVEL, None, &mut needed, &mut returned) };
        if needed == 0 {
            return Ok(Vec::new());
        }

        // u64 words keep the PRINTER_INFO_5W records aligned
        let words = (needed as usize).div_ceil(std::mem::size_of::<u64>());
        let mut buf: Vec<u64> = vec![0; words];
        {
            let bytes = unsafe {
                std::slice::from_raw_parts_mut(buf.as_mut_ptr().cast::<u8>(), needed as usize)
            };
            unsafe { EnumPrintersW(flags, None, LEVEL, Some(bytes), &mut needed, &mut returned) }
                .map_err(|e| PrintError::WindowsPrinter(format!("EnumPrintersW failed: {}", e)))?;
        }

        let records = unsafe {
            std::slice::from_raw_parts(buf.as_ptr().cast::<PRINTER_INFO_5W>(), returned as usize)
        };

        let names = records
            .iter()
            .filter(|info| !info.pPrinterName.is_null())
            .filter_map(|info| unsafe { info.pPrinterName.to_string() }.ok())
            .collect();

        Ok(names)
    }
}

impl Default for SpoolerProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DeviceProbe for SpoolerProbe {
    fn name(&self) -> &str {
        "spooler"
    }

    #[instrument(skip(self))]
    async fn probe(&self) -> PrintResult<Vec<String>> {
        let task = tokio::task::spawn_blocking(Self::list);

        tokio::time::timeout(self.timeout, task)
            .await
            .map_err(|_| PrintError::Timeout(self.timeout, "probe 'spooler'".to_string()))?
            .map_err(|e| PrintError::WindowsPrinter(format!("Task join failed: {}", e)))?
    }
}
