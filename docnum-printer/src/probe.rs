//! Device probes
//!
//! A probe asks one facility of the host operating environment for the
//! installed printers. Probes are independent: each one runs in its own
//! failure boundary inside the enumerator.
//!
//! Supports:
//! - External listing commands (`wmic`, `Get-Printer`, `lpstat`)
//! - Windows spooler API (`EnumPrintersW`)

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::error::{PrintError, PrintResult};

/// Default time budget for one probe
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// How the enumerator treats a probe's result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeRole {
    /// Discovered names join the device set
    Source,
    /// Run best-effort and logged; names never join the device set
    Informational,
}

/// Trait for device probes
#[async_trait]
pub trait DeviceProbe: Send + Sync {
    /// Short label used in logs
    fn name(&self) -> &str;

    fn role(&self) -> ProbeRole {
        ProbeRole::Source
    }

    /// Run the probe and return device names in discovery order
    async fn probe(&self) -> PrintResult<Vec<String>>;
}

/// Output parser for a command probe
pub type OutputParser = fn(&str) -> Vec<String>;

/// Probe backed by an external listing command
#[derive(Debug, Clone)]
pub struct CommandProbe {
    name: String,
    program: String,
    args: Vec<String>,
    parser: OutputParser,
    role: ProbeRole,
    timeout: Duration,
}

impl CommandProbe {
    pub fn new(
        name: impl Into<String>,
        program: impl Into<String>,
        args: &[&str],
        parser: OutputParser,
    ) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
            parser,
            role: ProbeRole::Source,
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Set probe timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Mark the probe as informational
    pub fn informational(mut self) -> Self {
        self.role = ProbeRole::Informational;
        self
    }

    /// `wmic printer get name`
    pub fn wmic() -> Self {
        Self::new("wmic", "wmic", &["printer", "get", "name"], parse_name_table)
    }

    /// PowerShell `Get-Printer`
    pub fn powershell() -> Self {
        Self::new(
            "powershell",
            "powershell",
            &["-NoProfile", "-Command", "Get-Printer | Select-Object Name"],
            parse_name_table,
        )
    }

    /// PowerShell default-printer query (informational)
    pub fn powershell_default() -> Self {
        Self::new(
            "powershell-default",
            "powershell",
            &[
                "-NoProfile",
                "-Command",
                "Get-CimInstance Win32_Printer | Where-Object Default | Select-Object Name",
            ],
            parse_name_table,
        )
        .informational()
    }

    /// CUPS `lpstat -e` (one destination per line)
    pub fn lpstat_destinations() -> Self {
        Self::new("lpstat-e", "lpstat", &["-e"], parse_plain_lines)
    }

    /// CUPS `lpstat -a` (queues accepting requests)
    pub fn lpstat_accepting() -> Self {
        Self::new("lpstat-a", "lpstat", &["-a"], parse_first_token)
    }

    /// CUPS `lpstat -d` default destination (informational)
    pub fn lpstat_default() -> Self {
        Self::new("lpstat-d", "lpstat", &["-d"], parse_lpstat_default).informational()
    }
}

#[async_trait]
impl DeviceProbe for CommandProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn role(&self) -> ProbeRole {
        self.role
    }

    #[instrument(skip(self), fields(probe = %self.name, program = %self.program))]
    async fn probe(&self) -> PrintResult<Vec<String>> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| PrintError::Timeout(self.timeout, format!("probe '{}'", self.name)))?
            .map_err(|e| PrintError::ProbeSpawn {
                probe: self.name.clone(),
                source: e,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = match stderr.trim() {
                "" => format!("exited with {}", output.status),
                msg => msg.to_string(),
            };
            return Err(PrintError::ProbeFailed {
                probe: self.name.clone(),
                message,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let names = (self.parser)(&stdout);
        debug!(count = names.len(), "Probe output parsed");
        Ok(names)
    }
}

/// Probes for the current platform, in query order
pub fn platform_probes(timeout: Duration) -> Vec<Box<dyn DeviceProbe>> {
    #[cfg(windows)]
    {
        vec![
            Box::new(CommandProbe::wmic().with_timeout(timeout)),
            Box::new(CommandProbe::powershell().with_timeout(timeout)),
            Box::new(crate::spooler::SpoolerProbe::new().with_timeout(timeout)),
            Box::new(CommandProbe::powershell_default().with_timeout(timeout)),
        ]
    }

    #[cfg(not(windows))]
    {
        vec![
            Box::new(CommandProbe::lpstat_destinations().with_timeout(timeout)),
            Box::new(CommandProbe::lpstat_accepting().with_timeout(timeout)),
            Box::new(CommandProbe::lpstat_default().with_timeout(timeout)),
        ]
    }
}

// ========== Output parsers ==========

/// Single-column table with a `Name` header and optional dashed rule
///
/// Covers `wmic ... get name` and `Select-Object Name` output.
pub fn parse_name_table(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.eq_ignore_ascii_case("name"))
        .filter(|line| !line.chars().all(|c| c == '-'))
        .map(str::to_string)
        .collect()
}

/// One name per line
pub fn parse_plain_lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// First whitespace-separated token of each line
pub fn parse_first_token(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

/// `system default destination: NAME`
pub fn parse_lpstat_default(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| line.split_once("destination:"))
        .map(|(_, name)| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
