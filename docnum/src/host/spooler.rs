//! OS spooler print host
//!
//! Submits saved artifacts through the operating system's print facility:
//! - CUPS: `lp -n <copies> [-d <printer>] <file>`
//! - Windows: `Start-Process -Verb PrintTo` (or `Print` without a target),
//!   which hands the file to its registered application
//!
//! The "active printer" is session state: set by the dispatcher, used by
//! the next submission. `None` means the system default destination.

use std::path::{Path, PathBuf};
use std::time::Duration;

use docnum_printer::{PrintError, PrintHost, PrintRequest, PrintResult};
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Default time budget for one submission command
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(60);

/// Open artifact handle
#[derive(Debug)]
pub struct SpoolDocument {
    path: PathBuf,
}

impl SpoolDocument {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Print host backed by the OS spooler
#[derive(Debug)]
pub struct SpoolerHost {
    active: Option<String>,
    timeout: Duration,
}

impl SpoolerHost {
    pub fn new() -> Self {
        Self {
            active: None,
            timeout: DEFAULT_SUBMIT_TIMEOUT,
        }
    }

    /// Set the submission timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for SpoolerHost {
    fn default() -> Self {
        Self::new()
    }
}

/// Program and arguments submitting `path` to `target`
pub fn submit_command(
    target: Option<&str>,
    request: &PrintRequest,
    path: &Path,
) -> (String, Vec<String>) {
    let file = path.display().to_string();

    if cfg!(windows) {
        let quote = |s: &str| format!("'{}'", s.replace('\'', "''"));
        let script = match target {
            Some(printer) => format!(
                "Start-Process -FilePath {} -Verb PrintTo -ArgumentList {}",
                quote(&file),
                quote(&format!("\"{}\"", printer))
            ),
            None => format!("Start-Process -FilePath {} -Verb Print", quote(&file)),
        };
        (
            "powershell".to_string(),
            vec!["-NoProfile".to_string(), "-Command".to_string(), script],
        )
    } else {
        let mut args = vec!["-n".to_string(), request.copies.max(1).to_string()];
        if let Some(printer) = target {
            args.push("-d".to_string());
            args.push(printer.to_string());
        }
        args.push(file);
        ("lp".to_string(), args)
    }
}

/// Run a submission command; a hung command is killed after `timeout`
pub async fn run_submission(program: &str, args: &[String], timeout: Duration) -> PrintResult<()> {
    let mut cmd = Command::new(program);
    cmd.args(args).kill_on_drop(true);

    let output = tokio::time::timeout(timeout, cmd.output())
        .await
        .map_err(|_| PrintError::Timeout(timeout, format!("print command '{}'", program)))?
        .map_err(|e| PrintError::Submission(format!("{} could not start: {}", program, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PrintError::Submission(format!(
            "{} exited with {}: {}",
            program,
            output.status,
            stderr.trim()
        )));
    }

    Ok(())
}

impl PrintHost for SpoolerHost {
    type Document = SpoolDocument;

    fn open_document(&mut self, path: &Path) -> PrintResult<SpoolDocument> {
        let meta = std::fs::metadata(path)
            .map_err(|e| PrintError::Document(format!("{}: {}", path.display(), e)))?;
        if meta.len() == 0 {
            return Err(PrintError::Document(format!("{} is empty", path.display())));
        }

        info!(path = %path.display(), "Document opened for print");
        Ok(SpoolDocument {
            path: path.to_path_buf(),
        })
    }

    fn set_active_printer(&mut self, device: &str) -> PrintResult<()> {
        if device.trim().is_empty() {
            return Err(PrintError::SelectTarget {
                device: device.to_string(),
                message: "empty printer name".to_string(),
            });
        }
        self.active = Some(device.to_string());
        Ok(())
    }

    fn active_printer(&self) -> Option<String> {
        self.active.clone()
    }

    #[instrument(skip(self, document), fields(path = %document.path.display()))]
    async fn print_out(
        &mut self,
        document: &mut SpoolDocument,
        request: &PrintRequest,
    ) -> PrintResult<()> {
        if request.print_to_file {
            return Err(PrintError::Submission(
                "print to file is not supported by the spooler host".to_string(),
            ));
        }

        let (program, args) = submit_command(self.active.as_deref(), request, &document.path);
        debug!(program = %program, args = ?args, "Submitting print job");
        run_submission(&program, &args, self.timeout).await
    }

    fn close_document(&mut self, document: SpoolDocument) -> PrintResult<()> {
        info!(path = %document.path.display(), "Print document closed");
        Ok(())
    }

    fn quit(&mut self) -> PrintResult<()> {
        self.active = None;
        Ok(())
    }
}
