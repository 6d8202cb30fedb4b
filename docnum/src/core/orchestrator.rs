//! Run orchestration
//!
//! One run: allocate an identifier → materialize the template → print the
//! artifact. Only counter store failures escape a run; every other failure
//! is narrated and turns into a failed [`RunOutcome`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use docnum_printer::{DeviceEnumerator, DeviceSnapshot, PrintDispatcher, PrintHost};
use shared::{DEFAULT_PREFIX, DocumentIdentifier};
use tracing::{error, info, instrument, warn};

use crate::document::Materializer;
use crate::host::HostSession;
use crate::sequence::{CounterStore, DEFAULT_START_NUMBER, SequenceAllocator, StoreResult};

/// Result of one allocate → materialize → print cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Consumed even when later steps fail
    pub identifier: DocumentIdentifier,
    pub artifact: Option<PathBuf>,
    pub printed: bool,
}

impl RunOutcome {
    /// A run succeeds once its artifact is saved; printing is best-effort
    pub fn is_success(&self) -> bool {
        self.artifact.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub target: u32,
    pub succeeded: u32,
    pub failed: u32,
    /// Stop was requested before every run finished
    pub interrupted: bool,
}

pub struct Orchestrator<S, M, H: PrintHost> {
    allocator: SequenceAllocator<S>,
    materializer: M,
    session: HostSession<H>,
    enumerator: DeviceEnumerator,
    dispatcher: PrintDispatcher,
    prefix: String,
    start_number: u64,
    stop: Arc<AtomicBool>,
}

impl<S, M, H> Orchestrator<S, M, H>
where
    S: CounterStore,
    M: Materializer,
    H: PrintHost,
{
    /// Takes ownership of the host; it is quit when the orchestrator drops
    pub fn new(
        allocator: SequenceAllocator<S>,
        materializer: M,
        host: H,
        enumerator: DeviceEnumerator,
    ) -> Self {
        Self {
            allocator,
            materializer,
            session: HostSession::start(host),
            enumerator,
            dispatcher: PrintDispatcher::new(),
            prefix: DEFAULT_PREFIX.to_string(),
            start_number: DEFAULT_START_NUMBER,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_dispatcher(mut self, dispatcher: PrintDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn with_numbering(mut self, prefix: impl Into<String>, start_number: u64) -> Self {
        self.prefix = prefix.into();
        self.start_number = start_number;
        self
    }

    /// Flag checked between runs; setting it ends the batch after the
    /// current run completes
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    pub fn host(&self) -> &H {
        &self.session
    }

    pub fn allocator(&self) -> &SequenceAllocator<S> {
        &self.allocator
    }

    /// Probe printers once, for the startup report
    pub async fn device_report(&self) -> DeviceSnapshot {
        self.enumerator.snapshot().await
    }

    /// One full cycle
    #[instrument(skip(self), fields(prefix = %self.prefix))]
    pub async fn run_once(&mut self) -> StoreResult<RunOutcome> {
        let (identifier, number) = self.allocator.allocate(&self.prefix, self.start_number)?;
        println!(" Contract number: {}", identifier);
        println!(" Number: {}", number);

        let artifact = match self.materializer.materialize(&identifier) {
            Ok(path) => path,
            Err(e) => {
                error!(identifier = %identifier, error = %e, "Materialization failed");
                println!(" Contract could not be created: {}", e);
                return Ok(RunOutcome {
                    identifier,
                    artifact: None,
                    printed: false,
                });
            }
        };
        println!(" File saved: {}", artifact.display());

        let printed = self.print(&artifact).await;
        if printed {
            println!(" Print command completed successfully, check print queue");
        } else {
            println!(" Print failed");
        }

        Ok(RunOutcome {
            identifier,
            artifact: Some(artifact),
            printed,
        })
    }

    /// `count` cycles with `interval` between them
    ///
    /// A run is never cut short: the stop flag is only honoured between runs.
    pub async fn run_batch(&mut self, count: u32, interval: Duration) -> StoreResult<BatchSummary> {
        let mut summary = BatchSummary {
            target: count,
            ..Default::default()
        };

        for i in 1..=count {
            if self.stop.load(Ordering::SeqCst) {
                warn!(completed = i - 1, target_count = count, "Stop requested, ending batch");
                summary.interrupted = true;
                break;
            }

            println!("\n {}/{} - Creating contract...", i, count);

            let outcome = self.run_once().await?;
            if outcome.is_success() {
                summary.succeeded += 1;
                println!(" {}/{} successful!", i, count);
            } else {
                summary.failed += 1;
                println!(" {}/{} failed!", i, count);
            }

            if i < count && !interval.is_zero() {
                println!(" Waiting {} seconds...", interval.as_secs_f32());
                tokio::time::sleep(interval).await;
            }
        }

        info!(
            target_count = summary.target,
            succeeded = summary.succeeded,
            failed = summary.failed,
            interrupted = summary.interrupted,
            "Batch finished"
        );
        Ok(summary)
    }

    /// Open the artifact in the host and dispatch it to a freshly probed printer
    async fn print(&mut self, artifact: &Path) -> bool {
        let document = match self.session.open_document(artifact) {
            Ok(document) => document,
            Err(e) => {
                warn!(path = %artifact.display(), error = %e, "Cannot open artifact for print");
                return false;
            }
        };

        let report = self
            .dispatcher
            .dispatch_fresh(&self.enumerator, &mut *self.session, document)
            .await;

        if let Some(attempt) = report.accepted() {
            info!(
                tier = %attempt.tier,
                device = attempt.device.as_deref().unwrap_or("<active>"),
                "Print accepted"
            );
        }
        report.success
    }
}
