use std::collections::HashSet;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use docnum::document::MaterializeResult;
use docnum::sequence::StoreResult;
use docnum::{
    CounterStore, DocxMaterializer, JsonCounterStore, MaterializeError, Materializer,
    MemoryCounterStore, Orchestrator, SequenceAllocator, StoreError,
};
use docnum_printer::{
    DeviceEnumerator, DeviceProbe, PrintDispatcher, PrintError, PrintHost, PrintRequest,
    PrintResult,
};
use shared::{CounterKey, CounterRecord, DocumentIdentifier, util};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// Materializer double: writes a small file per identifier, failing on
/// the listed call numbers (1-based)
struct ScriptedMaterializer {
    dir: PathBuf,
    fail_on: HashSet<usize>,
    calls: usize,
}

impl ScriptedMaterializer {
    fn new(dir: &Path, fail_on: &[usize]) -> Self {
        Self {
            dir: dir.to_path_buf(),
            fail_on: fail_on.iter().copied().collect(),
            calls: 0,
        }
    }
}

impl Materializer for ScriptedMaterializer {
    fn materialize(&mut self, identifier: &DocumentIdentifier) -> MaterializeResult<PathBuf> {
        self.calls += 1;
        if self.fail_on.contains(&self.calls) {
            return Err(MaterializeError::TemplateNotFound(self.dir.join("template.docx")));
        }
        let path = self.dir.join(format!("Contract_{}.docx", identifier));
        std::fs::write(&path, identifier.to_string())?;
        Ok(path)
    }
}

/// Host double recording where each document went
#[derive(Default)]
struct RecordingHost {
    offline: bool,
    active: Option<String>,
    opened: Vec<PathBuf>,
    printed_on: Vec<Option<String>>,
    closed: usize,
    quits: Arc<AtomicUsize>,
}

impl PrintHost for RecordingHost {
    type Document = PathBuf;

    fn open_document(&mut self, path: &Path) -> PrintResult<PathBuf> {
        self.opened.push(path.to_path_buf());
        Ok(path.to_path_buf())
    }

    fn set_active_printer(&mut self, device: &str) -> PrintResult<()> {
        self.active = Some(device.to_string());
        Ok(())
    }

    fn active_printer(&self) -> Option<String> {
        self.active.clone()
    }

    async fn print_out(&mut self, _document: &mut PathBuf, _request: &PrintRequest) -> PrintResult<()> {
        if self.offline {
            return Err(PrintError::Submission("spooler stopped".to_string()));
        }
        self.printed_on.push(self.active.clone());
        Ok(())
    }

    fn close_document(&mut self, _document: PathBuf) -> PrintResult<()> {
        self.closed += 1;
        Ok(())
    }

    fn quit(&mut self) -> PrintResult<()> {
        self.quits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FixedProbe(Vec<&'static str>);

#[async_trait]
impl DeviceProbe for FixedProbe {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn probe(&self) -> PrintResult<Vec<String>> {
        Ok(self.0.iter().map(|s| s.to_string()).collect())
    }
}

/// Reports "A" on its first pass and "B" on every later one
struct ChangingProbe {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl DeviceProbe for ChangingProbe {
    fn name(&self) -> &str {
        "changing"
    }

    async fn probe(&self) -> PrintResult<Vec<String>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let device = if call == 0 { "A" } else { "B" };
        Ok(vec![device.to_string()])
    }
}

/// Materializer that raises the stop flag while producing its first artifact
struct StoppingMaterializer {
    inner: ScriptedMaterializer,
    stop: Arc<AtomicBool>,
}

impl Materializer for StoppingMaterializer {
    fn materialize(&mut self, identifier: &DocumentIdentifier) -> MaterializeResult<PathBuf> {
        self.stop.store(true, Ordering::SeqCst);
        self.inner.materialize(identifier)
    }
}

/// Store whose writes always fail
struct ReadOnlyStore;

impl CounterStore for ReadOnlyStore {
    fn get(&self, _key: &CounterKey) -> StoreResult<Option<CounterRecord>> {
        Ok(None)
    }

    fn put(&mut self, _key: &CounterKey, _record: CounterRecord) -> StoreResult<()> {
        Err(StoreError::Io {
            path: PathBuf::from("contract_numbers.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }
}

fn enumerator(devices: &[&'static str]) -> DeviceEnumerator {
    DeviceEnumerator::new(vec![Box::new(FixedProbe(devices.to_vec()))])
}

fn orchestrator<S: CounterStore, M: Materializer>(
    store: S,
    materializer: M,
    host: RecordingHost,
    devices: &[&'static str],
) -> Orchestrator<S, M, RecordingHost> {
    Orchestrator::new(SequenceAllocator::new(store), materializer, host, enumerator(devices))
        .with_dispatcher(PrintDispatcher::new().with_settle_delay(Duration::ZERO))
}

fn today_key() -> CounterKey {
    CounterKey::new("sequential", util::today())
}

#[tokio::test]
async fn test_failed_materialization_still_consumes_number() {
    let dir = TempDir::new().unwrap();
    let mut orch = orchestrator(
        MemoryCounterStore::new(),
        ScriptedMaterializer::new(dir.path(), &[2]),
        RecordingHost::default(),
        &["Office Laser"],
    );

    let first = orch.run_once().await.unwrap();
    let second = orch.run_once().await.unwrap();
    let third = orch.run_once().await.unwrap();

    assert_eq!(first.identifier.number(), 120);
    assert_eq!(second.identifier.number(), 121);
    assert_eq!(third.identifier.number(), 122);
    assert_ne!(first.identifier, second.identifier);

    assert!(first.is_success());
    assert!(!second.is_success());
    assert!(!second.printed);
    assert!(third.is_success());

    // The gap at 121 is never handed out again
    let record = orch.allocator().store().get(&today_key()).unwrap();
    assert_eq!(record, Some(CounterRecord::new(123)));

    // Only the saved artifacts reached the host
    assert_eq!(orch.host().opened.len(), 2);
    assert_eq!(orch.host().closed, 2);
}

#[tokio::test]
async fn test_prints_on_first_physical_printer() {
    let dir = TempDir::new().unwrap();
    let mut orch = orchestrator(
        MemoryCounterStore::new(),
        ScriptedMaterializer::new(dir.path(), &[]),
        RecordingHost::default(),
        &["Microsoft Print to PDF", "Fax", "Brother HL-L2350DW", "Office Laser"],
    );

    let outcome = orch.run_once().await.unwrap();

    assert!(outcome.printed);
    assert_eq!(
        orch.host().printed_on,
        vec![Some("Brother HL-L2350DW".to_string())]
    );
}

#[tokio::test]
async fn test_print_failure_does_not_fail_run() {
    let dir = TempDir::new().unwrap();
    let host = RecordingHost {
        offline: true,
        ..Default::default()
    };
    let mut orch = orchestrator(
        MemoryCounterStore::new(),
        ScriptedMaterializer::new(dir.path(), &[]),
        host,
        &["Office Laser"],
    );

    let outcome = orch.run_once().await.unwrap();

    assert!(outcome.is_success());
    assert!(!outcome.printed);
    assert!(outcome.artifact.unwrap().exists());
    assert_eq!(orch.host().closed, 1);
}

#[tokio::test]
async fn test_store_failure_aborts_run() {
    let dir = TempDir::new().unwrap();
    let mut orch = orchestrator(
        ReadOnlyStore,
        ScriptedMaterializer::new(dir.path(), &[]),
        RecordingHost::default(),
        &[],
    );

    let err = orch.run_once().await.unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }));
    assert!(orch.host().opened.is_empty());
}

#[tokio::test]
async fn test_batch_counts_and_host_quit() {
    let dir = TempDir::new().unwrap();
    let quits = Arc::new(AtomicUsize::new(0));
    let host = RecordingHost {
        quits: quits.clone(),
        ..Default::default()
    };

    let mut orch = orchestrator(
        MemoryCounterStore::new(),
        ScriptedMaterializer::new(dir.path(), &[2]),
        host,
        &[],
    );

    let summary = orch.run_batch(3, Duration::ZERO).await.unwrap();
    assert_eq!(summary.target, 3);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);

    // No printers: the host's default destination is used
    assert_eq!(orch.host().printed_on, vec![None, None]);

    assert_eq!(quits.load(Ordering::SeqCst), 0);
    drop(orch);
    assert_eq!(quits.load(Ordering::SeqCst), 1);
}

const BODY: &str = r#"<w:document><w:body><w:p><w:r><w:t>No. </w:t></w:r><w:bookmarkStart w:id="0" w:name="document_number"/><w:r><w:t>000</w:t></w:r><w:bookmarkEnd w:id="0"/></w:p></w:body></w:document>"#;

fn write_template(path: &Path) {
    let mut writer = ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default();
    writer.start_file("[Content_Types].xml", options).unwrap();
    writer.write_all(b"<Types/>").unwrap();
    writer.start_file("word/document.xml", options).unwrap();
    writer.write_all(BODY.as_bytes()).unwrap();
    writer.finish().unwrap();
}

fn document_body(path: &Path) -> String {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut body = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut body)
        .unwrap();
    body
}

#[tokio::test]
async fn test_docx_cycle_persists_counter() {
    let dir = TempDir::new().unwrap();
    let template = dir.path().join("template.docx");
    write_template(&template);
    let counter_file = dir.path().join("contract_numbers.json");

    {
        let store = JsonCounterStore::open(&counter_file).unwrap();
        let materializer = DocxMaterializer::new(&template, dir.path().join("out"));
        let mut orch = orchestrator(store, materializer, RecordingHost::default(), &["Office Laser"]);

        let outcome = orch.run_once().await.unwrap();
        let artifact = outcome.artifact.unwrap();

        assert!(document_body(&artifact).contains(r#"<w:t xml:space="preserve">120</w:t>"#));
        assert!(document_body(&template).contains("<w:t>000</w:t>"));
    }

    // A new process picks up where the previous one stopped
    let store = JsonCounterStore::open(&counter_file).unwrap();
    assert_eq!(store.get(&today_key()).unwrap(), Some(CounterRecord::new(121)));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&counter_file).unwrap()).unwrap();
    assert_eq!(json[today_key().to_string()]["current_number"], 121);
}

#[tokio::test]
async fn test_devices_are_probed_again_for_every_dispatch() {
    let dir = TempDir::new().unwrap();
    let calls = Arc::new(AtomicUsize::new(0));
    let enumerator = DeviceEnumerator::new(vec![Box::new(ChangingProbe {
        calls: calls.clone(),
    })]);

    let mut orch = Orchestrator::new(
        SequenceAllocator::new(MemoryCounterStore::new()),
        ScriptedMaterializer::new(dir.path(), &[]),
        RecordingHost::default(),
        enumerator,
    )
    .with_dispatcher(PrintDispatcher::new().with_settle_delay(Duration::ZERO));

    assert!(orch.run_once().await.unwrap().printed);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(orch.run_once().await.unwrap().printed);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    assert_eq!(
        orch.host().printed_on,
        vec![Some("A".to_string()), Some("B".to_string())]
    );
}

#[tokio::test]
async fn test_stop_flag_lets_current_run_finish() {
    let dir = TempDir::new().unwrap();
    let stop = Arc::new(AtomicBool::new(false));
    let materializer = StoppingMaterializer {
        inner: ScriptedMaterializer::new(dir.path(), &[]),
        stop: stop.clone(),
    };

    let mut orch = orchestrator(
        MemoryCounterStore::new(),
        materializer,
        RecordingHost::default(),
        &["Office Laser"],
    )
    .with_stop_flag(stop);

    let summary = orch.run_batch(3, Duration::ZERO).await.unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.target, 3);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 0);

    // The run in progress printed and released its document
    assert_eq!(orch.host().printed_on, vec![Some("Office Laser".to_string())]);
    assert_eq!(orch.host().closed, 1);
}

#[tokio::test]
async fn test_stop_before_batch_runs_nothing() {
    let dir = TempDir::new().unwrap();
    let mut orch = orchestrator(
        MemoryCounterStore::new(),
        ScriptedMaterializer::new(dir.path(), &[]),
        RecordingHost::default(),
        &[],
    )
    .with_stop_flag(Arc::new(AtomicBool::new(true)));

    let summary = orch.run_batch(2, Duration::ZERO).await.unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.succeeded + summary.failed, 0);
    assert_eq!(orch.allocator().store().get(&today_key()).unwrap(), None);
}
