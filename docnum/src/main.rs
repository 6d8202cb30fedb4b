use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use docnum::core::{print_device_report, print_summary};
use docnum::{
    DocxMaterializer, JsonCounterStore, Orchestrator, SequenceAllocator, SpoolerHost,
    print_banner, setup_environment,
};
use docnum_printer::{DeviceEnumerator, PrintDispatcher};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (dotenv, config, logging)
    let config = setup_environment();

    print_banner();
    tracing::info!(
        template = %config.template_path.display(),
        counter_file = %config.counter_file.display(),
        run_count = config.run_count,
        "docnum starting"
    );

    // 2. Counter store and allocator
    let store = JsonCounterStore::open(&config.counter_file)?;
    let allocator = SequenceAllocator::with_namespace(store, config.counter_namespace.clone());

    // 3. Materializer, print host, printer discovery
    let materializer = DocxMaterializer::new(&config.template_path, &config.output_dir)
        .with_placeholder(config.placeholder.clone())
        .with_artifact_prefix(config.artifact_prefix.clone());
    let enumerator = DeviceEnumerator::for_platform(config.probe_timeout);

    let host = SpoolerHost::new().with_timeout(config.print_timeout);
    let stop = Arc::new(AtomicBool::new(false));
    let mut orchestrator = Orchestrator::new(allocator, materializer, host, enumerator)
        .with_dispatcher(PrintDispatcher::new().with_settle_delay(config.settle_delay))
        .with_numbering(config.prefix.clone(), config.start_number)
        .with_stop_flag(Arc::clone(&stop));

    print_device_report(&orchestrator.device_report().await);

    let next = orchestrator
        .allocator()
        .peek_on(shared::util::today(), config.start_number)?;
    println!(" Next number today: {}", next);

    // 4. Ctrl-C ends the batch after the run in progress
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\n Stop requested, finishing current document...");
            tracing::warn!("Interrupted, stopping after the current run");
            stop.store(true, Ordering::SeqCst);
        }
    });

    // 5. Run the batch; the host session is quit when the orchestrator drops
    match orchestrator
        .run_batch(config.run_count, config.run_interval)
        .await
    {
        Ok(summary) => print_summary(&summary),
        Err(e) => {
            tracing::error!("Counter store error: {}", e);
            return Err(e.into());
        }
    }

    drop(orchestrator);
    println!("\n Program completed");
    Ok(())
}
