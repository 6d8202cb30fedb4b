//! Console reports printed around a batch

use docnum_printer::DeviceSnapshot;

use super::orchestrator::BatchSummary;

/// Startup printer check: every printer, the physical ones and the one
/// the first tier would try
pub fn print_device_report(snapshot: &DeviceSnapshot) {
    println!("\n PRINTER CHECK");
    println!("{}", "=".repeat(50));

    if snapshot.all.is_empty() {
        println!(" No printers found, the system default will be used");
        return;
    }

    println!(" All printers ({}):", snapshot.all.len());
    for (i, device) in snapshot.descriptors().iter().enumerate() {
        let class = if device.is_physical() { "physical" } else { "virtual" };
        println!("   {}. {} [{}]", i + 1, device.name, class);
    }

    if snapshot.physical.is_empty() {
        println!(" No physical printers found");
    } else {
        println!(" Physical printers ({}):", snapshot.physical.len());
        for (i, name) in snapshot.physical.iter().enumerate() {
            println!("   {}. {}", i + 1, name);
        }
    }

    if let Some(selected) = snapshot.preferred() {
        println!(" Selected printer: {}", selected);
    }
}

pub fn print_summary(summary: &BatchSummary) {
    if summary.interrupted {
        println!(
            "\n Stopped by user, {} files created successfully",
            summary.succeeded
        );
    }
    println!("\n{}", "=".repeat(50));
    println!(" FINAL RESULTS:");
    println!("   Target: {}", summary.target);
    println!("   Successful: {}", summary.succeeded);
    println!("   Failed: {}", summary.failed);
    println!("{}", "=".repeat(50));
}
