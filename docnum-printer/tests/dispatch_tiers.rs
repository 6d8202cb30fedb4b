use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use docnum_printer::{PrintDispatcher, PrintError, PrintHost, PrintRange, PrintRequest, PrintResult};
use shared::{AttemptOutcome, Tier};

/// Host double that records every submission
#[derive(Default)]
struct RecordingHost {
    unselectable: HashSet<String>,
    rejecting: HashSet<String>,
    reject_manual: bool,
    fail_close: bool,
    active: Option<String>,
    submissions: Vec<(Option<String>, PrintRequest)>,
    closed: usize,
}

impl RecordingHost {
    fn submissions_to(&self, device: &str) -> usize {
        self.submissions
            .iter()
            .filter(|(target, _)| target.as_deref() == Some(device))
            .count()
    }
}

struct FakeDocument;

impl PrintHost for RecordingHost {
    type Document = FakeDocument;

    fn open_document(&mut self, _path: &Path) -> PrintResult<FakeDocument> {
        Ok(FakeDocument)
    }

    fn set_active_printer(&mut self, device: &str) -> PrintResult<()> {
        if self.unselectable.contains(device) {
            return Err(PrintError::SelectTarget {
                device: device.to_string(),
                message: "not installed".to_string(),
            });
        }
        self.active = Some(device.to_string());
        Ok(())
    }

    fn active_printer(&self) -> Option<String> {
        self.active.clone()
    }

    async fn print_out(&mut self, _document: &mut FakeDocument, request: &PrintRequest) -> PrintResult<()> {
        self.submissions.push((self.active.clone(), request.clone()));

        let rejected = match (&self.active, request.range) {
            (_, PrintRange::HostDefault) => self.reject_manual,
            (Some(active), _) => self.rejecting.contains(active),
            (None, _) => true,
        };
        if rejected {
            return Err(PrintError::Submission("printer offline".to_string()));
        }
        Ok(())
    }

    fn close_document(&mut self, _document: FakeDocument) -> PrintResult<()> {
        self.closed += 1;
        if self.fail_close {
            return Err(PrintError::Document("handle already released".to_string()));
        }
        Ok(())
    }
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn dispatcher() -> PrintDispatcher {
    PrintDispatcher::new().with_settle_delay(Duration::ZERO)
}

#[tokio::test]
async fn test_first_physical_printer_wins() {
    let mut host = RecordingHost::default();
    let physical = names(&["HP LaserJet", "Canon MX490"]);
    let all = names(&["HP LaserJet", "Canon MX490", "Fax"]);

    let report = dispatcher()
        .dispatch_detailed(&mut host, FakeDocument, &physical, &all)
        .await;

    assert!(report.success);
    assert_eq!(report.attempts.len(), 1);
    assert_eq!(host.submissions.len(), 1);
    assert_eq!(host.submissions_to("HP LaserJet"), 1);
    assert_eq!(host.submissions[0].1, PrintRequest::full_document());
    assert_eq!(host.closed, 1);
}

#[tokio::test]
async fn test_falls_through_to_second_tier() {
    let mut host = RecordingHost {
        rejecting: HashSet::from(["HP LaserJet".to_string()]),
        ..Default::default()
    };
    let physical = names(&["HP LaserJet"]);
    let all = names(&["HP LaserJet", "Microsoft Print to PDF", "Fax"]);

    let report = dispatcher()
        .dispatch_detailed(&mut host, FakeDocument, &physical, &all)
        .await;

    assert!(report.success);
    assert_eq!(host.submissions_to("Fax"), 1);
    assert_eq!(host.submissions_to("Microsoft Print to PDF"), 0);

    let accepted = report.accepted().unwrap();
    assert_eq!(accepted.tier, Tier::NonPdf);
    assert_eq!(accepted.device.as_deref(), Some("Fax"));
    assert_eq!(report.attempts_in(Tier::Manual).count(), 0);
    assert_eq!(host.closed, 1);
}

#[tokio::test]
async fn test_selection_error_moves_to_next_candidate() {
    let mut host = RecordingHost {
        unselectable: HashSet::from(["HP LaserJet".to_string()]),
        ..Default::default()
    };
    let physical = names(&["HP LaserJet", "Canon MX490"]);

    let report = dispatcher()
        .dispatch_detailed(&mut host, FakeDocument, &physical, &physical)
        .await;

    assert!(report.success);
    assert_eq!(report.attempts[0].outcome, AttemptOutcome::Failed);
    assert!(report.attempts[0].error.is_some());
    assert_eq!(host.submissions_to("Canon MX490"), 1);
    assert_eq!(host.submissions.len(), 1);
}

#[tokio::test]
async fn test_manual_attempt_when_no_devices() {
    let mut host = RecordingHost {
        active: Some("Default Printer".to_string()),
        ..Default::default()
    };

    let ok = dispatcher().dispatch(&mut host, FakeDocument, &[], &[]).await;

    assert!(ok);
    assert_eq!(host.submissions.len(), 1);
    assert_eq!(host.submissions[0].1.range, PrintRange::HostDefault);
    assert_eq!(host.closed, 1);
}

#[tokio::test]
async fn test_all_tiers_fail_and_document_is_closed() {
    let mut host = RecordingHost {
        rejecting: HashSet::from(["HP LaserJet".to_string(), "Fax".to_string()]),
        reject_manual: true,
        ..Default::default()
    };
    let physical = names(&["HP LaserJet"]);
    let all = names(&["HP LaserJet", "Fax"]);

    let report = dispatcher()
        .dispatch_detailed(&mut host, FakeDocument, &physical, &all)
        .await;

    assert!(!report.success);
    assert!(report.accepted().is_none());
    // tier 1: HP, tier 2: HP + Fax, tier 3: manual
    assert_eq!(report.attempts.len(), 4);
    assert_eq!(report.attempts_in(Tier::Manual).count(), 1);
    assert_eq!(host.closed, 1);
}

#[tokio::test]
async fn test_close_failure_does_not_change_result() {
    let mut host = RecordingHost {
        fail_close: true,
        ..Default::default()
    };
    let physical = names(&["Canon MX490"]);

    let ok = dispatcher()
        .dispatch(&mut host, FakeDocument, &physical, &physical)
        .await;

    assert!(ok);
    assert_eq!(host.closed, 1);
}
