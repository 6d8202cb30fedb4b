//! Print dispatcher
//!
//! Delivers an open document to a printer through three escalating tiers:
//!
//! 1. Physical devices, in discovery order
//! 2. Every discovered device except PDF writers
//! 3. The host's currently active target, without selecting one
//!
//! Each tier is an [`AttemptPlan`]; one loop walks the plans and stops at
//! the first submission that returns without error. "Success" only means
//! the host accepted the job. Whether paper came out is left to the print
//! queue.

use std::time::Duration;

use shared::{PrintAttempt, Tier, mentions_pdf};
use tracing::{error, info, instrument, warn};

use crate::enumerator::DeviceEnumerator;
use crate::host::{PrintHost, PrintRequest};

/// Pause after the decision so the host can start spooling
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(3);

/// Target of a single attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// Select this device, then submit
    Device(String),
    /// Submit to whatever the host has active
    ActiveTarget,
}

/// One tier: its candidates in the order they are tried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptPlan {
    pub tier: Tier,
    pub candidates: Vec<Candidate>,
}

impl AttemptPlan {
    /// Build the three tiers from enumeration output
    pub fn tiers(physical: &[String], all: &[String]) -> Vec<AttemptPlan> {
        let physical = physical
            .iter()
            .cloned()
            .map(Candidate::Device)
            .collect();

        let non_pdf = all
            .iter()
            .filter(|name| !mentions_pdf(name))
            .cloned()
            .map(Candidate::Device)
            .collect();

        vec![
            AttemptPlan {
                tier: Tier::Physical,
                candidates: physical,
            },
            AttemptPlan {
                tier: Tier::NonPdf,
                candidates: non_pdf,
            },
            AttemptPlan {
                tier: Tier::Manual,
                candidates: vec![Candidate::ActiveTarget],
            },
        ]
    }
}

/// Outcome of a dispatch, with every attempt made
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub success: bool,
    pub attempts: Vec<PrintAttempt>,
}

impl DispatchReport {
    /// The attempt that succeeded, if any
    pub fn accepted(&self) -> Option<&PrintAttempt> {
        self.attempts.iter().find(|a| a.is_success())
    }

    pub fn attempts_in(&self, tier: Tier) -> impl Iterator<Item = &PrintAttempt> {
        self.attempts.iter().filter(move |a| a.tier == tier)
    }
}

/// Tiered print dispatcher
#[derive(Debug, Clone)]
pub struct PrintDispatcher {
    settle_delay: Duration,
}

impl PrintDispatcher {
    pub fn new() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    /// Set the post-dispatch settling interval
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Dispatch and report only whether a submission was accepted
    pub async fn dispatch<H: PrintHost>(
        &self,
        host: &mut H,
        document: H::Document,
        physical: &[String],
        all: &[String],
    ) -> bool {
        self.dispatch_detailed(host, document, physical, all)
            .await
            .success
    }

    /// Re-enumerate devices, then dispatch
    pub async fn dispatch_fresh<H: PrintHost>(
        &self,
        enumerator: &DeviceEnumerator,
        host: &mut H,
        document: H::Document,
    ) -> DispatchReport {
        let snapshot = enumerator.snapshot().await;
        self.dispatch_detailed(host, document, &snapshot.physical, &snapshot.all)
            .await
    }

    /// Walk the tiers until a submission is accepted
    ///
    /// The document handle is always closed before returning; a failing
    /// close is logged and does not change the result.
    #[instrument(skip_all, fields(physical = physical.len(), all = all.len()))]
    pub async fn dispatch_detailed<H: PrintHost>(
        &self,
        host: &mut H,
        mut document: H::Document,
        physical: &[String],
        all: &[String],
    ) -> DispatchReport {
        let mut attempts = Vec::new();
        let mut success = false;

        'tiers: for plan in AttemptPlan::tiers(physical, all) {
            if plan.candidates.is_empty() {
                info!(tier = %plan.tier, "No candidates, skipping tier");
                continue;
            }

            info!(tier = %plan.tier, candidates = plan.candidates.len(), "Entering tier");
            for candidate in plan.candidates {
                let attempt = Self::attempt(host, &mut document, plan.tier, candidate).await;
                let accepted = attempt.is_success();
                attempts.push(attempt);
                if accepted {
                    success = true;
                    break 'tiers;
                }
            }
            warn!(tier = %plan.tier, "Tier exhausted");
        }

        if success {
            info!("Print job accepted, check the print queue");
        } else {
            error!(attempts = attempts.len(), "All print tiers failed");
        }

        info!(delay_ms = self.settle_delay.as_millis() as u64, "Waiting for spooler");
        tokio::time::sleep(self.settle_delay).await;

        if let Err(e) = host.close_document(document) {
            warn!(error = %e, "Failed to close document, ignoring");
        }

        DispatchReport { success, attempts }
    }

    async fn attempt<H: PrintHost>(
        host: &mut H,
        document: &mut H::Document,
        tier: Tier,
        candidate: Candidate,
    ) -> PrintAttempt {
        match candidate {
            Candidate::Device(device) => {
                info!(%tier, device = %device, "Attempting printer");
                let result = match host.set_active_printer(&device) {
                    Ok(()) => host.print_out(document, &PrintRequest::full_document()).await,
                    Err(e) => Err(e),
                };

                match result {
                    Ok(()) => {
                        info!(device = %device, "Sent to printer");
                        PrintAttempt::submitted(tier, Some(device))
                    }
                    Err(e) => {
                        warn!(device = %device, error = %e, "Printer failed, trying next");
                        PrintAttempt::failed(tier, Some(device), e.to_string())
                    }
                }
            }
            Candidate::ActiveTarget => {
                let active = host.active_printer();
                info!(%tier, active = ?active, "Automatic print failed, manual attempt");

                match host.print_out(document, &PrintRequest::host_default()).await {
                    Ok(()) => {
                        info!("Manual print sent");
                        PrintAttempt::submitted(tier, None)
                    }
                    Err(e) => {
                        error!(error = %e, "Manual print failed");
                        PrintAttempt::failed(tier, None, e.to_string())
                    }
                }
            }
        }
    }
}

impl Default for PrintDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
