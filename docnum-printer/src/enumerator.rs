//! Device enumeration
//!
//! Runs every probe in order, unions their results and classifies the
//! union into physical and virtual devices. Nothing is cached: device
//! availability changes between a diagnostic listing and a print attempt,
//! so every call re-probes.

use std::collections::HashSet;
use std::time::Duration;

use shared::DeviceDescriptor;
use tracing::{info, instrument, warn};

use crate::probe::{DeviceProbe, ProbeRole, platform_probes};

/// Result of a single probe pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceSnapshot {
    /// Every discovered device, deduplicated, in discovery order
    pub all: Vec<String>,
    /// Devices that are not virtual, in discovery order
    pub physical: Vec<String>,
}

impl DeviceSnapshot {
    pub fn from_all(all: Vec<String>) -> Self {
        let physical = physical_only(&all);
        Self { all, physical }
    }

    pub fn descriptors(&self) -> Vec<DeviceDescriptor> {
        self.all.iter().map(DeviceDescriptor::classify).collect()
    }

    /// Device the first dispatch tier will try first
    pub fn preferred(&self) -> Option<&str> {
        self.physical
            .first()
            .or_else(|| self.all.first())
            .map(String::as_str)
    }
}

/// Keep devices whose names match no virtual keyword
pub fn physical_only(all: &[String]) -> Vec<String> {
    all.iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(DeviceDescriptor::classify)
        .filter(DeviceDescriptor::is_physical)
        .map(|device| device.name)
        .collect()
}

/// Device enumerator over an ordered list of probes
pub struct DeviceEnumerator {
    probes: Vec<Box<dyn DeviceProbe>>,
}

impl DeviceEnumerator {
    pub fn new(probes: Vec<Box<dyn DeviceProbe>>) -> Self {
        Self { probes }
    }

    /// Enumerator with the probes for the current platform
    pub fn for_platform(probe_timeout: Duration) -> Self {
        Self::new(platform_probes(probe_timeout))
    }

    /// Union of all source probes
    ///
    /// A failing probe counts as "no devices" and never aborts the pass.
    #[instrument(skip(self), fields(probes = self.probes.len()))]
    pub async fn enumerate_all(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut devices = Vec::new();

        for probe in &self.probes {
            let names = match probe.probe().await {
                Ok(names) => names,
                Err(e) => {
                    warn!(probe = probe.name(), error = %e, "Probe failed, no devices from it");
                    continue;
                }
            };

            if probe.role() == ProbeRole::Informational {
                info!(probe = probe.name(), reported = ?names, "Informational probe completed");
                continue;
            }

            let mut added = 0usize;
            for name in names {
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }
                if seen.insert(name.to_string()) {
                    devices.push(name.to_string());
                    added += 1;
                }
            }
            info!(probe = probe.name(), added, "Probe completed");
        }

        devices
    }

    /// Non-virtual devices, in discovery order
    pub async fn enumerate_physical(&self) -> Vec<String> {
        physical_only(&self.enumerate_all().await)
    }

    /// Probe once and return both views
    pub async fn snapshot(&self) -> DeviceSnapshot {
        DeviceSnapshot::from_all(self.enumerate_all().await)
    }
}
