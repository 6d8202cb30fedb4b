//! Output Device Model

use std::fmt;

use serde::{Deserialize, Serialize};

/// Name fragments that mark a device as virtual (matched on the upper-cased name)
pub const VIRTUAL_DEVICE_KEYWORDS: &[&str] = &[
    "PDF", "FAX", "XPS", "MICROSOFT", "ONENOTE", "SEND TO", "VIRTUAL",
];

/// Physical/virtual classification of an output device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Physical,
    Virtual,
}

/// Discovered output device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub name: String,
    pub class: DeviceClass,
}

impl DeviceDescriptor {
    /// Classify a device by name
    pub fn classify(name: impl Into<String>) -> Self {
        let name = name.into();
        let class = if is_virtual_name(&name) {
            DeviceClass::Virtual
        } else {
            DeviceClass::Physical
        };
        Self { name, class }
    }

    pub fn is_physical(&self) -> bool {
        self.class == DeviceClass::Physical
    }
}

/// Whether a device name matches the virtual keyword denylist (case-insensitive)
pub fn is_virtual_name(name: &str) -> bool {
    let upper = name.to_uppercase();
    VIRTUAL_DEVICE_KEYWORDS.iter().any(|kw| upper.contains(kw))
}

/// Whether a device name contains "PDF" (case-insensitive)
pub fn mentions_pdf(name: &str) -> bool {
    name.to_uppercase().contains("PDF")
}

/// Stage of the dispatcher's escalating fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Physical devices in discovery order
    Physical,
    /// Every discovered device except PDF writers
    NonPdf,
    /// Whatever target the host currently has active
    Manual,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Tier::Physical => "tier 1 (physical)",
            Tier::NonPdf => "tier 2 (non-pdf)",
            Tier::Manual => "tier 3 (manual)",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptOutcome {
    Submitted,
    Failed,
}

/// One submission attempt made by the dispatcher. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintAttempt {
    pub tier: Tier,
    /// `None` for the manual tier (no explicit target)
    pub device: Option<String>,
    pub outcome: AttemptOutcome,
    pub error: Option<String>,
}

impl PrintAttempt {
    pub fn submitted(tier: Tier, device: Option<String>) -> Self {
        Self {
            tier,
            device,
            outcome: AttemptOutcome::Submitted,
            error: None,
        }
    }

    pub fn failed(tier: Tier, device: Option<String>, error: impl Into<String>) -> Self {
        Self {
            tier,
            device,
            outcome: AttemptOutcome::Failed,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome == AttemptOutcome::Submitted
    }
}
