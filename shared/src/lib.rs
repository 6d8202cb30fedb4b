//! Shared types for docnum
//!
//! Data model used by both the printing crate and the application:
//! counter keys and records, document identifiers, device descriptors
//! and print attempts.

pub mod models;
pub mod util;

// Re-exports
pub use models::{
    AttemptOutcome, CounterKey, CounterRecord, DEFAULT_NAMESPACE, DEFAULT_PREFIX, DeviceClass,
    DeviceDescriptor, DocumentIdentifier, PrintAttempt, Tier, VIRTUAL_DEVICE_KEYWORDS,
    is_virtual_name, mentions_pdf,
};
pub use serde::{Deserialize, Serialize};
