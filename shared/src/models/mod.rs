//! Data models
//!
//! Shared between docnum-printer and the docnum application.

pub mod counter;
pub mod device;
pub mod identifier;

// Re-exports
pub use counter::*;
pub use device::*;
pub use identifier::*;
