//! Dated sequence numbers
//!
//! - [`CounterStore`] - durable per-day counters (JSON file or in-memory)
//! - [`SequenceAllocator`] - next identifier for a day

pub mod allocator;
pub mod store;

pub use allocator::{DEFAULT_START_NUMBER, SequenceAllocator};
pub use store::{CounterStore, JsonCounterStore, MemoryCounterStore, StoreError, StoreResult};
