//! Sequence allocator
//!
//! Hands out `PREFIX-YYYYMMDD-NNN` identifiers from a per-day counter.
//! An identifier is consumed as soon as it is returned: nothing rolls the
//! counter back when a later step fails, so failed runs leave gaps.

use chrono::NaiveDate;
use shared::{CounterKey, CounterRecord, DEFAULT_NAMESPACE, DocumentIdentifier, util};
use tracing::info;

use super::store::{CounterStore, StoreResult};

/// Default first number of each day
pub const DEFAULT_START_NUMBER: u64 = 120;

/// Allocates dated sequence numbers from a [`CounterStore`]
pub struct SequenceAllocator<S> {
    store: S,
    namespace: String,
}

impl<S: CounterStore> SequenceAllocator<S> {
    pub fn new(store: S) -> Self {
        Self::with_namespace(store, DEFAULT_NAMESPACE)
    }

    pub fn with_namespace(store: S, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Allocate today's next identifier
    pub fn allocate(&mut self, prefix: &str, start_value: u64) -> StoreResult<(DocumentIdentifier, u64)> {
        self.allocate_on(util::today(), prefix, start_value)
    }

    /// Allocate the next identifier for `date`
    ///
    /// Read, format, then persist `current + 1` before returning.
    pub fn allocate_on(
        &mut self,
        date: NaiveDate,
        prefix: &str,
        start_value: u64,
    ) -> StoreResult<(DocumentIdentifier, u64)> {
        let key = CounterKey::new(self.namespace.as_str(), date);
        let record = self
            .store
            .get(&key)?
            .unwrap_or_else(|| CounterRecord::new(start_value));

        let number = record.current_number;
        let identifier = DocumentIdentifier::new(prefix, date, number);

        self.store.put(&key, record.advanced())?;
        info!(key = %key, identifier = %identifier, "Identifier allocated");

        Ok((identifier, number))
    }

    /// Number the next allocation for `date` would return, without consuming it
    pub fn peek_on(&self, date: NaiveDate, start_value: u64) -> StoreResult<u64> {
        let key = CounterKey::new(self.namespace.as_str(), date);
        Ok(self
            .store
            .get(&key)?
            .map_or(start_value, |record| record.current_number))
    }
}
