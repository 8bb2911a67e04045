use std::sync::{Mutex, PoisonError};

use crate::domain::allocation::AllocationRecord;
use crate::domain::whitelist::WhitelistResult;
use crate::ports::sink::{ResultSink, SinkError};
use crate::ports::source::{AllocationSource, SourceError};

/// In-memory implementation of `AllocationSource` for testing and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryAllocationSource {
    records: Vec<AllocationRecord>,
}

impl MemoryAllocationSource {
    pub fn new(records: Vec<AllocationRecord>) -> Self {
        Self { records }
    }
}

impl AllocationSource for MemoryAllocationSource {
    fn load(&self) -> Result<Vec<AllocationRecord>, SourceError> {
        Ok(self.records.clone())
    }
}

/// In-memory implementation of `ResultSink`. Keeps the last written result.
#[derive(Debug, Default)]
pub struct MemoryResultSink {
    last: Mutex<Option<WhitelistResult>>,
}

impl MemoryResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently written result, if any.
    pub fn last(&self) -> Option<WhitelistResult> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ResultSink for MemoryResultSink {
    fn write(&self, result: &WhitelistResult) -> Result<(), SinkError> {
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(result.clone());
        Ok(())
    }
}
