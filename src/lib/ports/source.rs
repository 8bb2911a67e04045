use thiserror::Error;

use crate::domain::allocation::AllocationRecord;
use crate::domain::leaf::EncodingError;

/// Errors that can occur while loading allocation records.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read allocations: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: expected an address and an amount column")]
    MissingColumn { row: u64 },

    #[error("row {row}: {source}")]
    InvalidRecord {
        row: u64,
        #[source]
        source: EncodingError,
    },
}

/// Port supplying the validated allocation list for one run.
///
/// Every record is validated before it is returned, so the core never sees a
/// malformed address or amount. Order is significant: it becomes the leaf
/// order of the tree.
///
/// Implementations:
/// - `CsvAllocationSource` (address/amount CSV files)
/// - `MemoryAllocationSource` (for testing)
pub trait AllocationSource {
    fn load(&self) -> Result<Vec<AllocationRecord>, SourceError>;
}
