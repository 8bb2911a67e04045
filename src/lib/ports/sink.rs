use thiserror::Error;

use crate::domain::whitelist::WhitelistResult;

/// Errors that can occur while persisting or reading back a result.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Port consuming the finished `{merkleRoot, addresses}` result.
///
/// A write either stores the complete result or fails without leaving a
/// partial artifact behind.
///
/// Implementations:
/// - `JsonFileSink` (pretty-printed JSON file)
/// - `MemoryResultSink` (for testing)
pub trait ResultSink {
    fn write(&self, result: &WhitelistResult) -> Result<(), SinkError>;
}
