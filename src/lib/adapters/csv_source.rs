use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use tracing::debug;

use crate::domain::allocation::{AllocationRecord, DEFAULT_DECIMALS};
use crate::ports::source::{AllocationSource, SourceError};

/// Reads `address,amount` rows from a CSV file.
///
/// Amounts are human-readable decimals scaled by `10^decimals`. The first
/// row is treated as a header unless disabled. Blank rows are skipped and
/// fields are trimmed; any other malformed row fails the whole load with its
/// line number.
#[derive(Debug, Clone)]
pub struct CsvAllocationSource {
    path: PathBuf,
    decimals: u8,
    has_headers: bool,
}

impl CsvAllocationSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            decimals: DEFAULT_DECIMALS,
            has_headers: true,
        }
    }

    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Parse allocation rows from any reader.
    pub fn parse_reader<R: Read>(&self, reader: R) -> Result<Vec<AllocationRecord>, SourceError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(self.has_headers)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            if row.iter().all(str::is_empty) {
                continue;
            }
            let line = row.position().map_or(0, |p| p.line());

            let (address, amount) = match (row.get(0), row.get(1)) {
                (Some(address), Some(amount)) => (address, amount),
                _ => return Err(SourceError::MissingColumn { row: line }),
            };
            let record = AllocationRecord::parse(address, amount, self.decimals)
                .map_err(|source| SourceError::InvalidRecord { row: line, source })?;
            records.push(record);
        }

        debug!(
            path = %self.path.display(),
            records = records.len(),
            "parsed allocation CSV"
        );
        Ok(records)
    }
}

impl AllocationSource for CsvAllocationSource {
    fn load(&self) -> Result<Vec<AllocationRecord>, SourceError> {
        let file = File::open(&self.path)?;
        self.parse_reader(file)
    }
}
