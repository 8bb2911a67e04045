use alloy_primitives::utils::format_units;
use alloy_primitives::U256;
use thiserror::Error;
use tracing::info;

use crate::adapters::csv_source::CsvAllocationSource;
use crate::adapters::json_sink::JsonFileSink;
use crate::config::{ConfigError, GeneratorConfig};
use crate::domain::allocation::DEFAULT_DECIMALS;
use crate::domain::merkle::{DuplicatePolicy, TreeError};
use crate::domain::whitelist::WhitelistResult;
use crate::ports::sink::{ResultSink, SinkError};
use crate::ports::source::{AllocationSource, SourceError};

/// Errors from one generator run. All of them abort the run before anything
/// is written.
#[derive(Debug, Error)]
pub enum WhitelistError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to load allocations: {0}")]
    Source(#[from] SourceError),

    #[error("failed to build merkle tree: {0}")]
    Tree(#[from] TreeError),

    #[error("failed to write result: {0}")]
    Sink(#[from] SinkError),
}

/// Drives one run: load allocations, commit to them, hand the result to the sink.
pub struct WhitelistGenerator<S, K> {
    source: S,
    sink: K,
    policy: DuplicatePolicy,
    decimals: u8,
}

impl<S: AllocationSource, K: ResultSink> WhitelistGenerator<S, K> {
    pub fn new(source: S, sink: K) -> Self {
        Self {
            source,
            sink,
            policy: DuplicatePolicy::default(),
            decimals: DEFAULT_DECIMALS,
        }
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Decimals used when logging totals in human-readable units.
    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn run(&self) -> Result<WhitelistResult, WhitelistError> {
        let records = self.source.load()?;

        let total = records
            .iter()
            .fold(U256::ZERO, |acc, record| acc.saturating_add(record.amount));
        info!(
            records = records.len(),
            total = %format_units(total, self.decimals).unwrap_or_else(|_| total.to_string()),
            "loaded allocations"
        );

        let result = WhitelistResult::generate(&records, self.policy)?;
        self.sink.write(&result)?;

        info!(
            root = %result.merkle_root,
            accounts = result.addresses.len(),
            "whitelist generated"
        );
        Ok(result)
    }
}

impl WhitelistGenerator<CsvAllocationSource, JsonFileSink> {
    /// CSV in, JSON out, as described by `config`. The config is validated
    /// first, so a struct built in code gets the same checks as a loaded file.
    pub fn from_config(config: &GeneratorConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let source = CsvAllocationSource::new(&config.input)
            .with_decimals(config.decimals)
            .with_headers(config.has_headers);
        let generator = Self::new(source, JsonFileSink::new(&config.output))
            .with_duplicate_policy(config.duplicates)
            .with_decimals(config.decimals);
        Ok(generator)
    }
}
