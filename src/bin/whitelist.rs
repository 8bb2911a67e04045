//! whitelist: Merkle root and per-account proofs for token allocations.
//!
//! Usage:
//!   whitelist generate --input whitelist.csv --output whitelist.json
//!   whitelist generate --config whitelist.toml
//!
//!   whitelist verify --result whitelist.json --address 0x...
//!   whitelist proof --result whitelist.json --address 0x...
//!
//! Set `RUST_LOG=debug` for tree-shape logging.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use whitelist_merkle::adapters::json_sink::load_result;
use whitelist_merkle::config::{ConfigOverrides, GeneratorConfig};
use whitelist_merkle::domain::leaf::parse_address;
use whitelist_merkle::domain::whitelist::WhitelistResult;
use whitelist_merkle::pipeline::WhitelistGenerator;

#[derive(Parser)]
#[command(name = "whitelist")]
#[command(about = "Merkle root and inclusion proofs for token allocation whitelists")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the tree from an allocation CSV and write root + proofs as JSON
    Generate {
        /// TOML config file; flags below override its values
        #[arg(long)]
        config: Option<PathBuf>,

        /// Allocation CSV (address,amount)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Output JSON path
        #[arg(long)]
        output: Option<PathBuf>,

        /// Token decimals used to scale amounts (default: 18)
        #[arg(long)]
        decimals: Option<u8>,

        /// Keep the first entry of a repeated address instead of failing
        #[arg(long)]
        keep_first_duplicates: bool,
    },

    /// Check an address's stored proof against the stored root
    Verify {
        /// Result JSON written by `generate`
        #[arg(long)]
        result: PathBuf,

        /// Account address (hex)
        #[arg(long)]
        address: String,
    },

    /// Print the stored proof and allocation for an address
    Proof {
        /// Result JSON written by `generate`
        #[arg(long)]
        result: PathBuf,

        /// Account address (hex)
        #[arg(long)]
        address: String,
    },
}

fn read_result(path: &Path) -> Result<WhitelistResult> {
    load_result(path).with_context(|| format!("reading {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            config,
            input,
            output,
            decimals,
            keep_first_duplicates,
        } => {
            let base = match config {
                Some(path) => GeneratorConfig::load(&path)
                    .with_context(|| format!("loading {}", path.display()))?,
                None => GeneratorConfig::default(),
            };
            let config = base.with_overrides(ConfigOverrides {
                input,
                output,
                decimals,
                keep_first_duplicates,
            })?;

            info!(
                input = %config.input.display(),
                output = %config.output.display(),
                "generating whitelist"
            );
            let result = WhitelistGenerator::from_config(&config)?.run()?;
            println!("Merkle Root: {}", result.merkle_root);
        }

        Commands::Verify { result, address } => {
            let whitelist = read_result(&result)?;
            let account = parse_address(&address)?;

            let Some(entry) = whitelist.entry(&account) else {
                bail!("{address} is not in {}", result.display());
            };
            if !entry.verify(&account, whitelist.merkle_root)? {
                bail!(
                    "proof for {address} does not match root {}",
                    whitelist.merkle_root
                );
            }
            println!(
                "OK: {address} allocation {} verifies against {}",
                entry.allocation, whitelist.merkle_root
            );
        }

        Commands::Proof { result, address } => {
            let whitelist = read_result(&result)?;
            let account = parse_address(&address)?;

            let Some(entry) = whitelist.entry(&account) else {
                bail!("{address} is not in {}", result.display());
            };
            println!("{}", serde_json::to_string_pretty(entry)?);
        }
    }

    Ok(())
}
