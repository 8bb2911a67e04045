//! Leaf encoding for allocation records.
//!
//! A leaf is `keccak256(address || uint256_be(amount))`: the 20 raw address
//! bytes followed by the 32-byte big-endian, left-zero-padded amount. This is
//! what a Solidity verifier computes with
//! `keccak256(abi.encodePacked(account, amount))`.

use alloy_primitives::{Address, Keccak256, B256, U256};
use serde::{Deserialize, Serialize};

/// Byte length of an account address.
pub const ADDRESS_LEN: usize = 20;

/// Byte length of the hashed leaf preimage: address (20) + uint256 (32).
pub const LEAF_PREIMAGE_LEN: usize = ADDRESS_LEN + 32;

/// Errors from turning textual account data into leaf inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    #[error("invalid address {0:?}: not a hex string")]
    InvalidAddress(String),

    #[error("invalid address {input:?}: expected 20 bytes, got {len}")]
    AddressLength { input: String, len: usize },

    #[error("invalid amount {0:?}: not a decimal number")]
    InvalidAmount(String),

    #[error("negative amount {0:?}")]
    NegativeAmount(String),

    #[error("amount {0:?} does not fit in uint256")]
    AmountOverflow(String),

    #[error("amount {amount:?} has more than {decimals} fractional digits")]
    Precision { amount: String, decimals: u8 },
}

/// Hash of one allocation record; the input unit of the Merkle tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Leaf(pub B256);

impl Leaf {
    /// Encode a leaf from a textual address and a base-unit decimal amount.
    pub fn from_parts(address: &str, amount: &str) -> Result<Self, EncodingError> {
        let address = parse_address(address)?;
        let amount = parse_base_units(amount)?;
        Ok(encode_leaf(address, amount))
    }
}

impl From<B256> for Leaf {
    fn from(value: B256) -> Self {
        Self(value)
    }
}

impl From<Leaf> for B256 {
    fn from(value: Leaf) -> Self {
        value.0
    }
}

/// The exact 52 bytes that get hashed into a leaf.
pub fn leaf_preimage(address: &Address, amount: &U256) -> [u8; LEAF_PREIMAGE_LEN] {
    let mut preimage = [0u8; LEAF_PREIMAGE_LEN];
    preimage[..ADDRESS_LEN].copy_from_slice(address.as_slice());
    preimage[ADDRESS_LEN..].copy_from_slice(&amount.to_be_bytes::<32>());
    preimage
}

/// `keccak256(address || uint256_be(amount))`.
pub fn encode_leaf(address: Address, amount: U256) -> Leaf {
    let mut hasher = Keccak256::new();
    hasher.update(leaf_preimage(&address, &amount));
    Leaf(hasher.finalize())
}

/// Parse a hex account address, with or without `0x`, in any letter case.
///
/// Checksums are not enforced: mixed-case input is accepted as long as it
/// decodes to exactly 20 bytes.
pub fn parse_address(input: &str) -> Result<Address, EncodingError> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let bytes =
        hex::decode(digits).map_err(|_| EncodingError::InvalidAddress(input.to_string()))?;
    if bytes.len() != ADDRESS_LEN {
        return Err(EncodingError::AddressLength {
            input: input.to_string(),
            len: bytes.len(),
        });
    }
    Ok(Address::from_slice(&bytes))
}

/// Parse an amount already expressed in base units (a plain decimal integer).
pub fn parse_base_units(input: &str) -> Result<U256, EncodingError> {
    let trimmed = input.trim();
    if trimmed.starts_with('-') {
        return Err(EncodingError::NegativeAmount(input.to_string()));
    }
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(EncodingError::InvalidAmount(input.to_string()));
    }
    // Only digits reach this point, so a parse failure means the value is too wide.
    U256::from_str_radix(trimmed, 10)
        .map_err(|_| EncodingError::AmountOverflow(input.to_string()))
}
