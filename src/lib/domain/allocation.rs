use alloy_primitives::{utils::Unit, Address, U256};
use serde::{Deserialize, Serialize};

use super::leaf::{encode_leaf, parse_address, EncodingError, Leaf};

/// Decimals of an 18-decimal token ("ether" scaling).
pub const DEFAULT_DECIMALS: u8 = 18;

/// Largest scale whose unit (`10^77`) still fits in a uint256.
pub const MAX_DECIMALS: u8 = 77;

/// One whitelisted account and the amount it may claim, in base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AllocationRecord {
    pub address: Address,
    pub amount: U256,
}

impl AllocationRecord {
    pub fn new(address: Address, amount: U256) -> Self {
        Self { address, amount }
    }

    /// Validate one input row: a hex address and a human-readable amount
    /// scaled by `10^decimals`.
    pub fn parse(address: &str, amount: &str, decimals: u8) -> Result<Self, EncodingError> {
        Ok(Self {
            address: parse_address(address)?,
            amount: scale_amount(amount, decimals)?,
        })
    }

    /// The Merkle leaf committing to this record.
    pub fn leaf(&self) -> Leaf {
        encode_leaf(self.address, self.amount)
    }
}

/// Convert a human-readable decimal amount into base units.
///
/// `"1.5"` with 18 decimals becomes `1500000000000000000`. Fractional digits
/// beyond `decimals` are rejected rather than truncated, and every step is
/// checked so an oversized amount fails instead of wrapping.
pub fn scale_amount(input: &str, decimals: u8) -> Result<U256, EncodingError> {
    let trimmed = input.trim();
    if trimmed.starts_with('-') {
        return Err(EncodingError::NegativeAmount(input.to_string()));
    }

    let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    let well_formed = !(whole.is_empty() && fraction.is_empty())
        && whole.bytes().all(|b| b.is_ascii_digit())
        && fraction.bytes().all(|b| b.is_ascii_digit());
    if !well_formed {
        return Err(EncodingError::InvalidAmount(input.to_string()));
    }

    if Unit::new(decimals).is_none() || fraction.len() > decimals as usize {
        return Err(EncodingError::Precision {
            amount: input.to_string(),
            decimals,
        });
    }

    let overflow = || EncodingError::AmountOverflow(input.to_string());
    let unit = ten_pow(decimals as usize).ok_or_else(overflow)?;
    let whole = parse_digits(whole).ok_or_else(overflow)?;
    let fraction_scale = ten_pow(decimals as usize - fraction.len()).ok_or_else(overflow)?;
    let fraction = parse_digits(fraction)
        .and_then(|f| f.checked_mul(fraction_scale))
        .ok_or_else(overflow)?;

    whole
        .checked_mul(unit)
        .and_then(|scaled| scaled.checked_add(fraction))
        .ok_or_else(overflow)
}

fn parse_digits(digits: &str) -> Option<U256> {
    if digits.is_empty() {
        return Some(U256::ZERO);
    }
    U256::from_str_radix(digits, 10).ok()
}

fn ten_pow(exponent: usize) -> Option<U256> {
    U256::from(10u64).checked_pow(U256::from(exponent))
}
