//! The persisted `{merkleRoot, addresses}` artifact.

use std::collections::BTreeMap;

use alloy_primitives::{Address, B256};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::allocation::AllocationRecord;
use super::leaf::{encode_leaf, parse_base_units, EncodingError};
use super::merkle::{DuplicatePolicy, MerkleTree, TreeError};
use super::proof::verify_proof;

/// Per-account entry: the proof and the allocation it proves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressEntry {
    /// Sibling hashes, leaf to root.
    pub proofs: Vec<B256>,
    /// Allocation in base units, as a decimal string.
    pub allocation: String,
}

impl AddressEntry {
    /// Recompute the leaf for `address` from this entry and check it against `root`.
    pub fn verify(&self, address: &Address, root: B256) -> Result<bool, EncodingError> {
        let amount = parse_base_units(&self.allocation)?;
        let leaf = encode_leaf(*address, amount);
        Ok(verify_proof(leaf, &self.proofs, root))
    }
}

/// Result of one whitelist run, keyed by lower-case `0x` address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhitelistResult {
    pub merkle_root: B256,
    pub addresses: BTreeMap<String, AddressEntry>,
}

impl WhitelistResult {
    /// Build the tree over `records` and extract one proof per indexed address.
    pub fn generate(
        records: &[AllocationRecord],
        policy: DuplicatePolicy,
    ) -> Result<Self, TreeError> {
        let tree = MerkleTree::from_allocations(records, policy)?;

        let addresses = tree
            .indexed_addresses()
            .into_par_iter()
            .map(|(address, index)| {
                let key = address_key(&address);
                address_entry(&tree, records, index).map(|entry| (key, entry))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(Self {
            merkle_root: tree.root(),
            addresses,
        })
    }

    /// Entry for `address`, if it is in the whitelist.
    pub fn entry(&self, address: &Address) -> Option<&AddressEntry> {
        self.addresses.get(&address_key(address))
    }

    /// Check the stored proof of `address` against the stored root.
    ///
    /// Returns `Ok(false)` for addresses that are not in the whitelist.
    pub fn verify_entry(&self, address: &Address) -> Result<bool, EncodingError> {
        match self.entry(address) {
            Some(entry) => entry.verify(address, self.merkle_root),
            None => Ok(false),
        }
    }
}

fn address_entry(
    tree: &MerkleTree,
    records: &[AllocationRecord],
    index: usize,
) -> Result<AddressEntry, TreeError> {
    let proof = tree.proof(index)?;
    Ok(AddressEntry {
        proofs: proof.path,
        allocation: records[index].amount.to_string(),
    })
}

/// Lower-case `0x`-prefixed hex form of an address, as used for result keys.
pub fn address_key(address: &Address) -> String {
    format!("0x{}", hex::encode(address))
}
