//! Sorted-pair keccak-256 Merkle tree over allocation leaves.
//!
//! Each parent is `keccak256(min(a, b) || max(a, b))`, comparing the two
//! children as big-endian integers. A verifier therefore never needs to know
//! whether its node was the left or right child. When a level has an odd
//! number of nodes, the last one is promoted to the next level unchanged.
//!
//! This is the pairing rule of OpenZeppelin's `MerkleProof.verify`.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use alloy_primitives::{Address, Keccak256, B256};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::allocation::AllocationRecord;
use super::leaf::Leaf;

/// Errors from building or querying a [`MerkleTree`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("cannot build a Merkle tree from zero leaves")]
    EmptyInput,

    #[error("duplicate address {address} at leaf {first} and leaf {duplicate}")]
    DuplicateAddress {
        address: Address,
        first: usize,
        duplicate: usize,
    },

    #[error("leaf index {index} out of range for a tree of {len} leaves")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("address {0} is not in the tree")]
    UnknownAddress(Address),
}

/// What to do when the same address appears more than once in the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Fail the whole build.
    #[default]
    Reject,
    /// The first occurrence owns the address. Later duplicates stay in the
    /// tree as leaves but cannot be looked up by address.
    KeepFirst,
}

/// Hash two nodes into their parent, ordering them by value first.
pub fn hash_sorted_pair(a: &B256, b: &B256) -> B256 {
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    let mut hasher = Keccak256::new();
    hasher.update(low);
    hasher.update(high);
    hasher.finalize()
}

fn parent_level(level: &[B256]) -> Vec<B256> {
    level
        .chunks(2)
        .map(|pair| match pair.get(1) {
            Some(right) => hash_sorted_pair(&pair[0], right),
            // Odd node out: promoted as is.
            None => pair[0],
        })
        .collect()
}

/// A fully built tree. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    /// `levels[0]` holds the leaves in input order; the last level holds only the root.
    pub(crate) levels: Vec<Vec<B256>>,
    /// Leaf index owned by each address.
    index: HashMap<Address, usize>,
}

impl MerkleTree {
    /// Build a tree from leaves in their canonical order.
    ///
    /// Duplicate leaf values are kept. The resulting tree has no address index.
    pub fn from_leaves(leaves: &[Leaf]) -> Result<Self, TreeError> {
        let leaves = leaves.iter().copied().map(B256::from).collect();
        Self::build(leaves, HashMap::new())
    }

    /// Build a tree from allocation records, indexing each address to its leaf.
    pub fn from_allocations(
        records: &[AllocationRecord],
        policy: DuplicatePolicy,
    ) -> Result<Self, TreeError> {
        if records.is_empty() {
            return Err(TreeError::EmptyInput);
        }
        // Duplicates fail before any hashing.
        let index = index_addresses(records, policy)?;
        let leaves = records.par_iter().map(|record| record.leaf().0).collect();
        Self::build(leaves, index)
    }

    fn build(leaves: Vec<B256>, index: HashMap<Address, usize>) -> Result<Self, TreeError> {
        if leaves.is_empty() {
            return Err(TreeError::EmptyInput);
        }

        let mut levels = vec![leaves];
        loop {
            let current = &levels[levels.len() - 1];
            if current.len() == 1 {
                break;
            }
            let next = parent_level(current);
            levels.push(next);
        }

        debug!(
            leaves = levels[0].len(),
            depth = levels.len() - 1,
            "built merkle tree"
        );
        Ok(Self { levels, index })
    }

    /// The Merkle root.
    pub fn root(&self) -> B256 {
        self.levels[self.levels.len() - 1][0]
    }

    /// Number of leaves, duplicates included.
    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Number of hashing levels between the leaves and the root.
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    /// All levels, leaves first and root last.
    pub fn levels(&self) -> &[Vec<B256>] {
        &self.levels
    }

    /// The leaf at `index`, if any.
    pub fn leaf(&self, index: usize) -> Option<Leaf> {
        self.levels[0].get(index).copied().map(Leaf::from)
    }

    /// Position of the first leaf equal to `leaf`.
    pub fn position_of_leaf(&self, leaf: &Leaf) -> Option<usize> {
        self.levels[0]
            .iter()
            .position(|candidate| *candidate == leaf.0)
    }

    /// Leaf index owned by `address`.
    pub fn leaf_index_of(&self, address: &Address) -> Option<usize> {
        self.index.get(address).copied()
    }

    /// Every indexed address with its leaf index, in leaf order.
    pub fn indexed_addresses(&self) -> Vec<(Address, usize)> {
        let mut entries: Vec<_> = self.index.iter().map(|(a, i)| (*a, *i)).collect();
        entries.sort_unstable_by_key(|(_, i)| *i);
        entries
    }
}

fn index_addresses(
    records: &[AllocationRecord],
    policy: DuplicatePolicy,
) -> Result<HashMap<Address, usize>, TreeError> {
    let mut index = HashMap::with_capacity(records.len());

    for (position, record) in records.iter().enumerate() {
        match index.entry(record.address) {
            Entry::Vacant(slot) => {
                slot.insert(position);
            }
            Entry::Occupied(existing) => match policy {
                DuplicatePolicy::Reject => {
                    return Err(TreeError::DuplicateAddress {
                        address: record.address,
                        first: *existing.get(),
                        duplicate: position,
                    });
                }
                DuplicatePolicy::KeepFirst => {
                    warn!(
                        address = %record.address,
                        first = *existing.get(),
                        duplicate = position,
                        "duplicate address, keeping first occurrence"
                    );
                }
            },
        }
    }

    Ok(index)
}
