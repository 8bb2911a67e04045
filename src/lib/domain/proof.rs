//! Inclusion proof generation and verification.
//!
//! A proof is the list of sibling hashes from the leaf up to (not including)
//! the root. Levels where the node was the odd one out contribute no sibling.
//! Verification folds the leaf through the siblings with the same sorted-pair
//! rule used to build the tree, so no direction bits are needed.

use alloy_primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use super::leaf::Leaf;
use super::merkle::{hash_sorted_pair, MerkleTree, TreeError};

/// A Merkle inclusion proof: the sibling path from leaf to root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// Sibling hashes, leaf level first.
    pub path: Vec<B256>,
    /// The leaf index the proof was generated for.
    pub leaf_index: usize,
}

impl MerkleProof {
    /// Verify that `leaf` is included in a tree with the given `root`.
    pub fn verify(&self, leaf: Leaf, root: B256) -> bool {
        verify_proof(leaf, &self.path, root)
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

/// Recompute the root by hashing `leaf` upward through `path`.
pub fn compute_root(leaf: Leaf, path: &[B256]) -> B256 {
    path.iter()
        .fold(leaf.0, |node, sibling| hash_sorted_pair(&node, sibling))
}

/// Check a proof against a published root.
///
/// Never fails: a malformed or foreign proof simply does not reproduce `root`.
pub fn verify_proof(leaf: Leaf, path: &[B256], root: B256) -> bool {
    compute_root(leaf, path) == root
}

impl MerkleTree {
    /// Generate an inclusion proof for the leaf at `leaf_index`.
    pub fn proof(&self, leaf_index: usize) -> Result<MerkleProof, TreeError> {
        let len = self.leaf_count();
        if leaf_index >= len {
            return Err(TreeError::IndexOutOfRange {
                index: leaf_index,
                len,
            });
        }

        let mut path = Vec::with_capacity(self.depth());
        let mut index = leaf_index;
        for level in &self.levels[..self.depth()] {
            // The last node of an odd level has no sibling.
            if let Some(sibling) = level.get(index ^ 1) {
                path.push(*sibling);
            }
            index /= 2;
        }

        Ok(MerkleProof { path, leaf_index })
    }

    /// Generate the proof for the leaf owned by `address`.
    pub fn proof_for_address(&self, address: &Address) -> Result<MerkleProof, TreeError> {
        let index = self
            .leaf_index_of(address)
            .ok_or(TreeError::UnknownAddress(*address))?;
        self.proof(index)
    }
}
