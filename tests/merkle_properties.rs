//! Property tests over arbitrary allocation lists.

use alloy_primitives::{Address, B256, U256};
use proptest::prelude::*;

use whitelist_merkle::domain::{
    allocation::AllocationRecord,
    leaf::Leaf,
    merkle::{hash_sorted_pair, DuplicatePolicy, MerkleTree},
    proof::verify_proof,
    whitelist::WhitelistResult,
};

fn record((address, amount): ([u8; 20], u128)) -> AllocationRecord {
    AllocationRecord::new(Address::from(address), U256::from(amount))
}

/// Up to 40 records with distinct addresses.
fn records() -> impl Strategy<Value = Vec<AllocationRecord>> {
    let entries = prop::collection::btree_map(any::<[u8; 20]>(), any::<u128>(), 1..40);
    entries.prop_map(|map| map.into_iter().map(record).collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn every_proof_verifies(records in records()) {
        let tree = MerkleTree::from_allocations(&records, DuplicatePolicy::Reject).unwrap();
        let root = tree.root();

        for (index, record) in records.iter().enumerate() {
            let proof = tree.proof(index).unwrap();
            prop_assert!(proof.len() <= tree.depth());
            prop_assert!(verify_proof(record.leaf(), &proof.path, root));
        }
    }

    #[test]
    fn flipped_proof_byte_fails(
        records in records(),
        pick in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        prop_assume!(records.len() > 1);
        let tree = MerkleTree::from_allocations(&records, DuplicatePolicy::Reject).unwrap();
        let index = pick.index(records.len());
        let mut path = tree.proof(index).unwrap().path;
        prop_assume!(!path.is_empty());

        path[0].0[31] ^= 1 << bit;
        prop_assert!(!verify_proof(records[index].leaf(), &path, tree.root()));
    }

    #[test]
    fn wrong_amount_fails(records in records(), pick in any::<prop::sample::Index>()) {
        let tree = MerkleTree::from_allocations(&records, DuplicatePolicy::Reject).unwrap();
        let index = pick.index(records.len());
        let record = records[index];
        let proof = tree.proof(index).unwrap();

        let amount = record.amount + U256::from(1u64);
        let inflated = AllocationRecord::new(record.address, amount);
        prop_assert!(!verify_proof(inflated.leaf(), &proof.path, tree.root()));
    }

    #[test]
    fn pair_hash_is_symmetric(a in any::<[u8; 32]>(), b in any::<[u8; 32]>()) {
        let (a, b) = (B256::from(a), B256::from(b));
        prop_assert_eq!(hash_sorted_pair(&a, &b), hash_sorted_pair(&b, &a));
    }

    #[test]
    fn generation_is_deterministic(records in records()) {
        let first = WhitelistResult::generate(&records, DuplicatePolicy::Reject).unwrap();
        let second = WhitelistResult::generate(&records, DuplicatePolicy::Reject).unwrap();
        prop_assert_eq!(
            serde_json::to_string_pretty(&first).unwrap(),
            serde_json::to_string_pretty(&second).unwrap()
        );
    }

    #[test]
    fn leaf_tree_matches_allocation_tree(records in records()) {
        let leaves: Vec<Leaf> = records.iter().map(AllocationRecord::leaf).collect();
        let from_leaves = MerkleTree::from_leaves(&leaves).unwrap();
        let from_records = MerkleTree::from_allocations(&records, DuplicatePolicy::Reject).unwrap();
        prop_assert_eq!(from_leaves.root(), from_records.root());
        prop_assert_eq!(from_leaves.leaf_count(), records.len());
    }
}
