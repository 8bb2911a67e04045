//! Merkle commitments over token allocation whitelists.
//!
//! The `domain` module holds the pure core (leaf encoding, sorted-pair tree,
//! proof generation and verification). `ports` and `adapters` move allocation
//! lists in and `{merkleRoot, addresses}` results out, and the
//! `WhitelistGenerator` in `pipeline` drives one run end to end.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod pipeline;
pub mod ports;
