//! Authenticated storage committed through a single root.
//!
//! This crate provides:
//!   - [`AuthenticatedTree`], a fixed-height binary merkle tree producing a root and per-leaf
//!     witnesses;
//!   - [`AuthenticatedMap`], a sparse key-value map addressed by hashed keys on top of the tree;
//!   - [`RootCommitment`], the protocol run by whoever holds only the root: it accepts updates
//!     carrying a witness and rejects those prepared against a superseded root.
//!
//! Pure verification lives in [`rootstore_core`] and is re-exported here, so an auditor can check
//! witnesses and replay updates without any of the stateful types.

#![warn(missing_docs)]

pub use rootstore_core::{
    hasher,
    index::KeyBinding,
    update::{verify_update, verify_update_at_height},
    Digest, EmptyDigests, Error, PathStep, Witness, EMPTY_LEAF, MAX_HEIGHT,
};

#[cfg(feature = "blake3-hasher")]
pub use rootstore_core::hasher::Blake3Hasher;
#[cfg(feature = "sha2-hasher")]
pub use rootstore_core::hasher::Sha2Hasher;

pub use commitment::{
    Commitment, CommitmentStore, FileStore, MemoryStore, RootCommitment, SharedRootCommitment,
    State, UpdateRequest,
};
pub use error::CommitError;
pub use map::AuthenticatedMap;
pub use options::Options;
pub use tree::AuthenticatedTree;

pub mod commitment;
mod error;
mod map;
mod options;
mod tree;
