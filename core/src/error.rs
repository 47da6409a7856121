//! Errors raised by the tree schema and by update verification.

use crate::digest::Digest;

/// Errors of the core tree operations.
///
/// None of these leave partial state behind: an operation failing with any of them has had no
/// effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The tree height is outside `1..=MAX_HEIGHT`.
    #[error("invalid tree height {height}, must be in 1..={max}", max = crate::MAX_HEIGHT)]
    InvalidHeight {
        /// The rejected height.
        height: u8,
    },
    /// A node level above the root was addressed.
    #[error("level {level} out of range for a tree of height {height}")]
    LevelOutOfRange {
        /// The rejected level.
        level: u8,
        /// The height of the tree.
        height: u8,
    },
    /// A leaf or node index does not fit the tree.
    #[error("index {index} out of range for a level of height {height}")]
    IndexOutOfRange {
        /// The rejected index.
        index: u64,
        /// The height of the (sub)tree the index was checked against.
        height: u8,
    },
    /// The witness and old leaf do not reproduce the committed root.
    ///
    /// This is the expected outcome of losing an optimistic-concurrency race: refetch the root
    /// and witness, then retry.
    #[error("stale witness: committed root {committed}, witness derives {derived}")]
    StaleWitness {
        /// The root currently committed.
        committed: Digest,
        /// The root the witness and old leaf hash up to.
        derived: Digest,
    },
    /// A witness of the wrong length was supplied.
    #[error("witness height {actual} does not match tree height {expected}")]
    HeightMismatch {
        /// The height of the tree.
        expected: u8,
        /// The length of the supplied witness.
        actual: usize,
    },
}
