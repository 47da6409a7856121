use rootstore_core::Digest;

/// Errors of the root commitment protocol.
///
/// A failed operation never changes the committed root.
#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    /// The tree height is outside `1..=MAX_HEIGHT`.
    #[error("invalid tree height {height}")]
    InvalidHeight {
        /// The rejected height.
        height: u8,
    },
    /// `initialize` was called on a protocol that already holds a root.
    #[error("root commitment already initialized")]
    AlreadyInitialized,
    /// An update or query was made before `initialize`.
    #[error("root commitment not initialized")]
    NotInitialized,
    /// The update was prepared against a root that is no longer committed.
    ///
    /// Recoverable: refetch the root and witness and retry.
    #[error("stale witness: committed root {committed}, update derives {derived}")]
    StaleWitness {
        /// The root currently committed.
        committed: Digest,
        /// The root the update was prepared against.
        derived: Digest,
    },
    /// The witness does not span the height of the committed tree.
    #[error("witness height {actual} does not match tree height {expected}")]
    HeightMismatch {
        /// The height of the tree.
        expected: u8,
        /// The length of the supplied witness.
        actual: usize,
    },
    /// The version counter cannot be incremented any further.
    #[error("root commitment version exhausted")]
    VersionExhausted,
    /// The commitment storage failed.
    #[error("commitment storage failure")]
    Store(#[source] anyhow::Error),
}

impl CommitError {
    /// Whether this error signals a lost optimistic-concurrency race, to be handled by retrying.
    pub fn is_stale(&self) -> bool {
        matches!(self, CommitError::StaleWitness { .. })
    }
}
