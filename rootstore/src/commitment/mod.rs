//! The root commitment protocol.
//!
//! A [`RootCommitment`] is what a trust-minimized authority runs: it holds a single committed
//! root and nothing else about the tree. It is initialized once, and afterwards changes only
//! through updates that prove they were prepared against the root currently committed.
//!
//! Updates are a compare-and-swap. Any number of parties may prepare updates against the root
//! they observed; the first valid one to arrive replaces the root, and every other update
//! prepared against the same root fails with [`CommitError::StaleWitness`] and must be rebuilt
//! against the new root. There is no locking between writers, no timeout and no retry policy
//! here.
//!
//! ```text
//!   Uninitialized --initialize--> Committed --update--> Committed ...
//! ```

use core::marker::PhantomData;
use std::sync::Arc;

use parking_lot::Mutex;
use rootstore_core::{
    hasher::TreeHash, trie, update::verify_update_at_height, Digest, Witness,
};

use crate::error::CommitError;

pub use self::store::{Commitment, CommitmentStore, FileStore, MemoryStore, COMMITMENT_LEN};

pub mod store;

/// The externally visible state of a [`RootCommitment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// No root has been committed yet.
    Uninitialized,
    /// A root is committed. Every successful update stays in this state.
    Committed,
}

/// An update submitted to a [`RootCommitment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateRequest {
    /// Replace one leaf, proven by its witness against the committed root.
    Witnessed {
        /// The authentication path of the leaf.
        witness: Witness,
        /// The leaf value the witness was taken for.
        old_leaf: Digest,
        /// The leaf value to install.
        new_leaf: Digest,
    },
    /// Replace the root outright, provided the committed root is still `expected_root`.
    ///
    /// Nothing here checks how `new_root` was derived. Use only when the caller's derivation of
    /// the new root is verified elsewhere.
    RootOnly {
        /// The root the caller observed.
        expected_root: Digest,
        /// The root to commit.
        new_root: Digest,
    },
}

/// Holds a single committed root and applies proof-carrying updates to it.
///
/// The commitment is bound to a tree height: every witness must have exactly one step per level,
/// so an update always replaces a single leaf.
pub struct RootCommitment<H, S = MemoryStore> {
    store: S,
    current: Option<Commitment>,
    height: u8,
    _marker: PhantomData<H>,
}

impl<H: TreeHash> RootCommitment<H, MemoryStore> {
    /// Create an uninitialized commitment for a tree of `height`, kept in memory.
    ///
    /// Fails with [`CommitError::InvalidHeight`] if `height` is outside `1..=MAX_HEIGHT`.
    pub fn new(height: u8) -> Result<Self, CommitError> {
        Self::open(MemoryStore::new(), height)
    }
}

impl<H: TreeHash, S: CommitmentStore> RootCommitment<H, S> {
    /// Open a commitment for a tree of `height`, backed by `store`.
    ///
    /// If the store already holds a commitment, the protocol resumes in [`State::Committed`].
    pub fn open(store: S, height: u8) -> Result<Self, CommitError> {
        trie::check_height(height).map_err(|_| CommitError::InvalidHeight { height })?;
        let current = store.load().map_err(CommitError::Store)?;
        if let Some(ref c) = current {
            tracing::info!(root = %c.root, version = c.version, height, "resumed root commitment");
        }
        Ok(RootCommitment {
            store,
            current,
            height,
            _marker: PhantomData,
        })
    }

    /// The height of the committed tree.
    pub fn height(&self) -> u8 {
        self.height
    }

    /// The current state.
    pub fn state(&self) -> State {
        match self.current {
            None => State::Uninitialized,
            Some(_) => State::Committed,
        }
    }

    /// The committed root and its version, if initialized.
    pub fn commitment(&self) -> Option<Commitment> {
        self.current
    }

    /// The committed root.
    pub fn committed_root(&self) -> Result<Digest, CommitError> {
        self.current
            .map(|c| c.root)
            .ok_or(CommitError::NotInitialized)
    }

    /// The number of updates applied since initialization.
    pub fn version(&self) -> Result<u64, CommitError> {
        self.current
            .map(|c| c.version)
            .ok_or(CommitError::NotInitialized)
    }

    /// The backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Commit the initial root.
    ///
    /// Fails with [`CommitError::AlreadyInitialized`] if a root is already committed.
    pub fn initialize(&mut self, initial_root: Digest) -> Result<(), CommitError> {
        if self.current.is_some() {
            return Err(CommitError::AlreadyInitialized);
        }
        let commitment = Commitment {
            root: initial_root,
            version: 0,
        };
        self.store
            .store(&commitment)
            .map_err(CommitError::Store)?;
        self.current = Some(commitment);
        tracing::info!(root = %initial_root, "initialized root commitment");
        Ok(())
    }

    /// Replace `old_leaf` with `new_leaf` at the position described by `witness`, returning the
    /// new root.
    ///
    /// The witness must span exactly [`RootCommitment::height`] levels, otherwise this fails with
    /// [`CommitError::HeightMismatch`]. The witness applied to `old_leaf` must reproduce the
    /// committed root, otherwise this fails with [`CommitError::StaleWitness`]. Nothing changes
    /// on failure.
    pub fn update(
        &mut self,
        witness: &Witness,
        old_leaf: Digest,
        new_leaf: Digest,
    ) -> Result<Digest, CommitError> {
        let current = self.current.ok_or(CommitError::NotInitialized)?;
        let new_root = match verify_update_at_height::<H>(
            self.height,
            current.root,
            witness,
            old_leaf,
            new_leaf,
        ) {
            Ok(root) => root,
            Err(rootstore_core::Error::HeightMismatch { expected, actual }) => {
                tracing::warn!(expected, actual, "rejected witness of wrong height");
                return Err(CommitError::HeightMismatch { expected, actual });
            }
            Err(rootstore_core::Error::StaleWitness { committed, derived }) => {
                tracing::warn!(
                    %committed,
                    %derived,
                    index = witness.calculate_index(),
                    "rejected stale update"
                );
                return Err(CommitError::StaleWitness { committed, derived });
            }
            Err(e) => unreachable!("update verification only reports height and staleness: {e}"),
        };
        self.commit(current, new_root)
    }

    /// Replace the committed root with `new_root` if it is still `expected_root`, returning the
    /// new root.
    ///
    /// This proves nothing about how `new_root` relates to the committed one. It is only sound when
    /// the caller's computation of `new_root` is verified independently.
    pub fn update_by_root_only(
        &mut self,
        expected_root: Digest,
        new_root: Digest,
    ) -> Result<Digest, CommitError> {
        let current = self.current.ok_or(CommitError::NotInitialized)?;
        if current.root != expected_root {
            tracing::warn!(committed = %current.root, expected = %expected_root, "rejected stale root update");
            return Err(CommitError::StaleWitness {
                committed: current.root,
                derived: expected_root,
            });
        }
        self.commit(current, new_root)
    }

    /// Apply an [`UpdateRequest`], returning the new root.
    pub fn apply(&mut self, request: &UpdateRequest) -> Result<Digest, CommitError> {
        match request {
            UpdateRequest::Witnessed {
                witness,
                old_leaf,
                new_leaf,
            } => self.update(witness, *old_leaf, *new_leaf),
            UpdateRequest::RootOnly {
                expected_root,
                new_root,
            } => self.update_by_root_only(*expected_root, *new_root),
        }
    }

    // The store is written before in-memory state, so a failed write changes nothing.
    fn commit(&mut self, current: Commitment, new_root: Digest) -> Result<Digest, CommitError> {
        let version = current
            .version
            .checked_add(1)
            .ok_or(CommitError::VersionExhausted)?;
        let next = Commitment {
            root: new_root,
            version,
        };
        self.store.store(&next).map_err(CommitError::Store)?;
        self.current = Some(next);
        tracing::debug!(root = %new_root, version = next.version, "committed root");
        Ok(new_root)
    }
}

impl<H, S: core::fmt::Debug> core::fmt::Debug for RootCommitment<H, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RootCommitment")
            .field("store", &self.store)
            .field("current", &self.current)
            .field("height", &self.height)
            .finish()
    }
}

/// A cloneable, thread-safe handle to a [`RootCommitment`].
///
/// Each operation takes the lock for its own duration only, so updates from many threads are
/// serialized in arrival order and resolved by the usual stale-witness check.
pub struct SharedRootCommitment<H, S = MemoryStore> {
    inner: Arc<Mutex<RootCommitment<H, S>>>,
}

impl<H, S> Clone for SharedRootCommitment<H, S> {
    fn clone(&self) -> Self {
        SharedRootCommitment {
            inner: self.inner.clone(),
        }
    }
}

impl<H: TreeHash, S: CommitmentStore> SharedRootCommitment<H, S> {
    /// Wrap a commitment for shared use.
    pub fn new(commitment: RootCommitment<H, S>) -> Self {
        SharedRootCommitment {
            inner: Arc::new(Mutex::new(commitment)),
        }
    }

    /// See [`RootCommitment::state`].
    pub fn state(&self) -> State {
        self.inner.lock().state()
    }

    /// See [`RootCommitment::commitment`].
    pub fn commitment(&self) -> Option<Commitment> {
        self.inner.lock().commitment()
    }

    /// See [`RootCommitment::committed_root`].
    pub fn committed_root(&self) -> Result<Digest, CommitError> {
        self.inner.lock().committed_root()
    }

    /// See [`RootCommitment::initialize`].
    pub fn initialize(&self, initial_root: Digest) -> Result<(), CommitError> {
        self.inner.lock().initialize(initial_root)
    }

    /// See [`RootCommitment::update`].
    pub fn update(
        &self,
        witness: &Witness,
        old_leaf: Digest,
        new_leaf: Digest,
    ) -> Result<Digest, CommitError> {
        self.inner.lock().update(witness, old_leaf, new_leaf)
    }

    /// See [`RootCommitment::update_by_root_only`].
    pub fn update_by_root_only(
        &self,
        expected_root: Digest,
        new_root: Digest,
    ) -> Result<Digest, CommitError> {
        self.inner
            .lock()
            .update_by_root_only(expected_root, new_root)
    }

    /// See [`RootCommitment::apply`].
    pub fn apply(&self, request: &UpdateRequest) -> Result<Digest, CommitError> {
        self.inner.lock().apply(request)
    }
}

#[cfg(test)]
mod tests {
    use super::{Commitment, CommitmentStore, MemoryStore, RootCommitment, State, UpdateRequest};
    use crate::{error::CommitError, tree::AuthenticatedTree};
    use rootstore_core::{hasher::Blake3Hasher, Digest, PathStep, Witness};

    type Protocol = RootCommitment<Blake3Hasher>;

    /// A store that fails every write.
    #[derive(Debug, Default)]
    struct BrokenStore {
        inner: Option<Commitment>,
    }

    impl CommitmentStore for BrokenStore {
        fn load(&self) -> anyhow::Result<Option<Commitment>> {
            Ok(self.inner)
        }

        fn store(&mut self, _: &Commitment) -> anyhow::Result<()> {
            anyhow::bail!("disk full")
        }
    }

    #[test]
    fn height_must_be_valid() {
        assert!(matches!(
            Protocol::new(0),
            Err(CommitError::InvalidHeight { height: 0 })
        ));
        assert!(matches!(
            Protocol::new(64),
            Err(CommitError::InvalidHeight { height: 64 })
        ));
        assert_eq!(Protocol::new(4).unwrap().height(), 4);
    }

    #[test]
    fn lifecycle() {
        let mut protocol = Protocol::new(4).unwrap();
        assert_eq!(protocol.state(), State::Uninitialized);
        assert!(matches!(
            protocol.committed_root(),
            Err(CommitError::NotInitialized)
        ));

        protocol.initialize(Digest::ZERO).unwrap();
        assert_eq!(protocol.state(), State::Committed);
        assert_eq!(protocol.version().unwrap(), 0);
        assert!(matches!(
            protocol.initialize(Digest::from(1)),
            Err(CommitError::AlreadyInitialized)
        ));
        assert_eq!(protocol.committed_root().unwrap(), Digest::ZERO);
    }

    #[test]
    fn update_before_initialize() {
        let mut protocol = Protocol::new(4).unwrap();
        let tree = AuthenticatedTree::<Blake3Hasher>::new(4).unwrap();
        let witness = tree.get_witness(0).unwrap();
        assert!(matches!(
            protocol.update(&witness, Digest::ZERO, Digest::from(1)),
            Err(CommitError::NotInitialized)
        ));
        assert!(matches!(
            protocol.update_by_root_only(Digest::ZERO, Digest::from(1)),
            Err(CommitError::NotInitialized)
        ));
    }

    #[test]
    fn root_only_is_compare_and_swap() {
        let mut protocol = Protocol::new(4).unwrap();
        protocol.initialize(Digest::ZERO).unwrap();
        assert_eq!(
            protocol
                .update_by_root_only(Digest::ZERO, Digest::from(2))
                .unwrap(),
            Digest::from(2)
        );
        let err = protocol
            .update_by_root_only(Digest::ZERO, Digest::from(3))
            .unwrap_err();
        assert!(err.is_stale());
        assert_eq!(protocol.committed_root().unwrap(), Digest::from(2));
        assert_eq!(protocol.version().unwrap(), 1);
    }

    #[test]
    fn witness_of_another_height_is_rejected() {
        let tree = AuthenticatedTree::<Blake3Hasher>::new(4).unwrap();
        let mut protocol = Protocol::new(5).unwrap();
        protocol.initialize(tree.get_root()).unwrap();
        let witness = tree.get_witness(3).unwrap();
        assert!(matches!(
            protocol.update(&witness, Digest::ZERO, Digest::from(1)),
            Err(CommitError::HeightMismatch {
                expected: 5,
                actual: 4
            })
        ));
    }

    #[test]
    fn apply_dispatches() {
        let mut tree = AuthenticatedTree::<Blake3Hasher>::new(4).unwrap();
        let mut protocol = Protocol::new(4).unwrap();
        protocol.initialize(tree.get_root()).unwrap();

        let request = UpdateRequest::Witnessed {
            witness: tree.get_witness(6).unwrap(),
            old_leaf: Digest::ZERO,
            new_leaf: Digest::from(5),
        };
        tree.set_leaf(6, Digest::from(5)).unwrap();
        assert_eq!(protocol.apply(&request).unwrap(), tree.get_root());

        let request = UpdateRequest::RootOnly {
            expected_root: tree.get_root(),
            new_root: Digest::from(1),
        };
        assert_eq!(protocol.apply(&request).unwrap(), Digest::from(1));
        assert_eq!(protocol.version().unwrap(), 2);
    }

    #[test]
    fn storage_failure_changes_nothing() {
        let mut protocol = RootCommitment::<Blake3Hasher, _>::open(
            BrokenStore {
                inner: Some(Commitment {
                    root: Digest::ZERO,
                    version: 4,
                }),
            },
            4,
        )
        .unwrap();
        assert_eq!(protocol.state(), State::Committed);
        assert!(matches!(
            protocol.update_by_root_only(Digest::ZERO, Digest::from(1)),
            Err(CommitError::Store(_))
        ));
        assert_eq!(protocol.committed_root().unwrap(), Digest::ZERO);
        assert_eq!(protocol.version().unwrap(), 4);

        let mut fresh = RootCommitment::<Blake3Hasher, _>::open(BrokenStore::default(), 4).unwrap();
        assert!(matches!(
            fresh.initialize(Digest::ZERO),
            Err(CommitError::Store(_))
        ));
        assert_eq!(fresh.state(), State::Uninitialized);
    }

    #[test]
    fn empty_witness_cannot_replace_root() {
        let mut tree = AuthenticatedTree::<Blake3Hasher>::new(8).unwrap();
        for i in 0..10 {
            tree.set_leaf(i, Digest::from(i + 1)).unwrap();
        }
        let root = tree.get_root();
        let mut protocol = Protocol::new(8).unwrap();
        protocol.initialize(root).unwrap();

        // the root itself, claimed as a leaf of a zero-level tree.
        let err = protocol
            .update(&Witness::default(), root, Digest::from(0xdead))
            .unwrap_err();
        assert!(matches!(
            err,
            CommitError::HeightMismatch {
                expected: 8,
                actual: 0
            }
        ));
        assert_eq!(protocol.committed_root().unwrap(), root);
        assert_eq!(protocol.version().unwrap(), 0);
    }

    #[test]
    fn short_witness_cannot_replace_subtree() {
        let mut tree = AuthenticatedTree::<Blake3Hasher>::new(8).unwrap();
        for i in 0..10 {
            tree.set_leaf(i, Digest::from(i + 1)).unwrap();
        }
        let root = tree.get_root();
        let mut protocol = Protocol::new(8).unwrap();
        protocol.initialize(root).unwrap();

        // the path from node (4, 0) to the root, which covers 16 leaves.
        let steps: Vec<PathStep> = (4..8)
            .map(|level| PathStep {
                sibling: tree.get_node(level, 1).unwrap(),
                is_left: true,
            })
            .collect();
        let witness = Witness::new(steps);
        assert_eq!(witness.verify::<Blake3Hasher>(tree.get_node(4, 0).unwrap()), root);

        let err = protocol
            .update(&witness, tree.get_node(4, 0).unwrap(), Digest::from(7))
            .unwrap_err();
        assert!(matches!(
            err,
            CommitError::HeightMismatch {
                expected: 8,
                actual: 4
            }
        ));
        assert_eq!(protocol.committed_root().unwrap(), root);
    }

    #[test]
    fn exhausted_version_is_an_error() {
        let mut store = MemoryStore::new();
        store
            .store(&Commitment {
                root: Digest::ZERO,
                version: u64::MAX,
            })
            .unwrap();
        let mut protocol = RootCommitment::<Blake3Hasher, _>::open(store, 4).unwrap();
        assert!(matches!(
            protocol.update_by_root_only(Digest::ZERO, Digest::from(1)),
            Err(CommitError::VersionExhausted)
        ));
        assert_eq!(protocol.committed_root().unwrap(), Digest::ZERO);
        assert_eq!(protocol.version().unwrap(), u64::MAX);
        assert_eq!(protocol.store().load().unwrap().unwrap().version, u64::MAX);
    }
}
