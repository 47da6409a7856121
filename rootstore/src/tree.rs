//! A fixed-height authenticated binary tree held in memory.
//!
//! Storage is sparse: only nodes whose digest differs from the empty digest of their level are
//! kept. Every other node is implicitly the root of an all-empty subtree, so a freshly opened tree
//! stores nothing and resetting every leaf returns it to that state.
//!
//! The tree has a single owner. Reads (`get_root`, `get_witness`, ...) may run concurrently with
//! each other through shared references, while `set_leaf` requires exclusive access.

use core::fmt;

use fxhash::FxHashMap;
use rootstore_core::{
    hasher::{TreeHash, TreeHashExt},
    trie::{self, EmptyDigests},
    Digest, Error, Witness,
};

use crate::options::Options;

/// A fixed-height binary merkle tree with `2^height` leaves.
pub struct AuthenticatedTree<H> {
    height: u8,
    empty: EmptyDigests<H>,
    /// Non-empty nodes keyed by `(level, index within level)`. Level 0 holds the leaves.
    nodes: FxHashMap<(u8, u64), Digest>,
}

impl<H: TreeHash> AuthenticatedTree<H> {
    /// Create a tree of the given height with every leaf empty.
    ///
    /// Fails with [`Error::InvalidHeight`] if `height` is outside `1..=MAX_HEIGHT`.
    pub fn new(height: u8) -> Result<Self, Error> {
        let empty = EmptyDigests::new(height)?;
        Ok(AuthenticatedTree {
            height,
            empty,
            nodes: FxHashMap::default(),
        })
    }

    /// Create a tree according to the given options.
    pub fn open(o: &Options) -> Result<Self, Error> {
        Self::new(o.height)
    }

    /// The height of the tree.
    pub fn height(&self) -> u8 {
        self.height
    }

    /// The number of leaves, `2^height`.
    pub fn leaf_count(&self) -> u64 {
        trie::level_width(self.height, 0)
    }

    /// Whether every leaf is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The digest of an all-empty tree of this height.
    pub fn empty_root(&self) -> Digest {
        self.empty.root()
    }

    /// The current root.
    pub fn get_root(&self) -> Digest {
        self.node(self.height, 0)
    }

    /// The leaf at `index`.
    pub fn get_leaf(&self, index: u64) -> Result<Digest, Error> {
        self.get_node(0, index)
    }

    /// Any node of the tree, addressed by level (0 for leaves) and its index within the level.
    pub fn get_node(&self, level: u8, index: u64) -> Result<Digest, Error> {
        trie::check_index(self.height, level, index)?;
        Ok(self.node(level, index))
    }

    /// Set the leaf at `index` and rehash its path to the root.
    ///
    /// The value is stored as given; callers encoding application data must hash it first and
    /// do so consistently for every leaf of the tree.
    pub fn set_leaf(&mut self, index: u64, value: Digest) -> Result<(), Error> {
        trie::check_index(self.height, 0, index)?;

        self.put(0, index, value);
        let mut current = value;
        let mut position = index;
        for level in 0..self.height {
            let sibling = self.node(level, position ^ 1);
            current = if position & 1 == 0 {
                H::node(&current, &sibling)
            } else {
                H::node(&sibling, &current)
            };
            position >>= 1;
            self.put(level + 1, position, current);
        }

        tracing::trace!(index, leaf = %value, root = %current, "set leaf");
        Ok(())
    }

    /// Set leaves `0..leaves.len()` in order.
    ///
    /// Fails with [`Error::IndexOutOfRange`] without changing anything if there are more values
    /// than leaves.
    pub fn fill(&mut self, leaves: &[Digest]) -> Result<(), Error> {
        let count = leaves.len() as u64;
        if count > self.leaf_count() {
            return Err(Error::IndexOutOfRange {
                index: count - 1,
                height: self.height,
            });
        }
        for (index, leaf) in leaves.iter().enumerate() {
            self.set_leaf(index as u64, *leaf)?;
        }
        tracing::debug!(count, root = %self.get_root(), "filled leaves");
        Ok(())
    }

    /// The authentication path of the leaf at `index` against the current root.
    pub fn get_witness(&self, index: u64) -> Result<Witness, Error> {
        trie::check_index(self.height, 0, index)?;
        let siblings = (0..self.height).map(|level| self.node(level, (index >> level) ^ 1));
        Ok(Witness::for_index(index, siblings))
    }

    /// Check that the witness of the leaf at `index` reproduces the current root.
    pub fn validate(&self, index: u64) -> Result<bool, Error> {
        let leaf = self.get_leaf(index)?;
        let witness = self.get_witness(index)?;
        Ok(witness.verify::<H>(leaf) == self.get_root())
    }

    fn node(&self, level: u8, index: u64) -> Digest {
        self.nodes
            .get(&(level, index))
            .copied()
            .unwrap_or_else(|| self.empty.get(level))
    }

    fn put(&mut self, level: u8, index: u64, digest: Digest) {
        if digest == self.empty.get(level) {
            self.nodes.remove(&(level, index));
        } else {
            self.nodes.insert((level, index), digest);
        }
    }
}

impl<H> fmt::Debug for AuthenticatedTree<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedTree")
            .field("height", &self.height)
            .field("stored_nodes", &self.nodes.len())
            .finish()
    }
}
