//! A sparse key-value map authenticated by an [`AuthenticatedTree`].
//!
//! Every key is assigned a leaf by [`derive_index`]. The leaf holds the encoding of the entry
//! chosen by the map's [`KeyBinding`], and the raw value is kept alongside so it can be read back.
//!
//! Two keys deriving the same index share a leaf: the last write wins. With
//! [`KeyBinding::Bound`] the key is folded into the leaf and checked on read, so an aliased key
//! reads as absent instead of returning another key's value.

use core::fmt;

use fxhash::FxHashMap;
use rootstore_core::{
    hasher::TreeHash,
    index::{derive_index, encode_leaf, KeyBinding},
    Digest, Error, Witness, EMPTY_LEAF,
};

use crate::{options::Options, tree::AuthenticatedTree};

/// The stored contents of one leaf.
struct Entry {
    key: Vec<u8>,
    value: Vec<u8>,
}

/// A key-value map committing to its contents through a single root.
pub struct AuthenticatedMap<H> {
    tree: AuthenticatedTree<H>,
    key_binding: KeyBinding,
    entries: FxHashMap<u64, Entry>,
}

impl<H: TreeHash> AuthenticatedMap<H> {
    /// Create an empty map backed by a tree of the given height, with unbound leaves.
    pub fn new(height: u8) -> Result<Self, Error> {
        let mut o = Options::new();
        o.height(height);
        Self::open(&o)
    }

    /// Create an empty map according to the given options.
    pub fn open(o: &Options) -> Result<Self, Error> {
        Ok(AuthenticatedMap {
            tree: AuthenticatedTree::open(o)?,
            key_binding: o.key_binding,
            entries: FxHashMap::default(),
        })
    }

    /// The height of the backing tree.
    pub fn height(&self) -> u8 {
        self.tree.height()
    }

    /// How entries are encoded as leaves.
    pub fn key_binding(&self) -> KeyBinding {
        self.key_binding
    }

    /// The leaf index `key` maps to.
    pub fn index_of(&self, key: &[u8]) -> u64 {
        derive_index::<H>(key, self.tree.height())
    }

    /// The leaf digest the entry `(key, value)` is stored as.
    ///
    /// An auditor holding a witness for `key` verifies `value` by checking that
    /// `witness.verify(leaf_for(key, value))` equals the root.
    pub fn leaf_for(&self, key: &[u8], value: &[u8]) -> Digest {
        encode_leaf::<H>(self.key_binding, key, value)
    }

    /// Insert or overwrite the value of `key`.
    pub fn set(&mut self, key: &[u8], value: &[u8]) {
        let index = self.index_of(key);
        let leaf = self.leaf_for(key, value);
        if let Some(previous) = self.entries.get(&index) {
            if previous.key != key {
                tracing::debug!(index, "key aliases an occupied leaf, overwriting");
            }
        }
        // UNWRAP: derived indices are always below 2^height.
        self.tree.set_leaf(index, leaf).unwrap();
        self.entries.insert(
            index,
            Entry {
                key: key.to_vec(),
                value: value.to_vec(),
            },
        );
    }

    /// The most recently set value at the leaf of `key`, or `None` if the leaf is empty.
    ///
    /// With [`KeyBinding::Bound`], a leaf last written under a different key reads as `None`.
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        let entry = self.entries.get(&self.index_of(key))?;
        match self.key_binding {
            KeyBinding::Bound if entry.key != key => None,
            _ => Some(entry.value.as_slice()),
        }
    }

    /// Reset the leaf of `key` to empty, returning the value it held.
    ///
    /// With [`KeyBinding::Bound`], a leaf owned by a different key is left untouched.
    pub fn remove(&mut self, key: &[u8]) -> Option<Vec<u8>> {
        let index = self.index_of(key);
        if self.key_binding == KeyBinding::Bound
            && self.entries.get(&index).map_or(false, |e| e.key != key)
        {
            return None;
        }
        let entry = self.entries.remove(&index)?;
        // UNWRAP: derived indices are always below 2^height.
        self.tree.set_leaf(index, EMPTY_LEAF).unwrap();
        Some(entry.value)
    }

    /// The number of occupied leaves.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no leaf is occupied.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The current root.
    pub fn get_root(&self) -> Digest {
        self.tree.get_root()
    }

    /// The authentication path of the leaf `key` maps to.
    pub fn get_witness(&self, key: &[u8]) -> Witness {
        // UNWRAP: derived indices are always below 2^height.
        self.tree.get_witness(self.index_of(key)).unwrap()
    }

    /// The backing tree.
    pub fn tree(&self) -> &AuthenticatedTree<H> {
        &self.tree
    }
}

impl<H> fmt::Debug for AuthenticatedMap<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedMap")
            .field("tree", &self.tree)
            .field("key_binding", &self.key_binding)
            .field("entries", &self.entries.len())
            .finish()
    }
}
