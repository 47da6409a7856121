//! This module defines the schema of a fixed-height binary merkle tree, generalized over a 256 bit
//! hash function.
//!
//! A tree of height `H` has `2^H` leaves, addressed by index. Levels are counted from the leaves
//! upwards: level 0 holds the leaves, level `H` holds the root alone.
//!
//! All nodes are 256 bits.
//!   1. Leaves carry a caller-supplied [`Digest`]. Leaves that were never set hold
//!      [`EMPTY_LEAF`].
//!   2. Internal nodes are `hash_pair(left, right)` of their two children.
//!
//! A subtree whose leaves are all empty has a digest that depends only on its height. These
//! are precomputed in [`EmptyDigests`] so that sparse storage never needs to materialize them.

use crate::{
    digest::Digest,
    error::Error,
    hasher::{TreeHash, TreeHashExt},
};

use arrayvec::ArrayVec;
use core::marker::PhantomData;

/// The maximum supported tree height. Leaf indices are `u64`, and `2^63` is the largest power of
/// two that still fits.
pub const MAX_HEIGHT: u8 = 63;

/// The value of a leaf that has never been set.
pub const EMPTY_LEAF: Digest = Digest::ZERO;

/// Check that `height` is a supported tree height.
pub fn check_height(height: u8) -> Result<(), Error> {
    if height == 0 || height > MAX_HEIGHT {
        return Err(Error::InvalidHeight { height });
    }
    Ok(())
}

/// The number of nodes at `level` in a tree of `height`.
///
/// `level` must not exceed `height`.
pub fn level_width(height: u8, level: u8) -> u64 {
    1u64 << (height - level)
}

/// Check that `index` addresses a node at `level` in a tree of `height`.
pub fn check_index(height: u8, level: u8, index: u64) -> Result<(), Error> {
    if level > height {
        return Err(Error::LevelOutOfRange { level, height });
    }
    if index >= level_width(height, level) {
        return Err(Error::IndexOutOfRange {
            index,
            height: height - level,
        });
    }
    Ok(())
}

/// Digests of all-empty subtrees, one per level.
///
/// `get(0)` is [`EMPTY_LEAF`]; `get(k)` is `hash_pair(get(k - 1), get(k - 1))`.
pub struct EmptyDigests<H> {
    levels: ArrayVec<Digest, { MAX_HEIGHT as usize + 1 }>,
    _marker: PhantomData<H>,
}

impl<H: TreeHash> EmptyDigests<H> {
    /// Precompute the empty digests for every level of a tree of `height`.
    pub fn new(height: u8) -> Result<Self, Error> {
        check_height(height)?;
        let mut levels = ArrayVec::new();
        let mut current = EMPTY_LEAF;
        levels.push(current);
        for _ in 0..height {
            current = H::node(&current, &current);
            levels.push(current);
        }
        Ok(EmptyDigests {
            levels,
            _marker: PhantomData,
        })
    }

    /// The height these digests were computed for.
    pub fn height(&self) -> u8 {
        (self.levels.len() - 1) as u8
    }

    /// The digest of an empty subtree rooted at `level`.
    ///
    /// Panics if `level` is above the tree height.
    pub fn get(&self, level: u8) -> Digest {
        self.levels[level as usize]
    }

    /// The root of an empty tree.
    pub fn root(&self) -> Digest {
        // UNWRAP: there is always at least the leaf level.
        *self.levels.last().unwrap()
    }
}

impl<H> Clone for EmptyDigests<H> {
    fn clone(&self) -> Self {
        EmptyDigests {
            levels: self.levels.clone(),
            _marker: PhantomData,
        }
    }
}

impl<H> core::fmt::Debug for EmptyDigests<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.levels.iter()).finish()
    }
}
