//! Authentication paths through the tree.
//!
//! A [`Witness`] carries, for every level from the leaf up to the root, the digest of the
//! sibling of the node on the path and whether the path node is the left child. That is
//! everything required to recompute the root from a claimed leaf value without access to the
//! rest of the tree.
//!
//! Recomputing a root never fails; whether the result matches some expected root is for the
//! caller to decide. This lets the same routine serve both the authority applying an update and
//! any third party auditing it.

use crate::{
    digest::Digest,
    hasher::{TreeHash, TreeHashExt},
};

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use bitvec::prelude::*;

/// A single level of an authentication path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "borsh",
    derive(borsh::BorshDeserialize, borsh::BorshSerialize)
)]
pub struct PathStep {
    /// The digest of the sibling at this level.
    pub sibling: Digest,
    /// Whether the node on the path is the left child at this level, i.e. the sibling is on
    /// the right.
    pub is_left: bool,
}

/// An authentication path from a leaf to the root, in ascending order from the leaf level.
///
/// A witness is a snapshot: it becomes stale as soon as any leaf whose path shares a node with
/// this one changes. It holds no reference back to the tree it came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "borsh",
    derive(borsh::BorshDeserialize, borsh::BorshSerialize)
)]
pub struct Witness {
    steps: Vec<PathStep>,
}

impl Witness {
    /// Create a witness from its steps, leaf level first.
    pub fn new(steps: Vec<PathStep>) -> Self {
        Witness { steps }
    }

    /// Create a witness for the leaf at `index` from its siblings, leaf level first.
    ///
    /// The direction flags are taken from the bits of `index`, least significant first. Bits
    /// beyond the number of siblings are ignored.
    pub fn for_index(index: u64, siblings: impl IntoIterator<Item = Digest>) -> Self {
        let bits = index.view_bits::<Lsb0>();
        let steps = siblings
            .into_iter()
            .zip(bits.iter().by_vals())
            .map(|(sibling, right_child)| PathStep {
                sibling,
                is_left: !right_child,
            })
            .collect();
        Witness { steps }
    }

    /// The number of levels this witness spans. Equal to the height of the tree it came from.
    pub fn height(&self) -> usize {
        self.steps.len()
    }

    /// The steps of this witness, leaf level first.
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    /// Recompute the root that `leaf` would produce at the position this witness describes.
    pub fn verify<H: TreeHash>(&self, leaf: Digest) -> Digest {
        self.steps.iter().fold(leaf, |current, step| {
            if step.is_left {
                H::node(&current, &step.sibling)
            } else {
                H::node(&step.sibling, &current)
            }
        })
    }

    /// Recover the leaf index implied by the direction flags.
    ///
    /// Bit `k` of the index is set when the path node is the right child at level `k`. Witnesses
    /// longer than 64 levels cannot be produced by the tree; extra levels are ignored.
    pub fn calculate_index(&self) -> u64 {
        let mut index = 0u64;
        {
            let bits = index.view_bits_mut::<Lsb0>();
            for (mut bit, step) in bits.iter_mut().zip(&self.steps) {
                *bit = !step.is_left;
            }
        }
        index
    }
}

impl From<Vec<PathStep>> for Witness {
    fn from(steps: Vec<PathStep>) -> Self {
        Witness::new(steps)
    }
}
