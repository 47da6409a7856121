//! Addressing a tree by key.
//!
//! A key is mapped to a leaf by hashing it and keeping the low `height` bits of the first 8 bytes
//! of the digest, read big-endian. Distinct keys may land on the same leaf; how likely that is
//! depends only on the height chosen.

use crate::{
    digest::Digest,
    hasher::{TreeHash, TreeHashExt},
    trie::MAX_HEIGHT,
};

/// How a `(key, value)` pair is turned into a leaf digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyBinding {
    /// The leaf is `hash(value)`. Sufficient when the reader already knows which key it asked
    /// for.
    #[default]
    Unbound,
    /// The leaf is `hash_pair(hash(key), hash(value))`. A verifier can then check which key
    /// occupies a leaf, not only which value.
    Bound,
}

/// Derive the leaf index of `key` in a tree of `height`.
///
/// `height` above [`MAX_HEIGHT`] is treated as [`MAX_HEIGHT`].
pub fn derive_index<H: TreeHash>(key: &[u8], height: u8) -> u64 {
    let height = height.min(MAX_HEIGHT);
    let mask = (1u64 << height) - 1;
    H::digest(key).leading_u64() & mask
}

/// Encode a `(key, value)` pair as a leaf digest.
pub fn encode_leaf<H: TreeHash>(binding: KeyBinding, key: &[u8], value: &[u8]) -> Digest {
    match binding {
        KeyBinding::Unbound => H::digest(value),
        KeyBinding::Bound => H::node(&H::digest(key), &H::digest(value)),
    }
}
