//! Hashers (feature-gated) and the contract the tree relies on.

use crate::digest::Digest;

/// A collision-resistant hash producing 256-bit outputs.
///
/// This is the only cryptographic primitive the tree depends on. Internal nodes are computed
/// with [`TreeHash::hash_pair`] as `hash_pair(left, right)`; the argument order is part of the
/// schema and must never be swapped, since every witness encodes it.
///
/// Implementations are expected to behave approximately like a random oracle over the space
/// 2^256. Functions like Sha2/Blake3/Keccak all meet this.
pub trait TreeHash {
    /// Hash an arbitrary-length input.
    fn hash(input: &[u8]) -> [u8; 32];

    /// Hash two 32-byte inputs, left then right.
    ///
    /// The default implementation hashes the 64-byte concatenation. Implementations may
    /// specialize this as long as the result is identical.
    fn hash_pair(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
        let mut buf = [0u8; 64];
        buf[0..32].copy_from_slice(left);
        buf[32..64].copy_from_slice(right);
        Self::hash(&buf)
    }
}

/// Helpers over [`TreeHash`] speaking in [`Digest`]s.
pub trait TreeHashExt: TreeHash {
    /// Compute the digest of an internal node from its two children.
    fn node(left: &Digest, right: &Digest) -> Digest {
        Digest::new(Self::hash_pair(left.as_bytes(), right.as_bytes()))
    }

    /// Hash an arbitrary value into a digest.
    fn digest(value: &[u8]) -> Digest {
        Digest::new(Self::hash(value))
    }
}

impl<T: TreeHash> TreeHashExt for T {}

#[cfg(any(feature = "blake3-hasher", test))]
pub use self::blake3::Blake3Hasher;

/// A tree hash making use of blake3.
#[cfg(any(feature = "blake3-hasher", test))]
pub mod blake3 {
    use super::TreeHash;

    /// A [`TreeHash`] implementation for Blake3.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct Blake3Hasher;

    impl TreeHash for Blake3Hasher {
        fn hash(value: &[u8]) -> [u8; 32] {
            blake3::hash(value).into()
        }

        fn hash_pair(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
            let mut hasher = blake3::Hasher::new();
            hasher.update(left);
            hasher.update(right);
            hasher.finalize().into()
        }
    }
}

#[cfg(feature = "sha2-hasher")]
pub use self::sha2::Sha2Hasher;

/// A tree hash making use of sha2-256.
#[cfg(feature = "sha2-hasher")]
pub mod sha2 {
    use super::TreeHash;
    use sha2::{Digest, Sha256};

    /// A [`TreeHash`] implementation for Sha2.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct Sha2Hasher;

    impl TreeHash for Sha2Hasher {
        fn hash(value: &[u8]) -> [u8; 32] {
            let mut hasher = Sha256::new();
            hasher.update(value);
            hasher.finalize().into()
        }

        fn hash_pair(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
            let mut hasher = Sha256::new();
            hasher.update(left);
            hasher.update(right);
            hasher.finalize().into()
        }
    }
}
