//! The fixed-width value every layer of the tree is built from.
//!
//! Leaves, internal nodes, roots and the siblings carried in a witness are all [`Digest`]s. A
//! digest is 256 bits wide, immutable and compared by value.

use core::fmt;
use core::str::FromStr;

/// The width of a [`Digest`] in bytes.
pub const DIGEST_LEN: usize = 32;

/// A 256-bit value in the output domain of the tree hash.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(
    feature = "borsh",
    derive(borsh::BorshDeserialize, borsh::BorshSerialize)
)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// The all-zero digest. This is the value of every leaf that has never been set.
    pub const ZERO: Digest = Digest([0u8; DIGEST_LEN]);

    /// Wrap raw bytes.
    pub const fn new(bytes: [u8; DIGEST_LEN]) -> Self {
        Digest(bytes)
    }

    /// Borrow the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Unwrap into the raw bytes.
    pub const fn to_bytes(self) -> [u8; DIGEST_LEN] {
        self.0
    }

    /// Whether this is [`Digest::ZERO`].
    pub fn is_zero(&self) -> bool {
        self == &Digest::ZERO
    }

    /// Interpret the first 8 bytes as a big-endian integer.
    pub fn leading_u64(&self) -> u64 {
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&self.0[..8]);
        u64::from_be_bytes(buf)
    }
}

/// Embed a small integer big-endian in the low bytes, the way a field element would be
/// serialized.
impl From<u64> for Digest {
    fn from(value: u64) -> Self {
        let mut bytes = [0u8; DIGEST_LEN];
        bytes[DIGEST_LEN - 8..].copy_from_slice(&value.to_be_bytes());
        Digest(bytes)
    }
}

impl From<[u8; DIGEST_LEN]> for Digest {
    fn from(bytes: [u8; DIGEST_LEN]) -> Self {
        Digest(bytes)
    }
}

impl From<Digest> for [u8; DIGEST_LEN] {
    fn from(digest: Digest) -> Self {
        digest.0
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = [0u8; DIGEST_LEN * 2];
        // UNWRAP: the buffer is exactly twice the input length.
        hex::encode_to_slice(self.0, &mut buf).unwrap();
        // UNWRAP: hex output is always ASCII.
        f.write_str(core::str::from_utf8(&buf).unwrap())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self)
    }
}

impl FromStr for Digest {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = [0u8; DIGEST_LEN];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Digest(bytes))
    }
}
