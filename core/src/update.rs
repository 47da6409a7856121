//! Verifying single-leaf updates against a committed root.
//!
//! An update is the triple `(witness, old_leaf, new_leaf)`. It is valid against a committed root
//! when the witness and the old leaf hash up to exactly that root. The new root is then the
//! witness applied to the new leaf: changing the leaf at the base of a path leaves every sibling
//! on that path untouched, so the same witness remains correct for the new value.
//!
//! This is a pure function of its inputs. The authority holding the root and any auditor replaying
//! the update compute the same result.

use crate::{digest::Digest, error::Error, hasher::TreeHash, witness::Witness};

/// Verify an update against `committed_root` and compute the root after it.
///
/// Fails with [`Error::StaleWitness`] when `witness` and `old_leaf` do not reproduce
/// `committed_root`, which is what happens to an update prepared against a root that has since
/// been superseded.
pub fn verify_update<H: TreeHash>(
    committed_root: Digest,
    witness: &Witness,
    old_leaf: Digest,
    new_leaf: Digest,
) -> Result<Digest, Error> {
    let derived = witness.verify::<H>(old_leaf);
    if derived != committed_root {
        return Err(Error::StaleWitness {
            committed: committed_root,
            derived,
        });
    }
    Ok(witness.verify::<H>(new_leaf))
}

/// Like [`verify_update`], but additionally require the witness to span `height` levels.
pub fn verify_update_at_height<H: TreeHash>(
    height: u8,
    committed_root: Digest,
    witness: &Witness,
    old_leaf: Digest,
    new_leaf: Digest,
) -> Result<Digest, Error> {
    if witness.height() != height as usize {
        return Err(Error::HeightMismatch {
            expected: height,
            actual: witness.height(),
        });
    }
    verify_update::<H>(committed_root, witness, old_leaf, new_leaf)
}
