//! Durable storage for the committed root.
//!
//! The protocol persists exactly one [`Commitment`]. Where it lives is up to the surrounding
//! system; this module defines the seam and two implementations: an in-memory one and a single
//! file.

use std::{
    fs::{self, File},
    io::{ErrorKind, Write as _},
    path::{Path, PathBuf},
};

use anyhow::{Context as _, Result};
use rootstore_core::{digest::DIGEST_LEN, Digest};

/// The encoded size of a [`Commitment`].
pub const COMMITMENT_LEN: usize = DIGEST_LEN + 8;

/// The persisted state of a root commitment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "borsh",
    derive(borsh::BorshDeserialize, borsh::BorshSerialize)
)]
pub struct Commitment {
    /// The committed root.
    pub root: Digest,
    /// The number of updates applied since initialization.
    pub version: u64,
}

impl Commitment {
    /// Encode as the root followed by the version, little-endian.
    ///
    /// Panics if `buf` is not exactly [`COMMITMENT_LEN`] bytes.
    pub fn encode_to(&self, buf: &mut [u8]) {
        assert_eq!(buf.len(), COMMITMENT_LEN);
        buf[..DIGEST_LEN].copy_from_slice(self.root.as_bytes());
        buf[DIGEST_LEN..].copy_from_slice(&self.version.to_le_bytes());
    }

    /// Decode the output of [`Commitment::encode_to`].
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() != COMMITMENT_LEN {
            anyhow::bail!(
                "Commitment corrupted; unexpected length {} (expected {})",
                buf.len(),
                COMMITMENT_LEN
            );
        }
        let mut root = [0u8; DIGEST_LEN];
        root.copy_from_slice(&buf[..DIGEST_LEN]);
        let mut version = [0u8; 8];
        version.copy_from_slice(&buf[DIGEST_LEN..]);
        Ok(Commitment {
            root: Digest::new(root),
            version: u64::from_le_bytes(version),
        })
    }
}

/// Storage for a single [`Commitment`].
///
/// `store` must be all-or-nothing: after a failed `store`, `load` returns the previous
/// commitment.
pub trait CommitmentStore {
    /// Load the stored commitment. `None` means nothing was ever stored.
    fn load(&self) -> Result<Option<Commitment>>;

    /// Replace the stored commitment.
    fn store(&mut self, commitment: &Commitment) -> Result<()>;
}

/// Keeps the commitment in memory. Nothing survives the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    commitment: Option<Commitment>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CommitmentStore for MemoryStore {
    fn load(&self) -> Result<Option<Commitment>> {
        Ok(self.commitment)
    }

    fn store(&mut self, commitment: &Commitment) -> Result<()> {
        self.commitment = Some(*commitment);
        Ok(())
    }
}

/// Keeps the commitment in a single file.
///
/// Each write goes to a temporary sibling file which is synced and then renamed over the
/// target, so a crash leaves either the old or the new commitment on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    tmp: PathBuf,
}

impl FileStore {
    /// Use the file at `path`. The file need not exist yet; its parent directory must.
    ///
    /// Fails if `path` does not name a file, e.g. when it ends in `..`.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut tmp_name = match path.file_name() {
            Some(name) => name.to_os_string(),
            None => anyhow::bail!("commitment path {} does not name a file", path.display()),
        };
        tmp_name.push(".tmp");
        let tmp = path.with_file_name(tmp_name);
        Ok(FileStore { path, tmp })
    }

    /// The path of the commitment file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_tmp(&self, buf: &[u8]) -> Result<()> {
        let mut file = File::create(&self.tmp)
            .with_context(|| format!("creating {}", self.tmp.display()))?;
        file.write_all(buf)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&self.tmp, &self.path)
            .with_context(|| format!("replacing commitment {}", self.path.display()))
    }
}

impl CommitmentStore for FileStore {
    fn load(&self) -> Result<Option<Commitment>> {
        let buf = match fs::read(&self.path) {
            Ok(buf) => buf,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("reading commitment {}", self.path.display()))
            }
        };
        Commitment::decode(&buf)
            .with_context(|| format!("decoding commitment {}", self.path.display()))
            .map(Some)
    }

    fn store(&mut self, commitment: &Commitment) -> Result<()> {
        let mut buf = [0u8; COMMITMENT_LEN];
        commitment.encode_to(&mut buf);

        if let Err(e) = self.write_tmp(&buf) {
            // the target is untouched; only the temporary file may be left over.
            let _ = fs::remove_file(&self.tmp);
            return Err(e);
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            File::open(parent)?.sync_all()?;
        }
        Ok(())
    }
}
