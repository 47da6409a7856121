use rootstore::Digest;
use tracing_subscriber::EnvFilter;

const ENV_NAME: &str = "ROOTSTORE_LOG";

/// Install a log subscriber for the test binary, filtered by `ROOTSTORE_LOG` (default: info).
///
/// Safe to call from every test; only the first call installs anything.
#[allow(dead_code)]
pub fn init_logging() {
    let filter = EnvFilter::try_from_env(ENV_NAME).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// A pseudo-random leaf derived from `seed`.
///
/// Leaves should look like digests, but we don't want to spend time on a good hash. So the next
/// best option is a PRNG seeded with the id.
#[allow(dead_code)]
pub fn leaf(seed: u64) -> Digest {
    use rand::{RngCore as _, SeedableRng as _};
    let mut rng_seed = [0; 16];
    rng_seed[0..8].copy_from_slice(&seed.to_le_bytes());
    let mut rng = rand_pcg::Lcg64Xsh32::from_seed(rng_seed);
    let mut bytes = [0u8; 32];
    rng.fill_bytes(&mut bytes);
    Digest::new(bytes)
}

/// `count` distinct pseudo-random leaf indices below `2^height`, paired with leaves.
#[allow(dead_code)]
pub fn random_writes(seed: u64, height: u8, count: usize) -> Vec<(u64, Digest)> {
    use rand::{Rng as _, SeedableRng as _};
    let mut rng_seed = [0; 16];
    rng_seed[8..16].copy_from_slice(&seed.to_le_bytes());
    let mut rng = rand_pcg::Lcg64Xsh32::from_seed(rng_seed);
    let mut seen = std::collections::HashSet::new();
    let mut writes = Vec::with_capacity(count);
    while writes.len() < count {
        let index = rng.gen_range(0..(1u64 << height));
        if seen.insert(index) {
            writes.push((index, leaf(rng.gen())));
        }
    }
    writes
}
