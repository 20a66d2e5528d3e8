//! Random generator providers.
//!
//! Random kernels never touch a global generator: every invocation asks the
//! provider in its `RunOptions` for a fresh `StdRng`.
use std::env;
use std::sync::OnceLock;

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Source of per-invocation random generators.
pub trait RngProvider: Send + Sync {
    fn rng(&self) -> StdRng;
}

/// Seeds every generator from OS entropy; results differ across calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct EntropyRng;

impl RngProvider for EntropyRng {
    fn rng(&self) -> StdRng {
        StdRng::from_entropy()
    }
}

/// Seeds every generator from the same value; repeated calls reproduce the
/// same stream.
#[derive(Debug, Clone, Copy)]
pub struct SeededRng {
    seed: u64,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RngProvider for SeededRng {
    fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seed)
    }
}

static ENV_SEED: OnceLock<Option<u64>> = OnceLock::new();

/// Seed configured through `NODEXEC_SEED`, read once per process.
pub fn seed_from_env() -> Option<u64> {
    *ENV_SEED.get_or_init(|| {
        env::var("NODEXEC_SEED")
            .ok()
            .and_then(|raw| parse_seed(&raw))
    })
}

fn parse_seed(raw: &str) -> Option<u64> {
    let seed = raw.trim().parse::<u64>().ok();
    if seed.is_none() {
        crate::warning!("ignoring NODEXEC_SEED={:?}: not an unsigned integer", raw);
    }
    seed
}
