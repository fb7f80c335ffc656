//! Deterministic seed derivation for per-stage and per-purpose random streams.

use sha2::{Digest, Sha256};

use crate::Stage;

/// Derives the seed of one stage's random stream from the encounter seed.
#[must_use]
pub fn derive_stage_seed(global_seed: u64, stage: Stage) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(global_seed.to_le_bytes());
    hasher.update([stage.get()]);
    finalize_seed(hasher)
}

/// Derives an independent seed for a named purpose from a base seed.
#[must_use]
pub fn derive_labeled_seed(base: u64, label: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(base.to_le_bytes());
    hasher.update(label.as_bytes());
    finalize_seed(hasher)
}

fn finalize_seed(hasher: Sha256) -> u64 {
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[0..8]);
    u64::from_le_bytes(bytes)
}
