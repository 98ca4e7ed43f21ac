//! Seeded per-entity random streams.
//!
//! Each stream is seeded from `MD5(seed_be32 || entity_id)` and advanced
//! with xorshift32, so the same `(entity_id, seed)` pair always yields the same
//! sequence regardless of how many other entities were processed before it.

use md5::{Digest, Md5};

/// Longest identifier prefix fed into the seed digest.
pub const MAX_SEED_ID_BYTES: usize = 255;

/// Deterministic xorshift32 stream for one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededRandomStream {
    state: u32,
}

impl SeededRandomStream {
    /// Create the stream for `entity_id` under `global_seed`.
    pub fn new(entity_id: &str, global_seed: u32) -> Self {
        let id_bytes = entity_id.as_bytes();
        let id_bytes = &id_bytes[..id_bytes.len().min(MAX_SEED_ID_BYTES)];

        let mut hasher = Md5::new();
        hasher.update(global_seed.to_be_bytes());
        hasher.update(id_bytes);
        let digest = hasher.finalize();

        let state = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
        Self { state }
    }

    /// Advance and return the raw 32-bit state.
    pub fn next_u32(&mut self) -> u32 {
        let mut state = self.state;
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        self.state = state;
        state
    }

    /// Advance and return the state reduced modulo `modulus`.
    ///
    /// A zero modulus returns the raw state.
    pub fn next_below(&mut self, modulus: u32) -> u32 {
        let value = self.next_u32();
        if modulus == 0 {
            value
        } else {
            value % modulus
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
