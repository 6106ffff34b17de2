use std::collections::HashMap;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Named deterministic RNG streams derived from one master seed.
///
/// Each concern (terrain, growth, policy) draws from its own stream so that
/// adding draws to one concern does not shift the values seen by another.
/// Stream seeds depend only on the master seed and the stream name, not on
/// the order streams are first requested.
pub struct RngManager {
    master_seed: u64,
    streams: HashMap<String, ChaCha8Rng>,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self {
            master_seed: seed,
            streams: HashMap::new(),
        }
    }

    pub fn stream(&mut self, name: &str) -> StreamRng<'_> {
        let derived = derive_seed(self.master_seed, name);
        let entry = self
            .streams
            .entry(name.to_string())
            .or_insert_with(|| ChaCha8Rng::seed_from_u64(derived));
        StreamRng { inner: entry }
    }
}

fn derive_seed(master: u64, name: &str) -> u64 {
    let mut seed = master;
    for byte in name.bytes() {
        seed = seed
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        seed ^= byte as u64;
    }
    seed.wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407)
}

pub struct StreamRng<'a> {
    inner: &'a mut ChaCha8Rng,
}

impl<'a> RngCore for StreamRng<'a> {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}
