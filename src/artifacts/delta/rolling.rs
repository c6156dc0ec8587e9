use crate::artifacts::delta::{CHUNK_SIZE, HASH_MOD, HASH_PRIME};
use std::collections::VecDeque;

/// Polynomial rolling checksum over a fixed-size byte window. Pushing a
/// byte past the window size slides the window by evicting the oldest byte
/// in O(1).
#[derive(Debug, Clone)]
pub struct RollingHash {
    hash: u64,
    /// HASH_PRIME^(window_size - 1), for removing the evicted byte.
    power: u64,
    window: VecDeque<u8>,
    window_size: usize,
}

impl Default for RollingHash {
    fn default() -> Self {
        RollingHash::new(CHUNK_SIZE)
    }
}

impl RollingHash {
    pub fn new(window_size: usize) -> Self {
        let mut power = 1u64;
        for _ in 0..window_size.saturating_sub(1) {
            power = power * HASH_PRIME % HASH_MOD;
        }

        RollingHash {
            hash: 0,
            power,
            window: VecDeque::with_capacity(window_size),
            window_size,
        }
    }

    pub fn push(&mut self, byte: u8) {
        if self.window.len() >= self.window_size {
            let evicted = self.window.pop_front().unwrap_or_default();
            self.hash =
                (self.hash + HASH_MOD - u64::from(evicted) * self.power % HASH_MOD) % HASH_MOD;
        }
        self.window.push_back(byte);
        self.hash = (self.hash * HASH_PRIME + u64::from(byte)) % HASH_MOD;
    }

    pub fn value(&self) -> u64 {
        self.hash
    }

    pub fn is_full(&self) -> bool {
        self.window.len() >= self.window_size
    }

    /// Hash of a complete block in one shot.
    pub fn hash_block(block: &[u8]) -> u64 {
        let mut hash = 0u64;
        for &byte in block {
            hash = (hash * HASH_PRIME + u64::from(byte)) % HASH_MOD;
        }
        hash
    }
}
