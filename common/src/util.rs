use serde::{Deserialize, Serialize};

// Simple pseudorandom number generator using xorshift algorithm
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PseudoRandom {
    state: u64,
}

impl PseudoRandom {
    pub fn new(seed: u64) -> Self {
        // Ensure we don't start with 0 state as xorshift doesn't work with 0
        let state = if seed == 0 { 0x1234567890abcdef } else { seed };
        PseudoRandom { state }
    }

    pub fn next_u64(&mut self) -> u64 {
        // xorshift64 algorithm
        self.state ^= self.state << 13;
        self.state ^= self.state >> 17;
        self.state ^= self.state << 5;
        self.state
    }

    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Generate a random f32 in range [0.0, 1.0)
    pub fn next_f32(&mut self) -> f32 {
        // Use upper 24 bits of next_u32 for better distribution
        let value = (self.next_u32() >> 8) as f32;
        value / 16777216.0 // 2^24
    }

    /// Uniform index into a collection of `len` elements. `len` must be non-zero.
    pub fn next_index(&mut self, len: usize) -> usize {
        (self.next_u64() % len as u64) as usize
    }

    pub fn chance(&mut self, probability: f32) -> bool {
        self.next_f32() < probability
    }
}
