//! Park-Miller Linear Congruential Generator (MINSTD)
//!
//! The single random source of a game. Generation draws every neighbour
//! choice, side and edge cell from it, so replaying a seed replays the
//! whole sequence of mazes, regenerations included.
//!
//! Constants:
//! - Multiplier (a): 48271
//! - Modulus (m): 2^31 - 1 = 2147483647
//!
//! Reference: https://en.wikipedia.org/wiki/Lehmer_random_number_generator

use std::time::{SystemTime, UNIX_EPOCH};

const A: u64 = 48271;
const M: u64 = 2147483647; // 2^31 - 1

/// Park-Miller Linear Congruential Generator
///
/// Same seed always produces the same sequence.
#[derive(Debug, Clone)]
pub struct SimpleLCG {
    state: u32,
}

impl SimpleLCG {
    /// Create a new LCG with the given seed
    ///
    /// If seed is 0, it's replaced with 1 to avoid degenerate sequence
    pub fn new(seed: u32) -> Self {
        let state = (seed as u64 % M) as u32;
        Self {
            state: if state == 0 { 1 } else { state },
        }
    }

    /// Seed from the system clock, for games started without an explicit seed
    pub fn from_time() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
            .unwrap_or(1);
        tracing::debug!("seeding random source from clock: {}", nanos);
        Self::new(nanos)
    }

    fn advance(&mut self) {
        // u64 keeps state * A from overflowing
        self.state = ((self.state as u64 * A) % M) as u32;
    }

    /// Choose random index from a range [0, len)
    ///
    /// Integer-only: `(state * len) / M`, which is always below `len`
    /// because the state never reaches M.
    pub fn choice_index(&mut self, len: usize) -> usize {
        self.advance();

        let scaled = (self.state as u64 * len as u64) / M;
        scaled as usize
    }
}
