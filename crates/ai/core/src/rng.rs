//! Deterministic random stream shared by every agent of one simulation.
//!
//! All randomized AI parameters (cooldowns, flee durations, flank angles,
//! weighted power picks, random target selection) draw from a single
//! [`GameRandom`] owned by the simulation, so replaying the same seed and the
//! same world inputs reproduces every decision.
//!
//! # Determinism
//!
//! The generator is a PCG-XSH-RR stream: 64-bit LCG state, 32-bit permuted
//! output. No floating point enters the state update.

/// PCG random stream (Permuted Congruential Generator).
///
/// # Properties
///
/// - **Deterministic**: Same seed always produces the same sequence
/// - **Fast**: Single multiply + xorshift + rotate per draw
/// - **Small state**: Only 64 bits, cheap to snapshot for replays
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameRandom {
    state: u64,
}

impl GameRandom {
    /// PCG multiplier constant.
    const MULTIPLIER: u64 = 6364136223846793005;

    /// PCG increment constant.
    const INCREMENT: u64 = 1442695040888963407;

    pub fn new(seed: u64) -> Self {
        let mut rng = Self { state: 0 };
        rng.step();
        rng.state = rng.state.wrapping_add(seed);
        rng.step();
        rng
    }

    /// Raw generator state, for snapshots.
    pub fn state(&self) -> u64 {
        self.state
    }

    #[inline]
    fn step(&mut self) {
        self.state = self
            .state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT);
    }

    /// PCG output function using XSH-RR (xorshift high, random rotate).
    #[inline]
    fn output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    pub fn next_u32(&mut self) -> u32 {
        let old = self.state;
        self.step();
        Self::output(old)
    }

    /// Uniform float in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        // 24 mantissa bits keep the result strictly below 1.0.
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Uniform integer in `[min, max]` inclusive. Returns `min` when the
    /// bounds are inverted or equal.
    pub fn range_u64(&mut self, min: u64, max: u64) -> u64 {
        if min >= max {
            return min;
        }
        let span = max - min;
        if span < u32::MAX as u64 {
            min + (self.next_u32() as u64 % (span + 1))
        } else {
            let wide = ((self.next_u32() as u64) << 32) | self.next_u32() as u64;
            min + wide % span.saturating_add(1).max(1)
        }
    }

    /// Uniform integer in `[min, max]` inclusive.
    pub fn range_i32(&mut self, min: i32, max: i32) -> i32 {
        if min >= max {
            return min;
        }
        let span = (max as i64 - min as i64) as u64;
        (min as i64 + self.range_u64(0, span) as i64) as i32
    }

    /// Uniform float in `[min, max)`. Returns `min` when the bounds are
    /// inverted or equal.
    pub fn range_f32(&mut self, min: f32, max: f32) -> f32 {
        if min >= max {
            return min;
        }
        min + (max - min) * self.next_f32()
    }

    /// Returns true with probability `chance` (clamped to `[0, 1]`).
    pub fn chance(&mut self, chance: f32) -> bool {
        if chance <= 0.0 {
            return false;
        }
        if chance >= 1.0 {
            return true;
        }
        self.next_f32() < chance
    }

    /// Picks an index proportionally to `weights`.
    ///
    /// Returns `None` for an empty slice. When every weight is zero the
    /// first index is returned so callers still make progress.
    pub fn pick_weighted(&mut self, weights: &[u32]) -> Option<usize> {
        if weights.is_empty() {
            return None;
        }
        let total: u64 = weights.iter().map(|&w| w as u64).sum();
        if total == 0 {
            return Some(0);
        }
        let mut roll = self.range_u64(0, total - 1);
        for (index, &weight) in weights.iter().enumerate() {
            if roll < weight as u64 {
                return Some(index);
            }
            roll -= weight as u64;
        }
        Some(weights.len() - 1)
    }
}

/// Compute a deterministic seed from simulation components.
///
/// Combines a base game seed with a region or encounter discriminator so
/// separate simulations started from the same save diverge predictably.
pub fn compute_seed(game_seed: u64, region: u32, context: u32) -> u64 {
    let mut hash = game_seed;

    hash ^= (region as u64).wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (context as u64).wrapping_mul(0x517cc1b727220a95);

    // Final avalanche step
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}
