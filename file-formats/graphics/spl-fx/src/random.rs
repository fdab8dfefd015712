//! Deterministic random engine.
//!
//! Wraps a seeded PCG generator and provides the distributions particle
//! emission needs. In [`RandomMode::Accurate`] the ranged draws reproduce the
//! hardware's 20.12 fixed-point arithmetic bit for bit, including its
//! truncation toward the lower end of every range.

use glam::Vec3;
use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

use crate::fx::{to_fixed, to_float};

/// How ranged random values are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RandomMode {
    /// Fixed-point formulas matching the hardware
    #[default]
    Accurate,
    /// Plain floating-point interpolation
    Float,
}

/// Random number source for the simulation
#[derive(Debug, Clone)]
pub struct SplRandom {
    rng: Pcg64Mcg,
    crc_seed: u32,
    mode: RandomMode,
}

impl SplRandom {
    /// Create an engine in accurate mode from an explicit seed
    pub fn new(seed: u64) -> Self {
        Self::with_mode(seed, RandomMode::Accurate)
    }

    /// Create an engine from an explicit seed and mode
    pub fn with_mode(seed: u64, mode: RandomMode) -> Self {
        Self {
            rng: Pcg64Mcg::seed_from_u64(seed),
            crc_seed: !0,
            mode,
        }
    }

    /// Create an accurate-mode engine seeded from system entropy
    pub fn from_entropy() -> Self {
        Self::new(rand::rng().random())
    }

    /// Current mode
    pub fn mode(&self) -> RandomMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: RandomMode) {
        self.mode = mode;
    }

    /// Next uniformly distributed `u64`
    pub fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    /// Next uniformly distributed `u32`
    pub fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    /// The top `bits` bits of the next `u32`
    pub fn next_bits(&mut self, bits: u32) -> u32 {
        self.next_u32().checked_shr(32 - bits.min(32)).unwrap_or(0)
    }

    /// Uniform float in `[0, 1)`
    pub fn next_f32(&mut self) -> f32 {
        self.rng.random()
    }

    /// Uniform float in `[-1, 1)`
    pub fn next_f32_signed(&mut self) -> f32 {
        self.next_f32() * 2.0 - 1.0
    }

    /// Uniform float in `[min, max)`
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Random direction; a zero-length draw yields the X axis
    pub fn unit_vector(&mut self) -> Vec3 {
        let x = self.next_f32_signed();
        let y = self.next_f32_signed();
        let z = self.next_f32_signed();
        Vec3::new(x, y, z).normalize_or(Vec3::X)
    }

    /// Random direction in the XY plane; a zero-length draw yields the X axis
    pub fn unit_xy(&mut self) -> Vec3 {
        let x = self.next_f32_signed();
        let y = self.next_f32_signed();
        Vec3::new(x, y, 0.0).normalize_or(Vec3::X)
    }

    /// CRC-32 of the next `u64`, chained through the previous hash
    pub fn crc_hash(&mut self) -> u32 {
        let value = self.next_u64();
        let mut hasher = crc32fast::Hasher::new_with_initial(self.crc_seed);
        hasher.update(&value.to_le_bytes());
        self.crc_seed = hasher.finalize();
        self.crc_seed
    }

    /// Value in `[n·(1 − v/2), n·(1 + v/2)]` for a variance `v` in `[0, 1]`
    ///
    /// Accurate mode scales `n` by `(255 − v·r)/256` for a random byte `r`,
    /// so the result never exceeds `n·255/256`.
    pub fn scaled_range(&mut self, n: f32, variance: f32) -> f32 {
        match self.mode {
            RandomMode::Accurate => {
                let nx = to_fixed(n);
                let range = (variance * 255.0) as i32;
                let r = self.next_bits(8) as i32;
                let factor = 255 - (range.wrapping_mul(r) >> 8);
                to_float(nx.wrapping_mul(factor) >> 8)
            }
            RandomMode::Float => {
                let variance = variance.clamp(0.0, 1.0);
                let min = n * (1.0 - variance / 2.0);
                let max = n * (1.0 + variance / 2.0);
                self.range(min, max)
            }
        }
    }

    /// Value in `[n, n·(1 + v)]`
    pub fn scaled_range2(&mut self, n: f32, variance: f32) -> f32 {
        match self.mode {
            RandomMode::Accurate => {
                let nx = to_fixed(n);
                let range = (variance * 255.0) as i32;
                let r = self.next_bits(8) as i32;
                let factor = 255 + range - (range.wrapping_mul(r) >> 7);
                to_float(nx.wrapping_mul(factor) >> 8)
            }
            RandomMode::Float => self.range(n, n * (1.0 + variance)),
        }
    }

    /// Value in `[-range, range]`
    pub fn around_zero(&mut self, range: f32) -> f32 {
        match self.mode {
            RandomMode::Accurate => {
                let rx = i64::from(to_fixed(range));
                let r = i64::from(self.next_bits(9));
                to_float(((rx * r - (rx << 8)) >> 8) as i32)
            }
            RandomMode::Float => self.range(-range, range),
        }
    }

    /// Vector with every component drawn from [`around_zero`](Self::around_zero)
    pub fn around_zero_vec(&mut self, range: Vec3) -> Vec3 {
        let x = self.around_zero(range.x);
        let y = self.around_zero(range.y);
        let z = self.around_zero(range.z);
        Vec3::new(x, y, z)
    }
}

impl Default for SplRandom {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = SplRandom::new(1234);
        let mut b = SplRandom::new(1234);
        for _ in 0..64 {
            assert_eq!(a.next_u64(), b.next_u64());
            assert_eq!(a.crc_hash(), b.crc_hash());
            assert_eq!(a.scaled_range(3.5, 0.5), b.scaled_range(3.5, 0.5));
            assert_eq!(a.unit_vector(), b.unit_vector());
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = SplRandom::new(1);
        let mut b = SplRandom::new(2);
        let left: Vec<u64> = (0..8).map(|_| a.next_u64()).collect();
        let right: Vec<u64> = (0..8).map(|_| b.next_u64()).collect();
        assert_ne!(left, right);
    }

    #[test]
    fn test_next_bits_width() {
        let mut rng = SplRandom::new(7);
        for _ in 0..256 {
            assert!(rng.next_bits(8) < 256);
            assert!(rng.next_bits(9) < 512);
        }
        assert_eq!(rng.next_bits(0), 0);
    }

    #[test]
    fn test_accurate_zero_variance_keeps_fixed_scale() {
        let mut rng = SplRandom::new(99);
        // 255/256 of the input, truncated in 20.12
        assert_eq!(rng.scaled_range(1.0, 0.0), to_float((4096 * 255) >> 8));
        assert_eq!(rng.scaled_range2(2.0, 0.0), to_float((8192 * 255) >> 8));
    }

    #[test]
    fn test_around_zero_large_range() {
        for seed in 0..64 {
            let mut rng = SplRandom::new(seed);
            let value = rng.around_zero(2000.0);
            assert!((-2000.0..=2000.0).contains(&value), "seed {seed}: {value}");
        }
    }

    #[test]
    fn test_crc_hash_chains_seed() {
        let mut rng = SplRandom::new(5);
        let mut shadow = SplRandom::new(5);
        let first = rng.crc_hash();
        let value = shadow.next_u64();
        let mut hasher = crc32fast::Hasher::new_with_initial(!0);
        hasher.update(&value.to_le_bytes());
        assert_eq!(first, hasher.finalize());

        let second = rng.crc_hash();
        let value = shadow.next_u64();
        let mut hasher = crc32fast::Hasher::new_with_initial(first);
        hasher.update(&value.to_le_bytes());
        assert_eq!(second, hasher.finalize());
    }

    #[test]
    fn test_unit_vectors_are_normalized() {
        let mut rng = SplRandom::new(3);
        for _ in 0..128 {
            assert!((rng.unit_vector().length() - 1.0).abs() < 1e-5);
            let xy = rng.unit_xy();
            assert_eq!(xy.z, 0.0);
            assert!((xy.length() - 1.0).abs() < 1e-5);
        }
    }

    proptest! {
        #[test]
        fn accurate_scaled_range_stays_in_bounds(seed in any::<u64>(), n in 0.0f32..100.0, v in 0.0f32..=1.0) {
            let mut rng = SplRandom::new(seed);
            let value = rng.scaled_range(n, v);
            let tolerance = 2.0 / 4096.0;
            prop_assert!(value >= n * (1.0 - v) * (255.0 / 256.0) - tolerance);
            prop_assert!(value <= n + tolerance);
        }

        #[test]
        fn float_scaled_range_stays_in_bounds(seed in any::<u64>(), n in 0.0f32..100.0, v in 0.0f32..=1.0) {
            let mut rng = SplRandom::with_mode(seed, RandomMode::Float);
            let value = rng.scaled_range(n, v);
            prop_assert!(value >= n * (1.0 - v / 2.0) - 1e-4);
            prop_assert!(value <= n * (1.0 + v / 2.0) + 1e-4);
        }

        #[test]
        fn around_zero_is_bounded(seed in any::<u64>(), range in 0.0f32..100_000.0) {
            let mut rng = SplRandom::new(seed);
            let value = rng.around_zero(range);
            prop_assert!(value.abs() <= range + 1.0 / 4096.0);
        }
    }
}
