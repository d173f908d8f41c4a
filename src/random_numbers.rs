//! random_numbers — seeded generators of independent standard-normal and
//! uniform samples.
//!
//! Purpose
//! -------
//! Provide the [`RandomNumberGenerator`] interface and a `SmallRng`-backed
//! implementation used to draw start points and sampling realizations.
//!
//! Key behaviors
//! -------------
//! - Each `generate_*` call produces exactly `n` values, stores them (see
//!   [`RandomNumberGenerator::generated_numbers`]) and returns a copy.
//! - Standard normals are produced by the inverse-CDF method applied to
//!   uniforms drawn from the open interval `(0, 1)`.
//!
//! Conventions
//! -----------
//! - `seed == 0` continues the current stream without reseeding.
//! - A fresh generator is seeded with [`DEFAULT_SEED`], so two fresh
//!   generators called with `seed == 0` produce the same sequence.
//! - Any non-zero seed reseeds deterministically; [`RandomNumberGenerator::seed`]
//!   reports the seed of the last (re)seeding.
use crate::errors::{ReliabilityError, ReliabilityResult};
use ndarray::Array1;
use rand::{Rng, SeedableRng, rngs::SmallRng};
use statrs::distribution::{ContinuousCDF, Normal};

/// Seed of a freshly constructed generator.
pub const DEFAULT_SEED: u64 = 1;

pub trait RandomNumberGenerator {
    /// Draw `n` independent standard-normal numbers.
    ///
    /// Errors
    /// ------
    /// - `ReliabilityError::InvalidCount` when `n == 0`.
    fn generate_n_independent_std_normal_numbers(
        &mut self, n: usize, seed: u64,
    ) -> ReliabilityResult<Array1<f64>>;

    /// Draw `n` independent numbers uniform on `[lower, upper)`.
    ///
    /// Errors
    /// ------
    /// - `ReliabilityError::InvalidCount` when `n == 0`.
    /// - `ReliabilityError::InvalidRange` unless both bounds are finite and
    ///   `lower < upper`.
    fn generate_n_independent_uniform_numbers(
        &mut self, n: usize, lower: f64, upper: f64, seed: u64,
    ) -> ReliabilityResult<Array1<f64>>;

    /// Numbers produced by the last successful `generate_*` call.
    fn generated_numbers(&self) -> &Array1<f64>;

    /// Seed in effect.
    fn seed(&self) -> u64;
}

#[derive(Debug, Clone)]
pub struct SmallRngGenerator {
    rng: SmallRng,
    seed: u64,
    generated: Array1<f64>,
}

impl SmallRngGenerator {
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self { rng: SmallRng::seed_from_u64(seed), seed, generated: Array1::zeros(0) }
    }

    fn reseed(&mut self, seed: u64) {
        if seed != 0 {
            self.rng = SmallRng::seed_from_u64(seed);
            self.seed = seed;
        }
    }

    /// Uniform draw from the open interval `(0, 1)`.
    fn open_unit(&mut self) -> f64 {
        loop {
            let v: f64 = self.rng.random();
            if v > 0.0 {
                return v;
            }
        }
    }
}

impl Default for SmallRngGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomNumberGenerator for SmallRngGenerator {
    fn generate_n_independent_std_normal_numbers(
        &mut self, n: usize, seed: u64,
    ) -> ReliabilityResult<Array1<f64>> {
        verify_count(n)?;
        let std_normal = Normal::new(0.0, 1.0)
            .map_err(|e| ReliabilityError::BackendError { text: e.to_string() })?;
        self.reseed(seed);
        let numbers: Array1<f64> =
            (0..n).map(|_| std_normal.inverse_cdf(self.open_unit())).collect();
        self.generated = numbers.clone();
        Ok(numbers)
    }

    fn generate_n_independent_uniform_numbers(
        &mut self, n: usize, lower: f64, upper: f64, seed: u64,
    ) -> ReliabilityResult<Array1<f64>> {
        verify_count(n)?;
        if !lower.is_finite() || !upper.is_finite() || lower >= upper {
            return Err(ReliabilityError::InvalidRange { lower, upper });
        }
        self.reseed(seed);
        let numbers: Array1<f64> = (0..n).map(|_| self.rng.random_range(lower..upper)).collect();
        self.generated = numbers.clone();
        Ok(numbers)
    }

    fn generated_numbers(&self) -> &Array1<f64> {
        &self.generated
    }

    fn seed(&self) -> u64 {
        self.seed
    }
}

fn verify_count(n: usize) -> ReliabilityResult<()> {
    if n == 0 {
        return Err(ReliabilityError::InvalidCount {
            n,
            reason: "At least one number must be generated.",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Exact output length and storage of the last sequence.
    // - The seed convention (0 continues, non-zero reseeds, fresh = 1).
    // - Error paths for n == 0 and inverted ranges.
    //
    // They intentionally DO NOT cover:
    // - Statistical quality of SmallRng beyond a coarse moment check.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // The same non-zero seed reproduces the same sequence; seed 0 continues.
    //
    // Given
    // -----
    // - Two generators, both asked for 5 normals with seed 42.
    //
    // Expect
    // ------
    // - Identical sequences; a follow-up call with seed 0 differs from the
    //   first sequence and `seed()` still reports 42.
    fn same_seed_reproduces_and_zero_continues() {
        // Arrange
        let mut a = SmallRngGenerator::new();
        let mut b = SmallRngGenerator::with_seed(7);

        // Act
        let first = a.generate_n_independent_std_normal_numbers(5, 42).unwrap();
        let again = b.generate_n_independent_std_normal_numbers(5, 42).unwrap();
        let next = a.generate_n_independent_std_normal_numbers(5, 0).unwrap();

        // Assert
        assert_eq!(first, again);
        assert_ne!(first, next);
        assert_eq!(a.seed(), 42);
        assert_eq!(a.generated_numbers(), &next);
    }

    #[test]
    // Purpose
    // -------
    // Fresh generators start from the default seed.
    fn fresh_generators_are_reproducible() {
        let mut a = SmallRngGenerator::new();
        let mut b = SmallRngGenerator::default();
        let x = a.generate_n_independent_uniform_numbers(4, -1.0, 1.0, 0).unwrap();
        let y = b.generate_n_independent_uniform_numbers(4, -1.0, 1.0, 0).unwrap();
        assert_eq!(x, y);
        assert_eq!(a.seed(), DEFAULT_SEED);
        assert!(x.iter().all(|v| (-1.0..1.0).contains(v)));
    }

    #[test]
    fn invalid_count_and_range_are_rejected() {
        let mut rng = SmallRngGenerator::new();
        assert!(matches!(
            rng.generate_n_independent_std_normal_numbers(0, 1),
            Err(ReliabilityError::InvalidCount { n: 0, .. })
        ));
        assert!(matches!(
            rng.generate_n_independent_uniform_numbers(3, 2.0, 1.0, 1),
            Err(ReliabilityError::InvalidRange { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Large normal samples have roughly zero mean and unit variance.
    fn normal_sample_moments_are_plausible() {
        let mut rng = SmallRngGenerator::new();
        let z = rng.generate_n_independent_std_normal_numbers(20_000, 123).unwrap();
        let mean = z.mean().unwrap();
        let var = z.mapv(|v| (v - mean).powi(2)).sum() / (z.len() as f64 - 1.0);
        assert_eq!(z.len(), 20_000);
        assert!(mean.abs() < 0.05);
        assert!((var - 1.0).abs() < 0.05);
    }
}
