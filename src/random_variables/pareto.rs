//! Pareto distribution with shape `k` and scale `u`:
//! `F(x) = 1 − (u/x)^k` for `x ≥ u`.
//!
//! The mean is infinite for `k ≤ 1` and the standard deviation for `k ≤ 2`;
//! the default start value then falls back to the median `u·2^{1/k}`.
use crate::{
    errors::{ReliabilityError, ReliabilityResult},
    random_variables::{
        traits::{Identity, RandomVariable},
        validation::{verify_positive, verify_probability},
    },
};
use statrs::distribution::{Continuous, ContinuousCDF, Pareto};

const NAME: &str = "Pareto";

#[derive(Debug, Clone)]
pub struct ParetoRV {
    identity: Identity,
    k: f64,
    u: f64,
    dist: Pareto,
}

impl ParetoRV {
    /// Errors
    /// ------
    /// - `ReliabilityError::InvalidDistributionParameter` unless `k > 0`
    ///   and `u > 0`, both finite.
    pub fn new(tag: usize, k: f64, u: f64) -> ReliabilityResult<Self> {
        let k = verify_positive(NAME, "k", k)?;
        let u = verify_positive(NAME, "u", u)?;
        // statrs orders the arguments (scale, shape).
        let dist = Pareto::new(u, k).map_err(|_| ReliabilityError::InvalidDistributionParameter {
            distribution: NAME,
            parameter: "k",
            value: k,
            reason: "Rejected by the Pareto distribution constructor.",
        })?;
        Ok(Self { identity: Identity::new(tag), k, u, dist })
    }

    pub fn with_start_value(mut self, start_value: f64) -> ReliabilityResult<Self> {
        self.identity.set_start_value(NAME, start_value)?;
        Ok(self)
    }

    fn median(&self) -> f64 {
        self.u * 2.0_f64.powf(1.0 / self.k)
    }
}

impl RandomVariable for ParetoRV {
    fn tag(&self) -> usize {
        self.identity.tag
    }

    fn type_name(&self) -> &'static str {
        NAME
    }

    fn pdf_value(&self, x: f64) -> f64 {
        if x < self.u { 0.0 } else { self.dist.pdf(x) }
    }

    fn cdf_value(&self, x: f64) -> f64 {
        if x <= self.u { 0.0 } else { self.dist.cdf(x) }
    }

    fn inverse_cdf_value(&self, p: f64) -> ReliabilityResult<f64> {
        let p = verify_probability(p)?;
        Ok(self.u * (1.0 - p).powf(-1.0 / self.k))
    }

    fn mean(&self) -> f64 {
        if self.k > 1.0 { self.k * self.u / (self.k - 1.0) } else { f64::INFINITY }
    }

    fn stdv(&self) -> f64 {
        if self.k > 2.0 {
            self.u / (self.k - 1.0) * (self.k / (self.k - 2.0)).sqrt()
        } else {
            f64::INFINITY
        }
    }

    fn start_value(&self) -> f64 {
        let mean = self.mean();
        self.identity.start_or(if mean.is_finite() { mean } else { self.median() })
    }

    fn parameters(&self) -> Vec<f64> {
        vec![self.k, self.u]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    // Purpose
    // -------
    // Finite moments for `k > 2`; heavy tails fall back to the median.
    //
    // Given
    // -----
    // - `Pareto(k = 3, u = 2)` and `Pareto(k = 0.5, u = 2)`.
    //
    // Expect
    // ------
    // - Mean 3 and stdv `√3` for the first; infinite mean and a start value
    //   equal to the median `u·2^{1/k} = 8` for the second.
    fn pareto_moments_and_heavy_tail_start_value() {
        // Arrange
        let light = ParetoRV::new(7, 3.0, 2.0).unwrap();
        let heavy = ParetoRV::new(8, 0.5, 2.0).unwrap();

        // Act / Assert
        assert_relative_eq!(light.mean(), 3.0, max_relative = 1e-14);
        assert_relative_eq!(light.stdv(), 3.0_f64.sqrt(), max_relative = 1e-14);
        assert!(heavy.mean().is_infinite());
        assert_relative_eq!(heavy.start_value(), 8.0, max_relative = 1e-14);
        let x = heavy.inverse_cdf_value(0.3).unwrap();
        assert_relative_eq!(heavy.cdf_value(x), 0.3, max_relative = 1e-12);
    }

    #[test]
    fn pareto_requires_positive_shape_and_scale() {
        assert!(ParetoRV::new(1, 0.0, 1.0).is_err());
        assert!(ParetoRV::new(1, 1.0, -1.0).is_err());
    }
}
