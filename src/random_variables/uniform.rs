//! Uniform distribution on `[a, b]`.
use crate::{
    errors::{ReliabilityError, ReliabilityResult},
    random_variables::{
        traits::{Identity, RandomVariable},
        validation::{verify_finite, verify_probability},
    },
};
use statrs::distribution::{Continuous, ContinuousCDF, Uniform};

const NAME: &str = "Uniform";

#[derive(Debug, Clone)]
pub struct UniformRV {
    identity: Identity,
    a: f64,
    b: f64,
    dist: Uniform,
}

impl UniformRV {
    /// Errors
    /// ------
    /// - `ReliabilityError::InvalidDistributionParameter` unless both bounds
    ///   are finite and `a < b`.
    pub fn new(tag: usize, a: f64, b: f64) -> ReliabilityResult<Self> {
        let a = verify_finite(NAME, "a", a)?;
        let b = verify_finite(NAME, "b", b)?;
        let invalid = || ReliabilityError::InvalidDistributionParameter {
            distribution: NAME,
            parameter: "b",
            value: b,
            reason: "Upper bound must exceed the lower bound.",
        };
        if b <= a {
            return Err(invalid());
        }
        let dist = Uniform::new(a, b).map_err(|_| invalid())?;
        Ok(Self { identity: Identity::new(tag), a, b, dist })
    }

    pub fn with_start_value(mut self, start_value: f64) -> ReliabilityResult<Self> {
        self.identity.set_start_value(NAME, start_value)?;
        Ok(self)
    }
}

impl RandomVariable for UniformRV {
    fn tag(&self) -> usize {
        self.identity.tag
    }

    fn type_name(&self) -> &'static str {
        NAME
    }

    fn pdf_value(&self, x: f64) -> f64 {
        self.dist.pdf(x)
    }

    fn cdf_value(&self, x: f64) -> f64 {
        self.dist.cdf(x)
    }

    fn inverse_cdf_value(&self, p: f64) -> ReliabilityResult<f64> {
        let p = verify_probability(p)?;
        Ok(self.a + p * (self.b - self.a))
    }

    fn mean(&self) -> f64 {
        0.5 * (self.a + self.b)
    }

    fn stdv(&self) -> f64 {
        (self.b - self.a) / 12.0_f64.sqrt()
    }

    fn start_value(&self) -> f64 {
        self.identity.start_or(self.mean())
    }

    fn parameters(&self) -> Vec<f64> {
        vec![self.a, self.b]
    }
}
