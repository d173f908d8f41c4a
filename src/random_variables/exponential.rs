//! Shifted exponential distribution with rate `λ` and origin `x0`:
//! `F(x) = 1 − exp(−λ (x − x0))` for `x ≥ x0`.
use crate::{
    errors::{ReliabilityError, ReliabilityResult},
    random_variables::{
        traits::{Identity, RandomVariable},
        validation::{verify_finite, verify_positive, verify_probability},
    },
};
use statrs::distribution::{Continuous, ContinuousCDF, Exp};

const NAME: &str = "Exponential";

#[derive(Debug, Clone)]
pub struct ExponentialRV {
    identity: Identity,
    lambda: f64,
    x0: f64,
    dist: Exp,
}

impl ExponentialRV {
    pub fn new(tag: usize, lambda: f64, x0: f64) -> ReliabilityResult<Self> {
        let lambda = verify_positive(NAME, "lambda", lambda)?;
        let x0 = verify_finite(NAME, "x0", x0)?;
        let dist = Exp::new(lambda).map_err(|_| ReliabilityError::InvalidDistributionParameter {
            distribution: NAME,
            parameter: "lambda",
            value: lambda,
            reason: "Rejected by the exponential distribution constructor.",
        })?;
        Ok(Self { identity: Identity::new(tag), lambda, x0, dist })
    }

    pub fn with_start_value(mut self, start_value: f64) -> ReliabilityResult<Self> {
        self.identity.set_start_value(NAME, start_value)?;
        Ok(self)
    }
}

impl RandomVariable for ExponentialRV {
    fn tag(&self) -> usize {
        self.identity.tag
    }

    fn type_name(&self) -> &'static str {
        NAME
    }

    fn pdf_value(&self, x: f64) -> f64 {
        if x < self.x0 { 0.0 } else { self.dist.pdf(x - self.x0) }
    }

    fn cdf_value(&self, x: f64) -> f64 {
        if x <= self.x0 { 0.0 } else { self.dist.cdf(x - self.x0) }
    }

    fn inverse_cdf_value(&self, p: f64) -> ReliabilityResult<f64> {
        let p = verify_probability(p)?;
        Ok(self.x0 - (-p).ln_1p() / self.lambda)
    }

    fn mean(&self) -> f64 {
        self.x0 + 1.0 / self.lambda
    }

    fn stdv(&self) -> f64 {
        1.0 / self.lambda
    }

    fn start_value(&self) -> f64 {
        self.identity.start_or(self.mean())
    }

    fn parameters(&self) -> Vec<f64> {
        vec![self.lambda, self.x0]
    }
}
