//! Gamma distribution with shape `k` and rate `λ`.
//!
//! Density and CDF come from `statrs::distribution::Gamma`; the quantile has
//! no closed form and is found by bisection on the CDF.
use crate::{
    errors::{ReliabilityError, ReliabilityResult},
    random_variables::{
        inverse::bisect_inverse_cdf,
        traits::{Identity, RandomVariable},
        validation::verify_positive,
    },
};
use statrs::distribution::{Continuous, ContinuousCDF, Gamma};

const NAME: &str = "Gamma";

#[derive(Debug, Clone)]
pub struct GammaRV {
    identity: Identity,
    k: f64,
    lambda: f64,
    dist: Gamma,
}

impl GammaRV {
    pub fn new(tag: usize, k: f64, lambda: f64) -> ReliabilityResult<Self> {
        let k = verify_positive(NAME, "k", k)?;
        let lambda = verify_positive(NAME, "lambda", lambda)?;
        let dist = Gamma::new(k, lambda).map_err(|_| ReliabilityError::InvalidDistributionParameter {
            distribution: NAME,
            parameter: "k",
            value: k,
            reason: "Rejected by the gamma distribution constructor.",
        })?;
        Ok(Self { identity: Identity::new(tag), k, lambda, dist })
    }

    pub fn with_start_value(mut self, start_value: f64) -> ReliabilityResult<Self> {
        self.identity.set_start_value(NAME, start_value)?;
        Ok(self)
    }
}

impl RandomVariable for GammaRV {
    fn tag(&self) -> usize {
        self.identity.tag
    }

    fn type_name(&self) -> &'static str {
        NAME
    }

    fn pdf_value(&self, x: f64) -> f64 {
        if x <= 0.0 { 0.0 } else { self.dist.pdf(x) }
    }

    fn cdf_value(&self, x: f64) -> f64 {
        if x <= 0.0 { 0.0 } else { self.dist.cdf(x) }
    }

    fn inverse_cdf_value(&self, p: f64) -> ReliabilityResult<f64> {
        let cdf = |x: f64| self.cdf_value(x);
        bisect_inverse_cdf(&cdf, p, 0.0, self.mean() + 5.0 * self.stdv())
    }

    fn mean(&self) -> f64 {
        self.k / self.lambda
    }

    fn stdv(&self) -> f64 {
        self.k.sqrt() / self.lambda
    }

    fn start_value(&self) -> f64 {
        self.identity.start_or(self.mean())
    }

    fn parameters(&self) -> Vec<f64> {
        vec![self.k, self.lambda]
    }
}
