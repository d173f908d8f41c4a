//! Normal distribution `N(μ, σ)`, delegating to `statrs::distribution::Normal`.
use crate::{
    errors::{ReliabilityError, ReliabilityResult},
    random_variables::{
        traits::{Identity, RandomVariable},
        validation::{verify_finite, verify_positive, verify_probability},
    },
};
use statrs::distribution::{Continuous, ContinuousCDF, Normal};

const NAME: &str = "Normal";

#[derive(Debug, Clone)]
pub struct NormalRV {
    identity: Identity,
    mu: f64,
    sigma: f64,
    dist: Normal,
}

impl NormalRV {
    /// Errors
    /// ------
    /// - `ReliabilityError::InvalidDistributionParameter` if `mu` is not
    ///   finite or `sigma` is not finite and strictly positive.
    pub fn new(tag: usize, mu: f64, sigma: f64) -> ReliabilityResult<Self> {
        let mu = verify_finite(NAME, "mu", mu)?;
        let sigma = verify_positive(NAME, "sigma", sigma)?;
        let dist = Normal::new(mu, sigma).map_err(|_| {
            ReliabilityError::InvalidDistributionParameter {
                distribution: NAME,
                parameter: "sigma",
                value: sigma,
                reason: "Rejected by the normal distribution constructor.",
            }
        })?;
        Ok(Self { identity: Identity::new(tag), mu, sigma, dist })
    }

    pub fn with_start_value(mut self, start_value: f64) -> ReliabilityResult<Self> {
        self.identity.set_start_value(NAME, start_value)?;
        Ok(self)
    }
}

impl RandomVariable for NormalRV {
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
        Ok(self.dist.inverse_cdf(verify_probability(p)?))
    }

    fn mean(&self) -> f64 {
        self.mu
    }

    fn stdv(&self) -> f64 {
        self.sigma
    }

    fn start_value(&self) -> f64 {
        self.identity.start_or(self.mu)
    }

    fn parameters(&self) -> Vec<f64> {
        vec![self.mu, self.sigma]
    }
}
