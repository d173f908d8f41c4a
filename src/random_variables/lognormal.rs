//! Lognormal distribution: `ln X ~ N(λ, ζ)`.
//!
//! Density and CDF come from `statrs::distribution::LogNormal`; the quantile
//! is `exp(λ + ζ Φ⁻¹(p))`. [`LognormalRV::from_mean_stdv`] converts the
//! physical mean and standard deviation into `(λ, ζ)`.
use crate::{
    errors::{ReliabilityError, ReliabilityResult},
    random_variables::{
        traits::{Identity, RandomVariable},
        validation::{verify_finite, verify_positive, verify_probability},
    },
};
use statrs::distribution::{Continuous, ContinuousCDF, LogNormal, Normal};

const NAME: &str = "Lognormal";

#[derive(Debug, Clone)]
pub struct LognormalRV {
    identity: Identity,
    lambda: f64,
    zeta: f64,
    dist: LogNormal,
    std_normal: Normal,
}

impl LognormalRV {
    pub fn new(tag: usize, lambda: f64, zeta: f64) -> ReliabilityResult<Self> {
        let lambda = verify_finite(NAME, "lambda", lambda)?;
        let zeta = verify_positive(NAME, "zeta", zeta)?;
        let rejected = || ReliabilityError::InvalidDistributionParameter {
            distribution: NAME,
            parameter: "zeta",
            value: zeta,
            reason: "Rejected by the lognormal distribution constructor.",
        };
        let dist = LogNormal::new(lambda, zeta).map_err(|_| rejected())?;
        let std_normal = Normal::new(0.0, 1.0).map_err(|_| rejected())?;
        Ok(Self { identity: Identity::new(tag), lambda, zeta, dist, std_normal })
    }

    /// Construct from the mean and standard deviation of `X`.
    ///
    /// `ζ² = ln(1 + (σ/μ)²)`, `λ = ln μ − ζ²/2`.
    ///
    /// Errors
    /// ------
    /// - `ReliabilityError::InvalidDistributionParameter` unless both
    ///   `mean` and `stdv` are finite and strictly positive.
    pub fn from_mean_stdv(tag: usize, mean: f64, stdv: f64) -> ReliabilityResult<Self> {
        let mean = verify_positive(NAME, "mean", mean)?;
        let stdv = verify_positive(NAME, "stdv", stdv)?;
        let zeta_sq = (1.0 + (stdv / mean).powi(2)).ln();
        Self::new(tag, mean.ln() - 0.5 * zeta_sq, zeta_sq.sqrt())
    }

    pub fn with_start_value(mut self, start_value: f64) -> ReliabilityResult<Self> {
        self.identity.set_start_value(NAME, start_value)?;
        Ok(self)
    }
}

impl RandomVariable for LognormalRV {
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
        let z = self.std_normal.inverse_cdf(verify_probability(p)?);
        Ok((self.lambda + self.zeta * z).exp())
    }

    fn mean(&self) -> f64 {
        (self.lambda + 0.5 * self.zeta * self.zeta).exp()
    }

    fn stdv(&self) -> f64 {
        self.mean() * ((self.zeta * self.zeta).exp() - 1.0).sqrt()
    }

    fn start_value(&self) -> f64 {
        self.identity.start_or(self.mean())
    }

    fn parameters(&self) -> Vec<f64> {
        vec![self.lambda, self.zeta]
    }
}
