//! Weibull distribution with scale `u` and shape `k`:
//! `F(x) = 1 − exp(−(x/u)^k)` for `x ≥ 0`.
use crate::{
    errors::{ReliabilityError, ReliabilityResult},
    random_variables::{
        traits::{Identity, RandomVariable},
        validation::{verify_positive, verify_probability},
    },
};
use statrs::{
    distribution::{Continuous, ContinuousCDF, Weibull},
    function::gamma::gamma,
};

const NAME: &str = "Weibull";

#[derive(Debug, Clone)]
pub struct WeibullRV {
    identity: Identity,
    u: f64,
    k: f64,
    dist: Weibull,
}

impl WeibullRV {
    pub fn new(tag: usize, u: f64, k: f64) -> ReliabilityResult<Self> {
        let u = verify_positive(NAME, "u", u)?;
        let k = verify_positive(NAME, "k", k)?;
        // statrs orders the arguments (shape, scale).
        let dist = Weibull::new(k, u).map_err(|_| ReliabilityError::InvalidDistributionParameter {
            distribution: NAME,
            parameter: "k",
            value: k,
            reason: "Rejected by the Weibull distribution constructor.",
        })?;
        Ok(Self { identity: Identity::new(tag), u, k, dist })
    }

    pub fn with_start_value(mut self, start_value: f64) -> ReliabilityResult<Self> {
        self.identity.set_start_value(NAME, start_value)?;
        Ok(self)
    }
}

impl RandomVariable for WeibullRV {
    fn tag(&self) -> usize {
        self.identity.tag
    }

    fn type_name(&self) -> &'static str {
        NAME
    }

    fn pdf_value(&self, x: f64) -> f64 {
        if x < 0.0 { 0.0 } else { self.dist.pdf(x) }
    }

    fn cdf_value(&self, x: f64) -> f64 {
        if x <= 0.0 { 0.0 } else { self.dist.cdf(x) }
    }

    fn inverse_cdf_value(&self, p: f64) -> ReliabilityResult<f64> {
        let p = verify_probability(p)?;
        Ok(self.u * (-(-p).ln_1p()).powf(1.0 / self.k))
    }

    fn mean(&self) -> f64 {
        self.u * gamma(1.0 + 1.0 / self.k)
    }

    fn stdv(&self) -> f64 {
        let g1 = gamma(1.0 + 1.0 / self.k);
        let g2 = gamma(1.0 + 2.0 / self.k);
        self.u * (g2 - g1 * g1).max(0.0).sqrt()
    }

    fn start_value(&self) -> f64 {
        self.identity.start_or(self.mean())
    }

    fn parameters(&self) -> Vec<f64> {
        vec![self.u, self.k]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    // Purpose
    // -------
    // With `k = 1` the Weibull reduces to an exponential with mean `u`.
    fn weibull_with_unit_shape_is_exponential() {
        let rv = WeibullRV::new(6, 3.0, 1.0).unwrap();
        assert_relative_eq!(rv.mean(), 3.0, max_relative = 1e-12);
        assert_relative_eq!(rv.stdv(), 3.0, max_relative = 1e-10);
        assert_relative_eq!(rv.cdf_value(3.0), 1.0 - (-1.0_f64).exp(), max_relative = 1e-12);
        let x = rv.inverse_cdf_value(rv.cdf_value(2.0)).unwrap();
        assert_relative_eq!(x, 2.0, max_relative = 1e-12);
    }
}
