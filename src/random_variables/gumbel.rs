//! Type-I largest value (Gumbel) distribution:
//! `F(x) = exp(−exp(−α (x − u)))`.
//!
//! All functions are closed form.
use crate::{
    errors::ReliabilityResult,
    random_variables::{
        traits::{Identity, RandomVariable},
        validation::{verify_finite, verify_positive, verify_probability},
    },
};
use std::f64::consts::PI;

const NAME: &str = "Type1LargestValue";

/// Euler–Mascheroni constant.
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

#[derive(Debug, Clone)]
pub struct GumbelRV {
    identity: Identity,
    u: f64,
    alpha: f64,
}

impl GumbelRV {
    /// Location `u`, inverse scale `alpha > 0`.
    pub fn new(tag: usize, u: f64, alpha: f64) -> ReliabilityResult<Self> {
        let u = verify_finite(NAME, "u", u)?;
        let alpha = verify_positive(NAME, "alpha", alpha)?;
        Ok(Self { identity: Identity::new(tag), u, alpha })
    }

    pub fn with_start_value(mut self, start_value: f64) -> ReliabilityResult<Self> {
        self.identity.set_start_value(NAME, start_value)?;
        Ok(self)
    }
}

impl RandomVariable for GumbelRV {
    fn tag(&self) -> usize {
        self.identity.tag
    }

    fn type_name(&self) -> &'static str {
        NAME
    }

    fn pdf_value(&self, x: f64) -> f64 {
        let t = (-self.alpha * (x - self.u)).exp();
        let pdf = self.alpha * t * (-t).exp();
        if pdf.is_finite() { pdf } else { 0.0 }
    }

    fn cdf_value(&self, x: f64) -> f64 {
        (-(-self.alpha * (x - self.u)).exp()).exp()
    }

    fn inverse_cdf_value(&self, p: f64) -> ReliabilityResult<f64> {
        let p = verify_probability(p)?;
        Ok(self.u - (-p.ln()).ln() / self.alpha)
    }

    fn mean(&self) -> f64 {
        self.u + EULER_GAMMA / self.alpha
    }

    fn stdv(&self) -> f64 {
        PI / (self.alpha * 6.0_f64.sqrt())
    }

    fn start_value(&self) -> f64 {
        self.identity.start_or(self.mean())
    }

    fn parameters(&self) -> Vec<f64> {
        vec![self.u, self.alpha]
    }
}
