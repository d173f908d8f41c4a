//! evaluators::finite_diff — finite-difference gradients scaled to each
//! random variable.
//!
//! Purpose
//! -------
//! Approximate `∇ₓg` when the performance function has no analytic gradient,
//! using one perturbation per random variable with a step proportional to
//! its standard deviation, so physical units of very different magnitude
//! (loads in kN, moduli in GPa) are each perturbed sensibly.
//!
//! Key behaviors
//! -------------
//! - Step `hᵢ = σᵢ / perturbation_factor`; for a marginal with infinite or
//!   zero standard deviation the step falls back to
//!   `max(|xᵢ|, 1) / perturbation_factor`.
//! - Forward differences reuse the already known `g(x)`; central
//!   differences evaluate both sides.
//! - Perturbations run on the `rayon` pool only if parallelism was requested
//!   and the g-evaluator reports reentrancy; otherwise sequentially.
//! - A failing perturbation aborts the gradient with that error; the
//!   finished gradient passes [`validate_grad`].
use crate::{
    errors::ReliabilityResult,
    evaluators::{
        gfun::GFunEvaluator,
        gradg::{FiniteDifferenceOptions, FiniteDifferenceScheme, GradGEvaluator},
    },
    random_variables::RandomVariable,
    types::{Grad, XSpace},
    validation::validate_grad,
};
use rayon::prelude::*;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

pub struct FiniteDifferenceGradGEvaluator {
    gfun: Arc<dyn GFunEvaluator>,
    stdvs: Vec<f64>,
    options: FiniteDifferenceOptions,
    evaluations: AtomicUsize,
}

impl FiniteDifferenceGradGEvaluator {
    pub fn new(
        gfun: Arc<dyn GFunEvaluator>, random_variables: &[Arc<dyn RandomVariable>],
        options: FiniteDifferenceOptions,
    ) -> Self {
        let stdvs = random_variables.iter().map(|rv| rv.stdv()).collect();
        Self { gfun, stdvs, options, evaluations: AtomicUsize::new(0) }
    }

    pub fn options(&self) -> &FiniteDifferenceOptions {
        &self.options
    }

    /// Perturbation step for random variable `i` at value `xi`.
    pub fn step(&self, i: usize, xi: f64) -> f64 {
        let sigma = self.stdvs.get(i).copied().unwrap_or(f64::NAN);
        let basis = if sigma.is_finite() && sigma > 0.0 { sigma } else { xi.abs().max(1.0) };
        basis / self.options.perturbation_factor
    }

    fn component(&self, i: usize, g: f64, x: &XSpace) -> ReliabilityResult<f64> {
        let h = self.step(i, x[i]);
        let mut perturbed = x.clone();
        perturbed[i] = x[i] + h;
        let g_plus = self.gfun.evaluate_g(&perturbed)?;
        match self.options.scheme {
            FiniteDifferenceScheme::Forward => Ok((g_plus - g) / h),
            FiniteDifferenceScheme::Central => {
                perturbed[i] = x[i] - h;
                let g_minus = self.gfun.evaluate_g(&perturbed)?;
                Ok((g_plus - g_minus) / (2.0 * h))
            }
        }
    }
}

impl GradGEvaluator for FiniteDifferenceGradGEvaluator {
    fn evaluate_grad_g(&self, g: f64, x: &XSpace) -> ReliabilityResult<Grad> {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        let n = x.len();
        let components: ReliabilityResult<Vec<f64>> =
            if self.options.parallel && self.gfun.is_reentrant() {
                (0..n).into_par_iter().map(|i| self.component(i, g, x)).collect()
            } else {
                (0..n).map(|i| self.component(i, g, x)).collect()
            };
        let grad = Grad::from(components?);
        validate_grad(&grad, n)?;
        Ok(grad)
    }

    fn number_of_evaluations(&self) -> usize {
        self.evaluations.load(Ordering::Relaxed)
    }

    fn reset_counter(&self) {
        self.evaluations.store(0, Ordering::Relaxed);
    }

    fn is_finite_difference(&self) -> bool {
        true
    }
}
