//! search::merit — acceptance tests for trial steps.
//!
//! Purpose
//! -------
//! Provide the merit checks an Armijo-type line search uses to accept or
//! reject a trial point `u + s·d`.
//!
//! Key behaviors
//! -------------
//! - [`AdkZhangMeritFunctionCheck`]: merit `m(u) = ½‖u‖² + c|g(u)|` with a
//!   penalty `c` that is raised (never lowered within one search) to
//!   `multi·‖u‖/‖∇g‖ + add`; a trial is accepted under the sufficient
//!   decrease condition `m(trial) − m(u) <= factor · s · ∇m(u)·d`.
//! - [`CriteriaReductionMeritFunctionCheck`]: accepts a trial when the sum of
//!   normalized convergence criteria strictly decreases. Needs the gradient
//!   at the trial point.
use crate::{
    errors::{ReliabilityError, ReliabilityResult},
    search::{
        convergence::{ReliabilityConvergenceCheck, StandardReliabilityConvergenceCheck},
        problem::Iterate,
    },
    types::{Grad, USpace},
    validation::verify_unit_interval_option,
};
use argmin_math::ArgminL2Norm;
use ndarray::Array1;

pub trait MeritFunctionCheck: Send + Sync {
    /// Forget parameters of a previous search.
    fn reset(&mut self);

    /// Adapt merit parameters at the current iterate, before its line search.
    fn update_merit_parameters(&mut self, current: &Iterate) -> ReliabilityResult<()>;

    fn merit_value(&self, u: &USpace, g: f64, gradient_u: Option<&Grad>) -> ReliabilityResult<f64>;

    /// Accept `trial = current + step · direction`?
    fn check(
        &self, current: &Iterate, trial: &Iterate, step: f64, direction: &Array1<f64>,
    ) -> ReliabilityResult<bool>;

    /// Whether `check` needs the gradient at the trial point.
    fn needs_trial_gradient(&self) -> bool;
}

pub const DEFAULT_MERIT_MULTI: f64 = 2.0;
pub const DEFAULT_MERIT_ADD: f64 = 10.0;
pub const DEFAULT_MERIT_FACTOR: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct AdkZhangMeritFunctionCheck {
    multi: f64,
    add: f64,
    factor: f64,
    c: f64,
}

impl AdkZhangMeritFunctionCheck {
    /// Errors
    /// ------
    /// - `ReliabilityError::InvalidOption` if `multi` or `add` is negative
    ///   or not finite, or `factor` is outside `(0, 1)`.
    pub fn new(multi: f64, add: f64, factor: f64) -> ReliabilityResult<Self> {
        let non_negative = |name: &'static str, value: f64| {
            if value.is_finite() && value >= 0.0 {
                Ok(value)
            } else {
                Err(ReliabilityError::InvalidOption {
                    name,
                    value,
                    reason: "Merit parameters must be finite and non-negative.",
                })
            }
        };
        Ok(Self {
            multi: non_negative("multi", multi)?,
            add: non_negative("add", add)?,
            factor: verify_unit_interval_option("factor", factor)?,
            c: 0.0,
        })
    }

    /// Current penalty parameter.
    pub fn penalty(&self) -> f64 {
        self.c
    }
}

impl Default for AdkZhangMeritFunctionCheck {
    fn default() -> Self {
        Self { multi: DEFAULT_MERIT_MULTI, add: DEFAULT_MERIT_ADD, factor: DEFAULT_MERIT_FACTOR, c: 0.0 }
    }
}

impl MeritFunctionCheck for AdkZhangMeritFunctionCheck {
    fn reset(&mut self) {
        self.c = 0.0;
    }

    fn update_merit_parameters(&mut self, current: &Iterate) -> ReliabilityResult<()> {
        let gradient_u = current.gradient_u()?;
        let grad_norm = gradient_u.l2_norm();
        if !(grad_norm > 0.0) || !grad_norm.is_finite() {
            return Err(ReliabilityError::ZeroGradientNorm { norm: grad_norm });
        }
        let u_norm = current.u.l2_norm();
        self.c = self.c.max(self.multi * u_norm / grad_norm + self.add);
        Ok(())
    }

    fn merit_value(&self, u: &USpace, g: f64, _gradient_u: Option<&Grad>) -> ReliabilityResult<f64> {
        Ok(0.5 * u.dot(u) + self.c * g.abs())
    }

    fn check(
        &self, current: &Iterate, trial: &Iterate, step: f64, direction: &Array1<f64>,
    ) -> ReliabilityResult<bool> {
        let gradient_u = current.gradient_u()?;
        let merit_current = self.merit_value(&current.u, current.g, None)?;
        let merit_trial = self.merit_value(&trial.u, trial.g, None)?;
        // ∇m = u + c·sign(g)·∇g
        let merit_gradient = &current.u + &(gradient_u * (self.c * current.g.signum()));
        let bound = self.factor * step * merit_gradient.dot(direction);
        Ok(merit_trial - merit_current <= bound)
    }

    fn needs_trial_gradient(&self) -> bool {
        false
    }
}

/// Accept a trial when `c1/e1 + c2/e2` strictly decreases.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CriteriaReductionMeritFunctionCheck {
    convergence: StandardReliabilityConvergenceCheck,
}

impl CriteriaReductionMeritFunctionCheck {
    /// Criteria are normalized by `e1`, `e2` and, for `c1`, by `|g|` at the
    /// first iterate of the search.
    pub fn new(e1: f64, e2: f64) -> ReliabilityResult<Self> {
        Ok(Self { convergence: StandardReliabilityConvergenceCheck::new(e1, e2)? })
    }
}

impl MeritFunctionCheck for CriteriaReductionMeritFunctionCheck {
    fn reset(&mut self) {
        self.convergence.reset();
    }

    fn update_merit_parameters(&mut self, current: &Iterate) -> ReliabilityResult<()> {
        if !self.convergence.is_scaled() {
            self.convergence.set_scale_value(current.g);
        }
        Ok(())
    }

    fn merit_value(&self, u: &USpace, g: f64, gradient_u: Option<&Grad>) -> ReliabilityResult<f64> {
        let gradient_u =
            gradient_u.ok_or(ReliabilityError::NotComputed { product: "limit-state gradient" })?;
        let (c1, c2) = self.convergence.criteria(u, g, gradient_u)?;
        let (e1, e2) = self.convergence.tolerances();
        Ok(c1 / e1 + c2 / e2)
    }

    fn check(
        &self, current: &Iterate, trial: &Iterate, _step: f64, _direction: &Array1<f64>,
    ) -> ReliabilityResult<bool> {
        let merit_current = self.merit_value(&current.u, current.g, Some(current.gradient_u()?))?;
        let merit_trial = self.merit_value(&trial.u, trial.g, Some(trial.gradient_u()?))?;
        Ok(merit_trial < merit_current)
    }

    fn needs_trial_gradient(&self) -> bool {
        true
    }
}
