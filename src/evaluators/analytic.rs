//! evaluators::analytic — user-supplied gradients with an optional
//! finite-difference cross-check.
//!
//! Purpose
//! -------
//! Forward [`PerformanceFunction::gradient`] to the search and, on request,
//! compare it with a `finitediff` central-difference gradient. Mismatches are
//! reported as [`Warning::GradientMismatch`] through the injected
//! [`Reporter`]; the check never fails the evaluation.
//!
//! Key behaviors
//! -------------
//! - The check differentiates `s ↦ g(x + σ ⊙ s)` at `s = 0`, i.e. in
//!   coordinates scaled by each random variable's standard deviation, then
//!   divides by `σᵢ`. This keeps the fixed `finitediff` step meaningful for
//!   variables of any magnitude.
//! - Errors raised inside the differenced closure are captured in a
//!   `RefCell` and abort only the check, not the gradient.
//! - [`GradientCheck`] selects whether the check runs never, once, or at
//!   every evaluation.
use crate::{
    errors::{ReliabilityError, ReliabilityResult},
    evaluators::{gfun::GFunEvaluator, gradg::GradGEvaluator},
    random_variables::RandomVariable,
    reporting::{Reporter, Warning},
    types::{Grad, XSpace},
    validation::{validate_grad, validate_value, verify_tol},
};
use finitediff::FiniteDiff;
use ndarray::Array1;
use std::{
    cell::RefCell,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

/// Default relative tolerance of the gradient check.
pub const DEFAULT_GRADIENT_CHECK_TOL: f64 = 1e-4;

/// When to cross-check the analytic gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientCheck {
    Never,
    /// Check at the first gradient evaluation only.
    FirstEvaluation { tolerance: f64 },
    Always { tolerance: f64 },
}

impl GradientCheck {
    pub fn first_evaluation(tolerance: f64) -> ReliabilityResult<Self> {
        Ok(GradientCheck::FirstEvaluation { tolerance: verify_tol("gradient_check", tolerance)? })
    }

    pub fn always(tolerance: f64) -> ReliabilityResult<Self> {
        Ok(GradientCheck::Always { tolerance: verify_tol("gradient_check", tolerance)? })
    }
}

pub struct AnalyticGradGEvaluator {
    gfun: Arc<dyn GFunEvaluator>,
    stdvs: Vec<f64>,
    check: GradientCheck,
    reporter: Arc<dyn Reporter>,
    checked: AtomicBool,
    evaluations: AtomicUsize,
}

impl AnalyticGradGEvaluator {
    pub fn new(
        gfun: Arc<dyn GFunEvaluator>, random_variables: &[Arc<dyn RandomVariable>],
        check: GradientCheck, reporter: Arc<dyn Reporter>,
    ) -> Self {
        let stdvs = random_variables.iter().map(|rv| rv.stdv()).collect();
        Self {
            gfun,
            stdvs,
            check,
            reporter,
            checked: AtomicBool::new(false),
            evaluations: AtomicUsize::new(0),
        }
    }

    fn tolerance_for_this_call(&self) -> Option<f64> {
        match self.check {
            GradientCheck::Never => None,
            GradientCheck::Always { tolerance } => Some(tolerance),
            GradientCheck::FirstEvaluation { tolerance } => {
                (!self.checked.swap(true, Ordering::Relaxed)).then_some(tolerance)
            }
        }
    }

    /// Central-difference gradient in σ-scaled coordinates.
    fn numerical_gradient(&self, x: &XSpace) -> ReliabilityResult<Grad> {
        let function = self.gfun.performance_function();
        let scale: Array1<f64> = self
            .stdvs
            .iter()
            .zip(x.iter())
            .map(|(&s, &xi)| if s.is_finite() && s > 0.0 { s } else { xi.abs().max(1.0) })
            .collect();
        let closure_err: RefCell<Option<ReliabilityError>> = RefCell::new(None);
        let scaled_g = |s: &Array1<f64>| -> f64 {
            let xs = x + &(&scale * s);
            match function.value(&xs).and_then(validate_value) {
                Ok(g) => g,
                Err(e) => {
                    closure_err.replace(Some(e));
                    f64::NAN
                }
            }
        };
        let origin = Array1::<f64>::zeros(x.len());
        let scaled_grad = origin.central_diff(&scaled_g);
        if let Some(err) = closure_err.take() {
            return Err(err);
        }
        let grad = scaled_grad / &scale;
        validate_grad(&grad, x.len())?;
        Ok(grad)
    }

    fn compare(&self, analytic: &Grad, numerical: &Grad, tolerance: f64) {
        let largest = numerical.iter().chain(analytic.iter()).fold(0.0_f64, |m, v| m.max(v.abs()));
        let floor = (1e-8 * largest).max(f64::MIN_POSITIVE);
        for (index, (&a, &n)) in analytic.iter().zip(numerical.iter()).enumerate() {
            let relative_error = (a - n).abs() / a.abs().max(n.abs()).max(floor);
            if relative_error > tolerance {
                self.reporter.warn(Warning::GradientMismatch {
                    index,
                    analytic: a,
                    numerical: n,
                    relative_error,
                });
            }
        }
    }
}

impl GradGEvaluator for AnalyticGradGEvaluator {
    fn evaluate_grad_g(&self, _g: f64, x: &XSpace) -> ReliabilityResult<Grad> {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        let grad = self.gfun.performance_function().gradient(x)?;
        validate_grad(&grad, x.len())?;
        if let Some(tolerance) = self.tolerance_for_this_call() {
            match self.numerical_gradient(x) {
                Ok(numerical) => self.compare(&grad, &numerical, tolerance),
                Err(e) => log::debug!("gradient check skipped: {e}"),
            }
        }
        Ok(grad)
    }

    fn number_of_evaluations(&self) -> usize {
        self.evaluations.load(Ordering::Relaxed)
    }

    fn reset_counter(&self) {
        self.evaluations.store(0, Ordering::Relaxed);
    }

    fn is_finite_difference(&self) -> bool {
        false
    }
}
