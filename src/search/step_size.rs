//! search::step_size — step-size rules along a search direction.
//!
//! Purpose
//! -------
//! Choose `s` in `u_next = u + s·d`.
//!
//! Key behaviors
//! -------------
//! - [`FixedStepSizeRule`] always returns the same step and evaluates
//!   nothing.
//! - [`ArmijoStepSizeRule`] tries `s = 1, b, b², …` for at most
//!   `max_reductions` reductions and accepts the first trial the merit check
//!   approves. The accepted trial's evaluation is handed back so the search
//!   does not evaluate the new iterate twice.
//! - A trial whose evaluation fails counts as a rejection and is reported as
//!   [`Warning::TrialEvaluationFailed`]; if the last allowed trial fails, its
//!   error propagates.
//! - When every reduction is rejected, the last trial is taken anyway and
//!   [`Warning::LineSearchExhausted`] is reported.
use crate::{
    errors::ReliabilityResult,
    reporting::Warning,
    search::{
        merit::{AdkZhangMeritFunctionCheck, MeritFunctionCheck},
        problem::{Iterate, LimitStateProblem},
    },
    types::USpace,
    validation::{verify_positive_option, verify_unit_interval_option},
};
use ndarray::Array1;

pub const DEFAULT_ARMIJO_BASE: f64 = 0.5;
pub const DEFAULT_MAX_REDUCTIONS: usize = 10;

/// Chosen step and, when the rule evaluated it, the resulting iterate.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub step: f64,
    pub trial: Option<Iterate>,
}

pub trait StepSizeRule: Send + Sync {
    /// Forget state of a previous search.
    fn reset(&mut self);

    fn compute_step_size(
        &mut self, problem: &LimitStateProblem, current: &Iterate, direction: &Array1<f64>,
        iteration: usize,
    ) -> ReliabilityResult<StepOutcome>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedStepSizeRule {
    step: f64,
}

impl FixedStepSizeRule {
    pub fn new(step: f64) -> ReliabilityResult<Self> {
        Ok(Self { step: verify_positive_option("step", step)? })
    }
}

impl Default for FixedStepSizeRule {
    fn default() -> Self {
        Self { step: 1.0 }
    }
}

impl StepSizeRule for FixedStepSizeRule {
    fn reset(&mut self) {}

    fn compute_step_size(
        &mut self, _problem: &LimitStateProblem, _current: &Iterate, _direction: &Array1<f64>,
        _iteration: usize,
    ) -> ReliabilityResult<StepOutcome> {
        Ok(StepOutcome { step: self.step, trial: None })
    }
}

pub struct ArmijoStepSizeRule {
    merit: Box<dyn MeritFunctionCheck>,
    base: f64,
    max_reductions: usize,
}

impl ArmijoStepSizeRule {
    /// Errors
    /// ------
    /// - `ReliabilityError::InvalidOption` unless `0 < base < 1`.
    pub fn new(
        merit: Box<dyn MeritFunctionCheck>, base: f64, max_reductions: usize,
    ) -> ReliabilityResult<Self> {
        Ok(Self { merit, base: verify_unit_interval_option("base", base)?, max_reductions })
    }

    fn evaluate_trial(&self, problem: &LimitStateProblem, u: &USpace) -> ReliabilityResult<Iterate> {
        if self.merit.needs_trial_gradient() {
            problem.evaluate_with_gradient(u)
        } else {
            problem.evaluate(u)
        }
    }
}

impl Default for ArmijoStepSizeRule {
    fn default() -> Self {
        Self {
            merit: Box::new(AdkZhangMeritFunctionCheck::default()),
            base: DEFAULT_ARMIJO_BASE,
            max_reductions: DEFAULT_MAX_REDUCTIONS,
        }
    }
}

impl StepSizeRule for ArmijoStepSizeRule {
    fn reset(&mut self) {
        self.merit.reset();
    }

    fn compute_step_size(
        &mut self, problem: &LimitStateProblem, current: &Iterate, direction: &Array1<f64>,
        iteration: usize,
    ) -> ReliabilityResult<StepOutcome> {
        self.merit.update_merit_parameters(current)?;
        let mut step = 1.0;
        let mut reductions = 0;
        loop {
            let exhausted = reductions == self.max_reductions;
            let u_trial = &current.u + &(direction * step);
            match self.evaluate_trial(problem, &u_trial) {
                Ok(trial) => {
                    if self.merit.check(current, &trial, step, direction)? {
                        return Ok(StepOutcome { step, trial: Some(trial) });
                    }
                    if exhausted {
                        problem.reporter().warn(Warning::LineSearchExhausted { iteration, step });
                        return Ok(StepOutcome { step, trial: Some(trial) });
                    }
                }
                Err(e) if !exhausted => {
                    problem.reporter().warn(Warning::TrialEvaluationFailed {
                        iteration,
                        step,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
            step *= self.base;
            reductions += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::ReliabilityError,
        reporting::RecordingReporter,
        search::{
            direction::{HLRFSearchDirection, SearchDirection},
            problem::test_support::{paraboloid, standard_normal_problem},
        },
    };
    use approx::assert_relative_eq;
    use ndarray::array;
    use std::sync::Arc;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Fixed steps never evaluate g.
    // - Armijo accepts the full HL-RF step on a linear surface and hands the
    //   evaluated trial back.
    // - Failed trials are rejections with a warning; the last failure
    //   propagates.
    // - Exhausted reductions take the last trial with a warning.
    // -------------------------------------------------------------------------

    fn hlrf(problem: &LimitStateProblem, u: Array1<f64>) -> (Iterate, Array1<f64>) {
        let current = problem.evaluate_with_gradient(&u).unwrap();
        let d = HLRFSearchDirection
            .compute_search_direction(&current.u, current.g, current.gradient_u().unwrap())
            .unwrap();
        (current, d)
    }

    #[test]
    fn fixed_rule_returns_its_step_without_evaluating() {
        let problem = paraboloid(2.0, &[], Arc::new(RecordingReporter::new()));
        let (current, d) = hlrf(&problem, array![0.0]);
        let before = problem.g_evaluations();

        let mut rule = FixedStepSizeRule::new(0.25).unwrap();
        let outcome = rule.compute_step_size(&problem, &current, &d, 1).unwrap();

        assert_eq!(outcome, StepOutcome { step: 0.25, trial: None });
        assert_eq!(problem.g_evaluations(), before);
        assert!(FixedStepSizeRule::new(0.0).is_err());
    }

    #[test]
    // Purpose
    // -------
    // The full step is accepted on a linear limit state and its evaluation
    // is reused.
    //
    // Given
    // -----
    // - `g = 2 − u₀` from u = (0), default Armijo rule.
    //
    // Expect
    // ------
    // - Step 1, trial at u = (2) with g = 0, one extra g-evaluation.
    fn armijo_accepts_full_step_on_linear_surface() {
        // Arrange
        let reporter = Arc::new(RecordingReporter::new());
        let problem = paraboloid(2.0, &[], reporter.clone());
        let (current, d) = hlrf(&problem, array![0.0]);
        let before = problem.g_evaluations();
        let mut rule = ArmijoStepSizeRule::default();

        // Act
        let outcome = rule.compute_step_size(&problem, &current, &d, 1).unwrap();

        // Assert
        assert_relative_eq!(outcome.step, 1.0);
        let trial = outcome.trial.unwrap();
        assert_relative_eq!(trial.u[0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(trial.g, 0.0, epsilon = 1e-12);
        assert_eq!(problem.g_evaluations(), before + 1);
        assert!(reporter.warnings().is_empty());
    }

    #[test]
    // Purpose
    // -------
    // A failing trial is a rejection: the step is halved and a warning is
    // reported.
    //
    // Given
    // -----
    // - `g = 2 − u₀`, but the model fails for u₀ > 1.5; start u = (0).
    //
    // Expect
    // ------
    // - Step 1 fails, step 0.5 is accepted, one `TrialEvaluationFailed`.
    fn failed_trial_halves_the_step() {
        // Arrange
        let reporter = Arc::new(RecordingReporter::new());
        let problem = standard_normal_problem(
            1,
            |u| if u[0] > 1.5 { f64::NAN } else { 2.0 - u[0] },
            |_| array![-1.0],
            reporter.clone(),
        );
        let (current, d) = hlrf(&problem, array![0.0]);
        let mut rule = ArmijoStepSizeRule::default();

        // Act
        let outcome = rule.compute_step_size(&problem, &current, &d, 3).unwrap();

        // Assert
        assert_relative_eq!(outcome.step, 0.5);
        let warnings = reporter.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            warnings[0],
            Warning::TrialEvaluationFailed { iteration: 3, step, .. } if step == 1.0
        ));
    }

    #[test]
    fn failure_of_last_trial_propagates() {
        let reporter = Arc::new(RecordingReporter::new());
        let problem = standard_normal_problem(
            1,
            |u| if u[0] > 0.1 { f64::NAN } else { 2.0 - u[0] },
            |_| array![-1.0],
            reporter.clone(),
        );
        let (current, d) = hlrf(&problem, array![0.0]);
        let merit = Box::new(AdkZhangMeritFunctionCheck::default());
        let mut rule = ArmijoStepSizeRule::new(merit, 0.5, 2).unwrap();

        let err = rule.compute_step_size(&problem, &current, &d, 1).unwrap_err();

        assert!(matches!(err, ReliabilityError::NonFiniteResponse { .. }));
        assert_eq!(reporter.warnings().len(), 2);
    }

    #[test]
    // Purpose
    // -------
    // With no acceptable step the last trial is taken and the exhaustion is
    // reported.
    //
    // Given
    // -----
    // - `g = 1 + u₀²` (no root), HL-RF from u = (0.5) with zero reductions
    //   allowed.
    fn exhausted_reductions_take_last_trial() {
        let reporter = Arc::new(RecordingReporter::new());
        let problem =
            standard_normal_problem(1, |u| 1.0 + u[0] * u[0], |u| array![2.0 * u[0]], reporter.clone());
        let (current, d) = hlrf(&problem, array![0.5]);
        let merit = Box::new(AdkZhangMeritFunctionCheck::default());
        let mut rule = ArmijoStepSizeRule::new(merit, 0.5, 0).unwrap();

        let outcome = rule.compute_step_size(&problem, &current, &d, 1).unwrap();

        assert_relative_eq!(outcome.step, 1.0);
        assert!(outcome.trial.is_some());
        assert!(matches!(reporter.warnings()[0], Warning::LineSearchExhausted { iteration: 1, .. }));
    }
}
