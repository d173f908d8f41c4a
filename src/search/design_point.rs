//! search::design_point — the design-point search loop.
//!
//! Purpose
//! -------
//! Find the point on `g(u) = 0` closest to the origin of standard normal
//! space by iterating `u_{k+1} = u_k + s_k d_k`, with the direction `d_k`
//! from a [`SearchDirection`] and the step `s_k` from a [`StepSizeRule`],
//! until a [`ReliabilityConvergenceCheck`] is satisfied.
//!
//! Key behaviors
//! -------------
//! - Status follows `Initialized → Iterating → terminal`, see
//!   [`SearchStatus`]. Each call of
//!   [`FindDesignPointAlgorithm::find_design_point`] resets the step-size
//!   rule (and its merit parameters) and the convergence scale.
//! - `max_iterations` bounds the number of *evaluated iterates*; zero is
//!   rejected with `InvalidMaxIter` before the first evaluation. Reaching
//!   the cap without convergence returns `NonConvergence` carrying the
//!   iterate with the smallest `max(c1/e1, c2/e2)`, without taking another
//!   step.
//! - Errors raised while evaluating or stepping are wrapped in
//!   `SearchFailed { iteration, status, cause }`.
//! - Cancellation and the wall-clock budget are checked before each iterate.
//! - Every iterate is reported through [`Reporter::progress`].
use crate::{
    errors::{ErrorClass, ReliabilityError, ReliabilityResult},
    reporting::Reporter,
    search::{
        convergence::{
            ReliabilityConvergenceCheck, StandardReliabilityConvergenceCheck, alpha_from_gradient,
        },
        direction::{HLRFSearchDirection, SearchDirection},
        options::SearchOptions,
        outcome::{DesignPoint, IterationRecord, SearchStatus},
        problem::{Iterate, LimitStateProblem},
        step_size::{ArmijoStepSizeRule, StepSizeRule},
    },
    types::USpace,
    validation::verify_max_iter,
};
use std::time::Instant;

pub trait FindDesignPointAlgorithm {
    fn find_design_point(
        &mut self, problem: &LimitStateProblem, u0: &USpace,
    ) -> ReliabilityResult<DesignPoint>;

    /// Status of the latest search.
    fn status(&self) -> SearchStatus;
}

pub struct SearchWithStepSizeAndStepDirection {
    options: SearchOptions,
    direction: Box<dyn SearchDirection>,
    step_size: Box<dyn StepSizeRule>,
    convergence: Box<dyn ReliabilityConvergenceCheck>,
    status: SearchStatus,
}

impl SearchWithStepSizeAndStepDirection {
    pub fn new(
        options: SearchOptions, direction: Box<dyn SearchDirection>,
        step_size: Box<dyn StepSizeRule>, convergence: Box<dyn ReliabilityConvergenceCheck>,
    ) -> Self {
        Self { options, direction, step_size, convergence, status: SearchStatus::Initialized }
    }

    /// HL-RF directions, Armijo steps with the Adk–Zhang merit function and
    /// the standard convergence check.
    pub fn hlrf(options: SearchOptions) -> Self {
        Self::new(
            options,
            Box::new(HLRFSearchDirection),
            Box::new(ArmijoStepSizeRule::default()),
            Box::new(StandardReliabilityConvergenceCheck::default()),
        )
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    fn fail(&mut self, iteration: usize, cause: ReliabilityError) -> ReliabilityError {
        self.status = match cause.class() {
            ErrorClass::Evaluation => SearchStatus::EvaluationFailed,
            ErrorClass::Configuration => SearchStatus::InvalidConfiguration,
            ErrorClass::Cancelled => SearchStatus::Cancelled,
            ErrorClass::NonConvergence | ErrorClass::NumericalDegeneracy => {
                SearchStatus::NumericalDegeneracy
            }
        };
        ReliabilityError::SearchFailed { iteration, status: self.status, cause: Box::new(cause) }
    }

    fn check_interrupt(
        &mut self, iteration: usize, started: Instant, last: Option<&IterationRecord>,
    ) -> ReliabilityResult<()> {
        let reason = if self.options.cancellation.as_ref().is_some_and(|t| t.is_cancelled()) {
            "cancellation requested"
        } else if self.options.time_budget.is_some_and(|budget| started.elapsed() >= budget) {
            "time budget exhausted"
        } else {
            return Ok(());
        };
        self.status = SearchStatus::Cancelled;
        log::info!("design-point search stopped before iterate {iteration}: {reason}");
        Err(ReliabilityError::Cancelled { iteration, reason, last: last.cloned().map(Box::new) })
    }

    fn record(
        &self, iteration: usize, iterate: &Iterate,
    ) -> ReliabilityResult<(IterationRecord, bool)> {
        let gradient_u = iterate.gradient_u()?;
        let alpha = alpha_from_gradient(gradient_u)?;
        let beta = alpha.dot(&iterate.u);
        let criteria = self.convergence.criteria(&iterate.u, iterate.g, gradient_u)?;
        let converged = self.convergence.check(criteria);
        let record = IterationRecord {
            iteration,
            u: iterate.u.clone(),
            x: iterate.x.clone(),
            g: iterate.g,
            gradient_u: gradient_u.clone(),
            alpha,
            beta,
            criteria,
            step_size: None,
        };
        Ok((record, converged))
    }
}

impl FindDesignPointAlgorithm for SearchWithStepSizeAndStepDirection {
    fn find_design_point(
        &mut self, problem: &LimitStateProblem, u0: &USpace,
    ) -> ReliabilityResult<DesignPoint> {
        self.status = SearchStatus::Initialized;
        let max_iterations = verify_max_iter(self.options.max_iterations)?;
        if u0.len() != problem.dimension() {
            return Err(ReliabilityError::DimensionMismatch {
                expected: problem.dimension(),
                found: u0.len(),
            });
        }
        self.step_size.reset();
        self.convergence.reset();
        let (e1, e2) = self.convergence.tolerances();
        let g_calls = problem.g_evaluations();
        let grad_calls = problem.grad_evaluations();
        let started = Instant::now();
        let reporter = problem.reporter().clone();

        self.status = SearchStatus::Iterating;
        let mut next_u = u0.clone();
        let mut evaluated: Option<Iterate> = None;
        let mut previous: Option<IterationRecord> = None;
        let mut best: Option<IterationRecord> = None;
        let mut trace: Vec<IterationRecord> = Vec::new();

        for iteration in 1..=max_iterations {
            self.check_interrupt(iteration, started, previous.as_ref())?;

            let mut current = match evaluated.take() {
                Some(iterate) => iterate,
                None => problem.evaluate(&next_u).map_err(|e| self.fail(iteration, e))?,
            };
            problem.evaluate_gradient(&mut current).map_err(|e| self.fail(iteration, e))?;
            if iteration == 1 {
                self.convergence.set_scale_value(current.g);
            }
            let (mut record, converged) =
                self.record(iteration, &current).map_err(|e| self.fail(iteration, e))?;
            reporter.progress(&record);
            if best.as_ref().is_none_or(|b| record.score(e1, e2) < b.score(e1, e2)) {
                best = Some(record.clone());
            }

            if converged {
                self.status = SearchStatus::Converged;
                log::debug!(
                    "design point found after {iteration} iterates: beta = {:.6}",
                    record.beta
                );
                let gradient = current.gradient.take().ok_or(ReliabilityError::NotComputed {
                    product: "limit-state gradient",
                })?;
                if self.options.record_trace {
                    trace.push(record.clone());
                }
                return Ok(DesignPoint {
                    u: current.u,
                    x: current.x,
                    g: current.g,
                    gradient_u: gradient.u,
                    gradient_x: gradient.x,
                    alpha: record.alpha,
                    beta: record.beta,
                    iterations: iteration,
                    g_evaluations: problem.g_evaluations() - g_calls,
                    grad_evaluations: problem.grad_evaluations() - grad_calls,
                    second_last: previous,
                    trace: self.options.record_trace.then_some(trace),
                });
            }

            if iteration == max_iterations {
                break;
            }

            let gradient_u = current.gradient_u().map_err(|e| self.fail(iteration, e))?;
            let direction = self
                .direction
                .compute_search_direction(&current.u, current.g, gradient_u)
                .map_err(|e| self.fail(iteration, e))?;
            let outcome = self
                .step_size
                .compute_step_size(problem, &current, &direction, iteration)
                .map_err(|e| self.fail(iteration, e))?;

            record.step_size = Some(outcome.step);
            next_u = &current.u + &(&direction * outcome.step);
            evaluated = outcome.trial;
            if self.options.record_trace {
                trace.push(record.clone());
            }
            previous = Some(record);
        }

        self.status = SearchStatus::MaxIterationsExceeded;
        log::warn!("design-point search did not converge in {max_iterations} iterates");
        let best = best.ok_or(ReliabilityError::NotComputed { product: "iteration record" })?;
        Err(ReliabilityError::NonConvergence { iterations: max_iterations, best: Box::new(best) })
    }

    fn status(&self) -> SearchStatus {
        self.status
    }
}
