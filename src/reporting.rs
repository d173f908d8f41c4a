//! reporting — injected diagnostics sink for warnings and search progress.
//!
//! Purpose
//! -------
//! Give every component that needs to emit non-fatal diagnostics a single
//! collaborator, [`Reporter`], instead of a process-wide error handler. The
//! search loop reports per-iterate progress, gradient checks and line
//! searches report [`Warning`]s, and nothing here ever aborts a computation.
//!
//! Key behaviors
//! -------------
//! - [`LogReporter`] forwards warnings to `log::warn!` and progress to
//!   `log::debug!`, so the host application chooses the logger backend.
//! - [`RecordingReporter`] stores warnings and progress records in memory so
//!   tests and callers can inspect them after a run.
//!
//! Conventions
//! -----------
//! - Reporters are `Send + Sync`; finite-difference perturbations may run on
//!   a `rayon` pool and report from worker threads.
use crate::search::outcome::IterationRecord;
use std::sync::Mutex;

/// Non-fatal conditions detected during a search.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// Analytic and finite-difference gradients disagree beyond tolerance.
    GradientMismatch { index: usize, analytic: f64, numerical: f64, relative_error: f64 },
    /// The Armijo line search hit its reduction limit and took the last
    /// trial step anyway.
    LineSearchExhausted { iteration: usize, step: f64 },
    /// A line-search trial point could not be evaluated; the step was
    /// reduced.
    TrialEvaluationFailed { iteration: usize, step: f64, reason: String },
    /// A curvature-search sub-run hit its cap while still approaching the
    /// design point; its iterates were still used.
    CurvatureSearchNotConverged { curvature: usize, iterations: usize },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::GradientMismatch { index, analytic, numerical, relative_error } => write!(
                f,
                "Gradient check failed at index {index}: analytic {analytic}, \
                 finite difference {numerical} (relative error {relative_error:.3e})"
            ),
            Warning::LineSearchExhausted { iteration, step } => {
                write!(f, "Line search exhausted at iteration {iteration}; taking step {step}")
            }
            Warning::TrialEvaluationFailed { iteration, step, reason } => write!(
                f,
                "Trial point at iteration {iteration} (step {step}) could not be evaluated: {reason}"
            ),
            Warning::CurvatureSearchNotConverged { curvature, iterations } => write!(
                f,
                "Search for curvature {curvature} did not converge in {iterations} iterations"
            ),
        }
    }
}

/// Diagnostics collaborator shared by evaluators and search algorithms.
pub trait Reporter: Send + Sync {
    fn warn(&self, warning: Warning);

    /// Called once per evaluated iterate. Default: ignore.
    fn progress(&self, _record: &IterationRecord) {}
}

/// Forwards diagnostics to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn warn(&self, warning: Warning) {
        log::warn!("{warning}");
    }

    fn progress(&self, record: &IterationRecord) {
        log::debug!(
            "iteration {}: g = {:.6e}, beta = {:.6}, step = {:?}, criteria = ({:.3e}, {:.3e})",
            record.iteration,
            record.g,
            record.beta,
            record.step_size,
            record.criteria.0,
            record.criteria.1,
        );
    }
}

/// Collects diagnostics in memory.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    warnings: Mutex<Vec<Warning>>,
    progress: Mutex<Vec<IterationRecord>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all warnings reported so far.
    pub fn warnings(&self) -> Vec<Warning> {
        match self.warnings.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Snapshot of all progress records reported so far.
    pub fn progress_records(&self) -> Vec<IterationRecord> {
        match self.progress.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Reporter for RecordingReporter {
    fn warn(&self, warning: Warning) {
        match self.warnings.lock() {
            Ok(mut guard) => guard.push(warning),
            Err(poisoned) => poisoned.into_inner().push(warning),
        }
    }

    fn progress(&self, record: &IterationRecord) {
        match self.progress.lock() {
            Ok(mut guard) => guard.push(record.clone()),
            Err(poisoned) => poisoned.into_inner().push(record.clone()),
        }
    }
}
