//! search::options — configuration of a design-point search.
use crate::{
    errors::{ReliabilityError, ReliabilityResult},
    search::cancel::CancellationToken,
    validation::verify_max_iter,
};
use std::time::Duration;

/// Default cap on evaluated iterates.
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Search-level configuration.
///
/// Fields:
/// - `max_iterations` — number of iterates evaluated before giving up with
///   `ReliabilityError::NonConvergence`.
/// - `record_trace` — keep every `IterationRecord` in the design point.
/// - `cancellation` — optional token checked before each iterate.
/// - `time_budget` — optional wall-clock limit checked before each iterate.
///
/// Default: 100 iterations, no trace, no cancellation, no time budget.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub max_iterations: usize,
    pub record_trace: bool,
    pub cancellation: Option<CancellationToken>,
    pub time_budget: Option<Duration>,
}

impl SearchOptions {
    /// Errors
    /// ------
    /// - `ReliabilityError::InvalidMaxIter` when `max_iterations == 0`.
    pub fn new(max_iterations: usize, record_trace: bool) -> ReliabilityResult<Self> {
        let max_iterations = verify_max_iter(max_iterations)?;
        Ok(Self { max_iterations, record_trace, cancellation: None, time_budget: None })
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Errors
    /// ------
    /// - `ReliabilityError::InvalidOption` for a zero budget.
    pub fn with_time_budget(mut self, budget: Duration) -> ReliabilityResult<Self> {
        if budget.is_zero() {
            return Err(ReliabilityError::InvalidOption {
                name: "time_budget",
                value: 0.0,
                reason: "Time budget must be positive.",
            });
        }
        self.time_budget = Some(budget);
        Ok(self)
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            record_trace: false,
            cancellation: None,
            time_budget: None,
        }
    }
}
