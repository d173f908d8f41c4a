//! evaluators::gfun — counted, cached evaluation of the limit-state value.
//!
//! Purpose
//! -------
//! Wrap a [`PerformanceFunction`] behind the [`GFunEvaluator`] interface the
//! search algorithms use, adding an evaluation counter, a one-entry cache
//! for repeated requests at the same realization, and the finiteness check
//! on every returned value.
//!
//! Key behaviors
//! -------------
//! - Every call that reaches the performance function increments the
//!   counter, whether it succeeds or not; cache hits do not.
//! - Non-finite values become [`ReliabilityError::NonFiniteResponse`];
//!   failures of the underlying function propagate unchanged
//!   ([`ReliabilityError::EvaluationFailed`]).
//! - The cache holds the last successful `(x, g)` pair and is matched on
//!   exact equality of `x`.
//!
//! Conventions
//! -----------
//! - Evaluators are `Send + Sync` with an atomic counter and a
//!   mutex-guarded cache so finite-difference perturbations may call them
//!   from a `rayon` pool when [`GFunEvaluator::is_reentrant`] allows.
use crate::{
    domain::PerformanceFunction,
    errors::ReliabilityResult,
    types::XSpace,
    validation::validate_value,
};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

pub trait GFunEvaluator: Send + Sync {
    /// Evaluate `g(x)`.
    fn evaluate_g(&self, x: &XSpace) -> ReliabilityResult<f64>;

    /// Calls that reached the performance function since the last reset.
    fn number_of_evaluations(&self) -> usize;

    fn reset_counter(&self);

    /// Whether `evaluate_g` may be called concurrently.
    fn is_reentrant(&self) -> bool;

    /// Underlying performance function, used for analytic gradients.
    fn performance_function(&self) -> Arc<dyn PerformanceFunction>;
}

pub struct BasicGFunEvaluator {
    function: Arc<dyn PerformanceFunction>,
    evaluations: AtomicUsize,
    last: Mutex<Option<(XSpace, f64)>>,
}

impl BasicGFunEvaluator {
    pub fn new(function: Arc<dyn PerformanceFunction>) -> Self {
        Self { function, evaluations: AtomicUsize::new(0), last: Mutex::new(None) }
    }

    fn cached(&self, x: &XSpace) -> Option<f64> {
        let guard = self.last.lock().ok()?;
        match guard.as_ref() {
            Some((last_x, g)) if last_x == x => Some(*g),
            _ => None,
        }
    }

    fn store(&self, x: &XSpace, g: f64) {
        if let Ok(mut guard) = self.last.lock() {
            *guard = Some((x.clone(), g));
        }
    }
}

impl std::fmt::Debug for BasicGFunEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicGFunEvaluator")
            .field("evaluations", &self.evaluations.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl GFunEvaluator for BasicGFunEvaluator {
    fn evaluate_g(&self, x: &XSpace) -> ReliabilityResult<f64> {
        if let Some(g) = self.cached(x) {
            return Ok(g);
        }
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        let g = validate_value(self.function.value(x)?)?;
        self.store(x, g);
        Ok(g)
    }

    fn number_of_evaluations(&self) -> usize {
        self.evaluations.load(Ordering::Relaxed)
    }

    fn reset_counter(&self) {
        self.evaluations.store(0, Ordering::Relaxed);
    }

    fn is_reentrant(&self) -> bool {
        self.function.is_reentrant()
    }

    fn performance_function(&self) -> Arc<dyn PerformanceFunction> {
        Arc::clone(&self.function)
    }
}
