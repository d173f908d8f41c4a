//! domain::limit_state — performance functions and the structural-analysis
//! seam.
//!
//! Purpose
//! -------
//! Describe the limit-state function `g(x)` the design-point search drives
//! toward `g = 0`, without committing to how it is computed. A
//! [`PerformanceFunction`] may be a closed-form expression
//! ([`ClosurePerformanceFunction`]) or a response extracted from an external
//! structural model ([`StructuralPerformanceFunction`] over a
//! [`StructuralAnalysis`]).
//!
//! Key behaviors
//! -------------
//! - `g(x) <= 0` denotes failure; the search never relies on the sign beyond
//!   reporting the signed reliability index.
//! - Analytic gradients are optional. [`PerformanceFunction::has_gradient`]
//!   tells the analysis driver up front whether one exists; without it the
//!   default [`PerformanceFunction::gradient`] returns
//!   [`ReliabilityError::GradientNotImplemented`], a configuration error
//!   that calls for finite differences.
//! - Analysis failures are reported as
//!   [`ReliabilityError::EvaluationFailed`] and never panic.
//!
//! Conventions
//! -----------
//! - `is_reentrant() == true` promises that concurrent calls of `value` on
//!   different realizations are safe; only then may the finite-difference
//!   evaluator run perturbations in parallel.
use crate::{
    errors::{ReliabilityError, ReliabilityResult},
    types::{Grad, XSpace},
};
use std::sync::Arc;

/// Scalar limit-state function of the physical realization.
pub trait PerformanceFunction: Send + Sync {
    fn value(&self, x: &XSpace) -> ReliabilityResult<f64>;

    /// Analytic gradient `∇ₓg`. Default: not implemented.
    fn gradient(&self, _x: &XSpace) -> ReliabilityResult<Grad> {
        Err(ReliabilityError::GradientNotImplemented)
    }

    /// Whether [`PerformanceFunction::gradient`] is implemented. Must be
    /// overridden together with it.
    fn has_gradient(&self) -> bool {
        false
    }

    fn is_reentrant(&self) -> bool {
        false
    }
}

type ValueFn = dyn Fn(&XSpace) -> anyhow::Result<f64> + Send + Sync;
type GradientFn = dyn Fn(&XSpace) -> anyhow::Result<Grad> + Send + Sync;

/// Performance function backed by user closures.
///
/// Closure errors are flattened into
/// [`ReliabilityError::EvaluationFailed`] with the full `anyhow` context
/// chain as the reason.
pub struct ClosurePerformanceFunction {
    value: Box<ValueFn>,
    gradient: Option<Box<GradientFn>>,
    reentrant: bool,
}

impl ClosurePerformanceFunction {
    /// Wrap a value closure. Closures are assumed pure, hence reentrant.
    pub fn new<F>(value: F) -> Self
    where
        F: Fn(&XSpace) -> anyhow::Result<f64> + Send + Sync + 'static,
    {
        Self { value: Box::new(value), gradient: None, reentrant: true }
    }

    pub fn with_gradient<G>(mut self, gradient: G) -> Self
    where
        G: Fn(&XSpace) -> anyhow::Result<Grad> + Send + Sync + 'static,
    {
        self.gradient = Some(Box::new(gradient));
        self
    }

    pub fn with_reentrant(mut self, reentrant: bool) -> Self {
        self.reentrant = reentrant;
        self
    }
}

impl std::fmt::Debug for ClosurePerformanceFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosurePerformanceFunction")
            .field("has_gradient", &self.gradient.is_some())
            .field("reentrant", &self.reentrant)
            .finish()
    }
}

impl PerformanceFunction for ClosurePerformanceFunction {
    fn value(&self, x: &XSpace) -> ReliabilityResult<f64> {
        (self.value)(x).map_err(|e| ReliabilityError::EvaluationFailed { reason: format!("{e:#}") })
    }

    fn gradient(&self, x: &XSpace) -> ReliabilityResult<Grad> {
        match &self.gradient {
            Some(gradient) => gradient(x)
                .map_err(|e| ReliabilityError::EvaluationFailed { reason: format!("{e:#}") }),
            None => Err(ReliabilityError::GradientNotImplemented),
        }
    }

    fn has_gradient(&self) -> bool {
        self.gradient.is_some()
    }

    fn is_reentrant(&self) -> bool {
        self.reentrant
    }
}

/// Failure reported by an external structural analysis (non-convergence,
/// singular stiffness, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisFailure {
    pub message: String,
}

impl AnalysisFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl std::fmt::Display for AnalysisFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Structural analysis failed: {}", self.message)
    }
}

impl std::error::Error for AnalysisFailure {}

/// External structural model: maps a realization of the random variables to
/// a response (displacements, forces, ...).
pub trait StructuralAnalysis: Send + Sync {
    type Response;

    fn analyze(&self, realization: &XSpace) -> Result<Self::Response, AnalysisFailure>;

    /// Whether independent realizations may be analyzed concurrently.
    fn is_reentrant(&self) -> bool {
        false
    }
}

/// Performance function that runs a [`StructuralAnalysis`] and extracts `g`
/// from its response.
pub struct StructuralPerformanceFunction<A, E> {
    analysis: A,
    extractor: E,
}

impl<A, E> StructuralPerformanceFunction<A, E>
where
    A: StructuralAnalysis,
    E: Fn(&A::Response, &XSpace) -> f64 + Send + Sync,
{
    /// `extractor(response, x)` computes `g`, e.g. `threshold − |u_top|`.
    pub fn new(analysis: A, extractor: E) -> Self {
        Self { analysis, extractor }
    }
}

impl<A, E> PerformanceFunction for StructuralPerformanceFunction<A, E>
where
    A: StructuralAnalysis,
    E: Fn(&A::Response, &XSpace) -> f64 + Send + Sync,
{
    fn value(&self, x: &XSpace) -> ReliabilityResult<f64> {
        let response = self
            .analysis
            .analyze(x)
            .map_err(|failure| ReliabilityError::EvaluationFailed { reason: failure.to_string() })?;
        Ok((self.extractor)(&response, x))
    }

    fn is_reentrant(&self) -> bool {
        self.analysis.is_reentrant()
    }
}

/// A registered limit-state function.
#[derive(Clone)]
pub struct LimitStateFunction {
    tag: usize,
    function: Arc<dyn PerformanceFunction>,
}

impl LimitStateFunction {
    pub fn new(tag: usize, function: Arc<dyn PerformanceFunction>) -> Self {
        Self { tag, function }
    }

    pub fn tag(&self) -> usize {
        self.tag
    }

    pub fn function(&self) -> Arc<dyn PerformanceFunction> {
        Arc::clone(&self.function)
    }
}

impl std::fmt::Debug for LimitStateFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LimitStateFunction").field("tag", &self.tag).finish_non_exhaustive()
    }
}
