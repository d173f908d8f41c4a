//! evaluators::gradg — the gradient-evaluator interface and its options.
use crate::{
    errors::{ReliabilityError, ReliabilityResult},
    types::{Grad, XSpace},
    validation::verify_positive_option,
};
use std::str::FromStr;

/// Default ratio between a random variable's standard deviation and its
/// finite-difference step.
pub const DEFAULT_PERTURBATION_FACTOR: f64 = 1000.0;

/// Gradient of the limit-state function in physical space.
pub trait GradGEvaluator: Send + Sync {
    /// `∇ₓg` at `x`, where `g = g(x)` has already been evaluated.
    fn evaluate_grad_g(&self, g: f64, x: &XSpace) -> ReliabilityResult<Grad>;

    /// Gradient evaluations since the last reset.
    fn number_of_evaluations(&self) -> usize;

    fn reset_counter(&self);

    /// Whether the gradient itself comes from finite differences of `g`.
    fn is_finite_difference(&self) -> bool;
}

/// Finite-difference stencil.
///
/// - `Forward`: `n` extra g-evaluations, first-order accurate.
/// - `Central`: `2n` extra g-evaluations, second-order accurate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiniteDifferenceScheme {
    Forward,
    Central,
}

impl FromStr for FiniteDifferenceScheme {
    type Err = ReliabilityError;

    /// Parse `"forward"` or `"central"`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "forward" => Ok(FiniteDifferenceScheme::Forward),
            "central" => Ok(FiniteDifferenceScheme::Central),
            _ => Err(ReliabilityError::InvalidChoice {
                option: "finite-difference scheme",
                name: s.to_string(),
                reason: "Valid options are case insensitive 'forward' or 'central'.",
            }),
        }
    }
}

/// Finite-difference gradient configuration.
///
/// Default: forward differences, `perturbation_factor = 1000`, sequential.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FiniteDifferenceOptions {
    pub scheme: FiniteDifferenceScheme,
    /// Step for random variable `i` is `σᵢ / perturbation_factor`.
    pub perturbation_factor: f64,
    /// Run perturbations on the `rayon` pool when the g-evaluator is
    /// reentrant.
    pub parallel: bool,
}

impl FiniteDifferenceOptions {
    /// Errors
    /// ------
    /// - `ReliabilityError::InvalidOption` unless `perturbation_factor` is
    ///   finite and strictly positive.
    pub fn new(
        scheme: FiniteDifferenceScheme, perturbation_factor: f64, parallel: bool,
    ) -> ReliabilityResult<Self> {
        let perturbation_factor =
            verify_positive_option("perturbation_factor", perturbation_factor)?;
        Ok(Self { scheme, perturbation_factor, parallel })
    }
}

impl Default for FiniteDifferenceOptions {
    fn default() -> Self {
        Self {
            scheme: FiniteDifferenceScheme::Forward,
            perturbation_factor: DEFAULT_PERTURBATION_FACTOR,
            parallel: false,
        }
    }
}
