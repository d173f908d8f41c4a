//! random_variables::traits — the marginal-distribution interface.
//!
//! Purpose
//! -------
//! Define [`RandomVariable`], the read-only view of a marginal distribution
//! that the probability transformation and the finite-difference gradient
//! evaluator consume, plus the small [`Identity`] record (tag and optional
//! start value) every distribution embeds.
//!
//! Invariants & assumptions
//! ------------------------
//! - Parameters are validated at construction and never change afterwards,
//!   so every method takes `&self` and implementations are `Send + Sync`.
//! - `cdf_value` is non-decreasing and maps the support into `[0, 1]`;
//!   `pdf_value` is non-negative; `inverse_cdf_value(cdf_value(x)) ≈ x` on
//!   the interior of the support.
//! - `inverse_cdf_value` accepts only probabilities in the open interval
//!   `(0, 1)`; callers that need the boundary clamp first.
use crate::errors::{ReliabilityError, ReliabilityResult};

/// Marginal distribution of one basic random variable.
pub trait RandomVariable: Send + Sync + std::fmt::Debug {
    /// Tag, unique within a reliability domain.
    fn tag(&self) -> usize;

    /// Distribution family name, e.g. `"Normal"`.
    fn type_name(&self) -> &'static str;

    fn pdf_value(&self, x: f64) -> f64;

    fn cdf_value(&self, x: f64) -> f64;

    /// Quantile function.
    ///
    /// Errors
    /// ------
    /// - `ReliabilityError::InvalidProbability` unless `0 < p < 1`.
    fn inverse_cdf_value(&self, p: f64) -> ReliabilityResult<f64>;

    fn mean(&self) -> f64;

    fn stdv(&self) -> f64;

    /// Start value of the design-point search in x-space.
    ///
    /// Defaults to the mean; distributions with an infinite mean override it.
    fn start_value(&self) -> f64 {
        self.mean()
    }

    /// Distribution parameters in constructor order.
    fn parameters(&self) -> Vec<f64>;
}

/// Tag plus optional explicit start value shared by all distributions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Identity {
    pub tag: usize,
    pub start_value: Option<f64>,
}

impl Identity {
    pub fn new(tag: usize) -> Self {
        Self { tag, start_value: None }
    }

    /// Explicit start value, falling back to `default`.
    pub fn start_or(&self, default: f64) -> f64 {
        self.start_value.unwrap_or(default)
    }

    pub(crate) fn set_start_value(
        &mut self, distribution: &'static str, value: f64,
    ) -> ReliabilityResult<()> {
        if !value.is_finite() {
            return Err(ReliabilityError::InvalidDistributionParameter {
                distribution,
                parameter: "start_value",
                value,
                reason: "Start value must be finite.",
            });
        }
        self.start_value = Some(value);
        Ok(())
    }
}
