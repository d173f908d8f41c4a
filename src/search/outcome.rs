//! search::outcome — search status, per-iterate records and design points.
//!
//! Purpose
//! -------
//! Hold the value types produced by a design-point search: the state-machine
//! status, one [`IterationRecord`] per evaluated iterate, and the converged
//! [`DesignPoint`].
//!
//! Conventions
//! -----------
//! - `alpha` is the unit vector `-∇g/‖∇g‖` in u-space and
//!   `beta = alpha · u` is the *signed* reliability index: negative when the
//!   origin lies in the failure domain.
//! - `iterations` counts evaluated iterates, so a search that converges at
//!   its start point has `iterations == 1` and took zero steps.
use crate::types::{Grad, USpace, XSpace};
use ndarray::Array1;
use statrs::distribution::{ContinuousCDF, Normal};

/// States of the design-point search.
///
/// `Initialized → Iterating → {Converged, MaxIterationsExceeded,
/// EvaluationFailed, InvalidConfiguration, NumericalDegeneracy, Cancelled}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchStatus {
    Initialized,
    Iterating,
    Converged,
    MaxIterationsExceeded,
    EvaluationFailed,
    /// The problem turned out to be misconfigured once iterating, e.g. an
    /// evaluator whose dimensions disagree with the transformation.
    InvalidConfiguration,
    NumericalDegeneracy,
    Cancelled,
}

impl SearchStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, SearchStatus::Initialized | SearchStatus::Iterating)
    }
}

/// Snapshot of one evaluated iterate.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationRecord {
    /// 1-based iterate number.
    pub iteration: usize,
    pub u: USpace,
    pub x: XSpace,
    pub g: f64,
    /// Limit-state gradient in u-space.
    pub gradient_u: Grad,
    pub alpha: Array1<f64>,
    pub beta: f64,
    /// Raw convergence criteria `(|g|/scale, ‖u − (α·u)α‖)`.
    pub criteria: (f64, f64),
    /// Step size used to leave this iterate; `None` for the last one.
    pub step_size: Option<f64>,
}

impl IterationRecord {
    /// Distance of this iterate from convergence: `max(c1/e1, c2/e2)`.
    ///
    /// Values `<= 1` mean both criteria are satisfied.
    pub fn score(&self, e1: f64, e2: f64) -> f64 {
        (self.criteria.0 / e1).max(self.criteria.1 / e2)
    }
}

/// Converged design point (most probable failure point).
#[derive(Debug, Clone, PartialEq)]
pub struct DesignPoint {
    pub u: USpace,
    pub x: XSpace,
    pub g: f64,
    pub gradient_u: Grad,
    pub gradient_x: Grad,
    pub alpha: Array1<f64>,
    pub beta: f64,
    /// Evaluated iterates, including the converged one.
    pub iterations: usize,
    pub g_evaluations: usize,
    pub grad_evaluations: usize,
    /// Iterate preceding the converged one, if any step was taken.
    pub second_last: Option<IterationRecord>,
    /// Full trace when requested through `SearchOptions::record_trace`.
    pub trace: Option<Vec<IterationRecord>>,
}

impl DesignPoint {
    /// Number of steps taken from the start point.
    pub fn steps(&self) -> usize {
        self.iterations.saturating_sub(1)
    }

    /// First-order probability of failure `Φ(-β)`.
    pub fn form_probability(&self) -> f64 {
        standard_normal_cdf(-self.beta)
    }
}

/// Standard normal CDF.
pub(crate) fn standard_normal_cdf(z: f64) -> f64 {
    match Normal::new(0.0, 1.0) {
        Ok(n) => n.cdf(z),
        Err(_) => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn record(criteria: (f64, f64)) -> IterationRecord {
        IterationRecord {
            iteration: 1,
            u: array![0.0],
            x: array![0.0],
            g: 1.0,
            gradient_u: array![-1.0],
            alpha: array![1.0],
            beta: 0.0,
            criteria,
            step_size: None,
        }
    }

    #[test]
    // Purpose
    // -------
    // The iterate score is the larger of the two normalized criteria.
    fn score_takes_worst_normalized_criterion() {
        let r = record((2e-3, 5e-4));
        assert_relative_eq!(r.score(1e-3, 1e-3), 2.0);
        assert_relative_eq!(r.score(1e-2, 1e-4), 5.0);
    }

    #[test]
    // Purpose
    // -------
    // `form_probability` evaluates `Φ(-β)`; β = 0 gives one half.
    fn form_probability_at_zero_beta_is_one_half() {
        let dp = DesignPoint {
            u: array![0.0],
            x: array![0.0],
            g: 0.0,
            gradient_u: array![-1.0],
            gradient_x: array![-1.0],
            alpha: array![1.0],
            beta: 0.0,
            iterations: 1,
            g_evaluations: 1,
            grad_evaluations: 1,
            second_last: None,
            trace: None,
        };
        assert_relative_eq!(dp.form_probability(), 0.5, epsilon = 1e-12);
        assert_eq!(dp.steps(), 0);
    }
}
