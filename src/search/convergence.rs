//! search::convergence — design-point convergence criteria.
//!
//! Purpose
//! -------
//! Decide when an iterate is the design point. The standard check combines
//! two criteria:
//!
//! - `c1 = |g(u)| / scale` — closeness to the limit-state surface, relative
//!   to `|g|` at the first iterate (or 1 if that value is essentially zero);
//! - `c2 = ‖u − (α·u) α‖` — departure of `u` from the direction of the
//!   gradient, i.e. how far the iterate is from satisfying the optimality
//!   condition `u ∥ α`.
//!
//! Convergence requires `c1 <= e1` and `c2 <= e2`.
use crate::{
    errors::{ReliabilityError, ReliabilityResult},
    types::{Grad, USpace},
    validation::verify_tol,
};
use argmin_math::ArgminL2Norm;
use ndarray::Array1;

/// Default tolerance on both criteria.
pub const DEFAULT_CONVERGENCE_TOL: f64 = 1e-3;

/// `|g₀|` below this falls back to a unit scale for `c1`.
const SCALE_FLOOR: f64 = 1e-14;

pub trait ReliabilityConvergenceCheck: Send + Sync {
    /// Forget the scale of a previous search.
    fn reset(&mut self);

    /// Fix the scale of `c1` from g at the first iterate.
    fn set_scale_value(&mut self, g_first: f64);

    /// Raw criteria `(c1, c2)` at an iterate.
    fn criteria(&self, u: &USpace, g: f64, gradient_u: &Grad) -> ReliabilityResult<(f64, f64)>;

    fn tolerances(&self) -> (f64, f64);

    fn check(&self, criteria: (f64, f64)) -> bool {
        let (e1, e2) = self.tolerances();
        criteria.0 <= e1 && criteria.1 <= e2
    }
}

/// Unit vector `α = −∇g/‖∇g‖`.
///
/// Errors
/// ------
/// - `ReliabilityError::ZeroGradientNorm` when `‖∇g‖` is zero or not finite.
pub fn alpha_from_gradient(gradient_u: &Grad) -> ReliabilityResult<Array1<f64>> {
    let norm = gradient_u.l2_norm();
    if !(norm > 0.0) || !norm.is_finite() {
        return Err(ReliabilityError::ZeroGradientNorm { norm });
    }
    Ok(gradient_u.mapv(|v| -v / norm))
}

#[derive(Debug, Clone, PartialEq)]
pub struct StandardReliabilityConvergenceCheck {
    e1: f64,
    e2: f64,
    scale: Option<f64>,
}

impl StandardReliabilityConvergenceCheck {
    /// Errors
    /// ------
    /// - `ReliabilityError::InvalidTolerance` unless both tolerances are
    ///   finite and positive.
    pub fn new(e1: f64, e2: f64) -> ReliabilityResult<Self> {
        Ok(Self { e1: verify_tol("e1", e1)?, e2: verify_tol("e2", e2)?, scale: None })
    }

    /// Scale of `c1`; 1 until the first iterate is seen.
    pub fn scale(&self) -> f64 {
        self.scale.unwrap_or(1.0)
    }

    pub fn is_scaled(&self) -> bool {
        self.scale.is_some()
    }
}

impl Default for StandardReliabilityConvergenceCheck {
    fn default() -> Self {
        Self { e1: DEFAULT_CONVERGENCE_TOL, e2: DEFAULT_CONVERGENCE_TOL, scale: None }
    }
}

impl ReliabilityConvergenceCheck for StandardReliabilityConvergenceCheck {
    fn reset(&mut self) {
        self.scale = None;
    }

    fn set_scale_value(&mut self, g_first: f64) {
        let magnitude = g_first.abs();
        self.scale = Some(if magnitude.is_finite() && magnitude > SCALE_FLOOR { magnitude } else { 1.0 });
    }

    fn criteria(&self, u: &USpace, g: f64, gradient_u: &Grad) -> ReliabilityResult<(f64, f64)> {
        let alpha = alpha_from_gradient(gradient_u)?;
        let c1 = g.abs() / self.scale();
        let residual = u - &(&alpha * alpha.dot(u));
        let c2 = residual.l2_norm();
        Ok((c1, c2))
    }

    fn tolerances(&self) -> (f64, f64) {
        (self.e1, self.e2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Both criteria at points on and off the optimality line.
    // - The unit-scale fallback for a start point on the surface.
    // - Rejection of a zero gradient.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // A point on the limit-state surface along the gradient satisfies both
    // criteria; a tangential offset violates only c2.
    //
    // Given
    // -----
    // - `g = 2 − u₀`, scale set from g₀ = 2.
    //
    // Expect
    // ------
    // - At (2, 0): criteria (0, 0) and converged.
    // - At (2, 0.5): c2 = 0.5, not converged.
    fn criteria_on_linear_surface() {
        // Arrange
        let mut check = StandardReliabilityConvergenceCheck::default();
        check.set_scale_value(2.0);
        let grad = array![-1.0, 0.0];

        // Act
        let on = check.criteria(&array![2.0, 0.0], 0.0, &grad).unwrap();
        let off = check.criteria(&array![2.0, 0.5], 0.0, &grad).unwrap();

        // Assert
        assert_relative_eq!(on.0, 0.0);
        assert_relative_eq!(on.1, 0.0);
        assert!(check.check(on));
        assert_relative_eq!(off.1, 0.5, epsilon = 1e-12);
        assert!(!check.check(off));
    }

    #[test]
    fn first_value_scales_c1_with_unit_fallback() {
        let mut check = StandardReliabilityConvergenceCheck::new(1e-3, 1e-3).unwrap();
        check.set_scale_value(-4.0);
        let c = check.criteria(&array![0.0], 1.0, &array![1.0]).unwrap();
        assert_relative_eq!(c.0, 0.25);

        check.set_scale_value(0.0);
        assert_relative_eq!(check.scale(), 1.0);
        check.reset();
        assert_relative_eq!(check.scale(), 1.0);
    }

    #[test]
    fn zero_gradient_is_degenerate() {
        let check = StandardReliabilityConvergenceCheck::default();
        assert!(matches!(
            check.criteria(&array![1.0], 1.0, &array![0.0]),
            Err(ReliabilityError::ZeroGradientNorm { .. })
        ));
        assert!(StandardReliabilityConvergenceCheck::new(0.0, 1e-3).is_err());
    }
}
