//! search::direction — search directions in u-space.
use crate::{
    errors::{ReliabilityError, ReliabilityResult},
    types::{Grad, USpace},
};
use ndarray::Array1;

pub trait SearchDirection: Send + Sync {
    fn compute_search_direction(
        &self, u: &USpace, g: f64, gradient_u: &Grad,
    ) -> ReliabilityResult<Array1<f64>>;
}

/// Hasofer–Lind–Rackwitz–Fiessler direction.
///
/// `d = ((∇g·u − g) / ‖∇g‖²) ∇g − u`: a full step lands on the
/// linearization's closest point to the origin, so a linear limit state is
/// solved in one step from any start point.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HLRFSearchDirection;

impl HLRFSearchDirection {
    pub fn new() -> Self {
        Self
    }
}

impl SearchDirection for HLRFSearchDirection {
    fn compute_search_direction(
        &self, u: &USpace, g: f64, gradient_u: &Grad,
    ) -> ReliabilityResult<Array1<f64>> {
        let norm_sq = gradient_u.dot(gradient_u);
        if !(norm_sq > 0.0) || !norm_sq.is_finite() {
            return Err(ReliabilityError::ZeroGradientNorm { norm: norm_sq.sqrt() });
        }
        let factor = (gradient_u.dot(u) - g) / norm_sq;
        Ok(gradient_u * factor - u)
    }
}
