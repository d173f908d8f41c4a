//! curvatures — second-order (SORM) curvature estimation at a design point.
//!
//! Purpose
//! -------
//! Estimate the principal curvatures of the limit-state surface at a
//! converged [`DesignPoint`]. Curvatures are signed: positive when the
//! surface bends away from the origin of u-space (the failure domain is
//! then smaller than FORM's half-space).
//!
//! Variants
//! --------
//! - [`FirstPrincipalCurvature`] — largest-magnitude eigenvalue of the
//!   projected Hessian.
//! - [`CurvaturesBySearchAlgorithm`] — repeated design-point searches started
//!   off the design point; each curvature from the last two iterates.
//! - [`CurvaturesByPointFitting`] — semi-paraboloid fitting along tangent
//!   axes, fitting points located with `argmin`'s Brent root solver.
//!
//! Conventions
//! -----------
//! - `compute_curvatures` returns the new curvature vector and stores it;
//!   `curvatures()` returns the last stored vector or
//!   `ReliabilityError::NotComputed`.
use crate::{
    errors::{ReliabilityError, ReliabilityResult},
    search::{DesignPoint, LimitStateProblem},
};
use ndarray::Array1;

pub mod by_search;
pub mod first_principal;
pub mod hessian;
pub mod point_fitting;

pub use by_search::CurvaturesBySearchAlgorithm;
pub use first_principal::FirstPrincipalCurvature;
pub use point_fitting::{CurvaturesByPointFitting, PointFittingOptions};

/// Residual norms below this are discarded when building tangent bases.
const BASIS_TOL: f64 = 1e-8;

pub trait FindCurvatures {
    fn compute_curvatures(
        &mut self, problem: &LimitStateProblem, design_point: &DesignPoint,
    ) -> ReliabilityResult<Array1<f64>>;

    fn curvatures(&self) -> ReliabilityResult<&Array1<f64>>;
}

/// Orthonormal basis of the plane orthogonal to `alpha` and to every
/// vector of `excluded` (assumed orthonormal), by Gram–Schmidt over the
/// coordinate axes.
pub(crate) fn tangent_basis(
    alpha: &Array1<f64>, excluded: &[Array1<f64>],
) -> ReliabilityResult<Vec<Array1<f64>>> {
    let n = alpha.len();
    let alpha_norm = alpha.dot(alpha).sqrt();
    if !(alpha_norm > 0.0) || !alpha_norm.is_finite() {
        return Err(ReliabilityError::ZeroGradientNorm { norm: alpha_norm });
    }
    let mut basis: Vec<Array1<f64>> = vec![alpha / alpha_norm];
    basis.extend(excluded.iter().cloned());
    let fixed = basis.len();
    for j in 0..n {
        let mut v = Array1::<f64>::zeros(n);
        v[j] = 1.0;
        for b in &basis {
            let component = v.dot(b);
            v.scaled_add(-component, b);
        }
        let norm = v.dot(&v).sqrt();
        if norm > BASIS_TOL {
            basis.push(v / norm);
        }
    }
    Ok(basis.split_off(fixed))
}
