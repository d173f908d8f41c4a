//! curvatures::hessian — u-space Hessians and curvature matrices.
//!
//! Purpose
//! -------
//! Build the Hessian of `g(u)` at a design point by differencing the u-space
//! gradient, and turn it into the curvature matrix of the limit-state
//! surface.
//!
//! Key behaviors
//! -------------
//! - With an analytic gradient, [`u_space_hessian`] uses `finitediff`'s
//!   central Hessian, falling back to its forward Hessian when the central
//!   one has non-finite entries. The result is symmetrized in place.
//! - With a finite-difference gradient the `finitediff` step (≈ √ε) is far
//!   below the gradient's own perturbation, so central differences with the
//!   wider step [`STEPPED_HESSIAN_STEP`] are used instead.
//! - [`curvature_matrix`] returns `P H P / ‖∇g‖` with `P = I − ααᵀ`; its
//!   eigenvalues are the principal curvatures (positive when the surface
//!   bends away from the origin) plus a zero along `α`.
use crate::{
    errors::{ReliabilityError, ReliabilityResult},
    search::LimitStateProblem,
    types::{Grad, Hessian, USpace},
    validation::validate_hessian,
};
use finitediff::FiniteDiff;
use ndarray::{Array1, Array2, Axis};
use std::cell::RefCell;

/// u-space step of the stepped central Hessian.
pub const STEPPED_HESSIAN_STEP: f64 = 1e-2;

/// Hessian of `g` in u-space at `u`.
///
/// Errors
/// ------
/// - Any error of the gradient evaluations at the perturbed points.
/// - `ReliabilityError::InvalidHessian` if no finite Hessian is obtained.
pub fn u_space_hessian(problem: &LimitStateProblem, u: &USpace) -> ReliabilityResult<Hessian> {
    let dim = u.len();
    let mut hessian = if problem.has_finite_difference_gradient() {
        stepped_hessian(problem, u, STEPPED_HESSIAN_STEP)?
    } else {
        let closure_err: RefCell<Option<ReliabilityError>> = RefCell::new(None);
        let gradient = |v: &Array1<f64>| -> Array1<f64> {
            match gradient_u_at(problem, v) {
                Ok(grad) => grad,
                Err(e) => {
                    closure_err.replace(Some(e));
                    Array1::from_elem(v.len(), f64::NAN)
                }
            }
        };
        let central = u.central_hessian(&gradient);
        if let Some(err) = closure_err.take() {
            return Err(err);
        }
        match validate_hessian(&central, dim) {
            Ok(()) => central,
            Err(_) => {
                let forward = u.forward_hessian(&gradient);
                if let Some(err) = closure_err.take() {
                    return Err(err);
                }
                forward
            }
        }
    };
    validate_hessian(&hessian, dim)?;
    symmetrize_hessian(&mut hessian);
    Ok(hessian)
}

fn gradient_u_at(problem: &LimitStateProblem, u: &USpace) -> ReliabilityResult<Grad> {
    let iterate = problem.evaluate_with_gradient(u)?;
    Ok(iterate.gradient_u()?.clone())
}

/// Central differences of the u-space gradient with step `h`.
fn stepped_hessian(problem: &LimitStateProblem, u: &USpace, h: f64) -> ReliabilityResult<Hessian> {
    let dim = u.len();
    let mut hessian = Hessian::zeros((dim, dim));
    for j in 0..dim {
        let mut shifted = u.clone();
        shifted[j] = u[j] + h;
        let plus = gradient_u_at(problem, &shifted)?;
        shifted[j] = u[j] - h;
        let minus = gradient_u_at(problem, &shifted)?;
        hessian.index_axis_mut(Axis(1), j).assign(&((plus - minus) / (2.0 * h)));
    }
    Ok(hessian)
}

/// Average `H` with its transpose in place.
pub(crate) fn symmetrize_hessian(hessian: &mut Hessian) {
    for i in 0..hessian.nrows() {
        for j in 0..i {
            let avg = 0.5 * (hessian[[i, j]] + hessian[[j, i]]);
            hessian[[i, j]] = avg;
            hessian[[j, i]] = avg;
        }
    }
}

/// Curvature matrix `P H P / ‖∇g‖`, `P = I − ααᵀ`.
///
/// Errors
/// ------
/// - `ReliabilityError::ZeroGradientNorm` for a zero or non-finite norm.
/// - `ReliabilityError::DimensionMismatch` if `alpha` and `hessian` disagree.
pub fn curvature_matrix(
    hessian: &Hessian, alpha: &Array1<f64>, gradient_norm: f64,
) -> ReliabilityResult<Array2<f64>> {
    if !(gradient_norm > 0.0) || !gradient_norm.is_finite() {
        return Err(ReliabilityError::ZeroGradientNorm { norm: gradient_norm });
    }
    let n = alpha.len();
    if hessian.dim() != (n, n) {
        return Err(ReliabilityError::DimensionMismatch { expected: n, found: hessian.nrows() });
    }
    let outer = alpha
        .view()
        .insert_axis(Axis(1))
        .dot(&alpha.view().insert_axis(Axis(0)));
    let projector = Array2::<f64>::eye(n) - outer;
    Ok(projector.dot(hessian).dot(&projector) / gradient_norm)
}
