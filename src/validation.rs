//! Validation helpers shared by evaluators, search options and curvature
//! estimators.
//!
//! - **Option checks**: [`verify_tol`], [`verify_positive_option`],
//!   [`verify_max_iter`] ensure numeric settings are finite and strictly
//!   positive.
//! - **Response checks**: [`validate_value`] rejects non-finite limit-state
//!   values.
//! - **Derivative checks**: [`validate_grad`] and [`validate_hessian`]
//!   enforce dimensions and finite entries.
//!
//! All helpers return [`ReliabilityError`] variants so callers can propagate
//! with `?`.
use crate::{
    errors::{ReliabilityError, ReliabilityResult},
    types::{Grad, Hessian},
};

/// Validate a convergence tolerance: finite and strictly positive.
///
/// # Errors
/// Returns [`ReliabilityError::InvalidTolerance`] otherwise.
pub fn verify_tol(name: &'static str, tol: f64) -> ReliabilityResult<f64> {
    if !tol.is_finite() {
        return Err(ReliabilityError::InvalidTolerance {
            name,
            value: tol,
            reason: "Tolerance must be finite.",
        });
    }
    if tol <= 0.0 {
        return Err(ReliabilityError::InvalidTolerance {
            name,
            value: tol,
            reason: "Tolerance must be positive.",
        });
    }
    Ok(tol)
}

/// Validate a numeric option: finite and strictly positive.
///
/// # Errors
/// Returns [`ReliabilityError::InvalidOption`] otherwise.
pub fn verify_positive_option(name: &'static str, value: f64) -> ReliabilityResult<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ReliabilityError::InvalidOption {
            name,
            value,
            reason: "Value must be finite and strictly positive.",
        });
    }
    Ok(value)
}

/// Validate an option that must lie in the open interval `(0, 1)`.
pub fn verify_unit_interval_option(name: &'static str, value: f64) -> ReliabilityResult<f64> {
    if !(value > 0.0 && value < 1.0) {
        return Err(ReliabilityError::InvalidOption {
            name,
            value,
            reason: "Value must lie strictly between 0 and 1.",
        });
    }
    Ok(value)
}

/// Validate an iteration cap.
///
/// # Errors
/// Returns [`ReliabilityError::InvalidMaxIter`] when `max_iter == 0`.
pub fn verify_max_iter(max_iter: usize) -> ReliabilityResult<usize> {
    if max_iter == 0 {
        return Err(ReliabilityError::InvalidMaxIter {
            max_iter,
            reason: "Maximum iterations must be greater than zero.",
        });
    }
    Ok(max_iter)
}

/// Validate that a limit-state value is finite.
///
/// # Errors
/// Returns [`ReliabilityError::NonFiniteResponse`] if the value is `NaN` or
/// infinite.
pub fn validate_value(value: f64) -> ReliabilityResult<f64> {
    if !value.is_finite() {
        return Err(ReliabilityError::NonFiniteResponse { value });
    }
    Ok(value)
}

/// Validate a gradient vector against dimension and finiteness.
///
/// # Errors
/// - [`ReliabilityError::GradientDimMismatch`] if length does not match `dim`.
/// - [`ReliabilityError::InvalidGradient`] with the index/value/reason of the
///   first offending element.
pub fn validate_grad(grad: &Grad, dim: usize) -> ReliabilityResult<()> {
    if grad.len() != dim {
        return Err(ReliabilityError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    for (index, &value) in grad.iter().enumerate() {
        if !value.is_finite() {
            return Err(ReliabilityError::InvalidGradient {
                index,
                value,
                reason: "Gradient elements must be finite.",
            });
        }
    }
    Ok(())
}

/// Validate the shape and entries of a Hessian matrix.
///
/// # Errors
/// - [`ReliabilityError::HessianDimMismatch`] if dimensions do not match
///   `dim`.
/// - [`ReliabilityError::InvalidHessian`] if any entry is non-finite.
pub fn validate_hessian(hessian: &Hessian, dim: usize) -> ReliabilityResult<()> {
    if hessian.nrows() != dim || hessian.ncols() != dim {
        return Err(ReliabilityError::HessianDimMismatch {
            expected: dim,
            found: (hessian.nrows(), hessian.ncols()),
        });
    }
    for ((row, col), &value) in hessian.indexed_iter() {
        if !value.is_finite() {
            return Err(ReliabilityError::InvalidHessian { row, col, value });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, array};

    #[test]
    // Purpose
    // -------
    // Tolerances reject NaN, ±∞ and non-positive values.
    fn verify_tol_with_invalid_values_returns_error() {
        for tol in [0.0, -1e-3, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                verify_tol("e1", tol),
                Err(ReliabilityError::InvalidTolerance { name: "e1", .. })
            ));
        }
        assert_eq!(verify_tol("e1", 1e-3), Ok(1e-3));
    }

    #[test]
    // Purpose
    // -------
    // `validate_grad` reports the first non-finite entry and wrong lengths.
    fn validate_grad_reports_first_bad_entry() {
        let grad = array![1.0, f64::NAN, f64::INFINITY];
        assert!(matches!(
            validate_grad(&grad, 3),
            Err(ReliabilityError::InvalidGradient { index: 1, .. })
        ));
        assert_eq!(
            validate_grad(&grad, 2),
            Err(ReliabilityError::GradientDimMismatch { expected: 2, found: 3 })
        );
    }

    #[test]
    fn validate_hessian_checks_shape_and_entries() {
        let mut h = Array2::<f64>::zeros((2, 2));
        assert!(validate_hessian(&h, 2).is_ok());
        assert!(matches!(
            validate_hessian(&h, 3),
            Err(ReliabilityError::HessianDimMismatch { expected: 3, found: (2, 2) })
        ));
        h[[1, 0]] = f64::NEG_INFINITY;
        assert!(matches!(
            validate_hessian(&h, 2),
            Err(ReliabilityError::InvalidHessian { row: 1, col: 0, .. })
        ));
    }

    #[test]
    fn option_checks() {
        assert!(verify_max_iter(0).is_err());
        assert!(verify_positive_option("factor", -2.0).is_err());
        assert!(verify_unit_interval_option("base", 1.0).is_err());
        assert_eq!(validate_value(2.0), Ok(2.0));
        assert!(validate_value(f64::NAN).is_err());
    }
}
