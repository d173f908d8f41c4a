//! random_variables::validation — parameter checks for distribution
//! constructors.
//!
//! Each helper returns the validated value so constructors can bind it in
//! one line, and reports the distribution name, parameter name, offending
//! value, and a short reason through
//! [`ReliabilityError::InvalidDistributionParameter`].
use crate::errors::{ReliabilityError, ReliabilityResult};

/// Accept any finite value.
pub fn verify_finite(
    distribution: &'static str, parameter: &'static str, value: f64,
) -> ReliabilityResult<f64> {
    if !value.is_finite() {
        return Err(ReliabilityError::InvalidDistributionParameter {
            distribution,
            parameter,
            value,
            reason: "Parameter must be finite.",
        });
    }
    Ok(value)
}

/// Accept finite, strictly positive values.
pub fn verify_positive(
    distribution: &'static str, parameter: &'static str, value: f64,
) -> ReliabilityResult<f64> {
    verify_finite(distribution, parameter, value)?;
    if value <= 0.0 {
        return Err(ReliabilityError::InvalidDistributionParameter {
            distribution,
            parameter,
            value,
            reason: "Parameter must be strictly positive.",
        });
    }
    Ok(value)
}

/// Accept probabilities in the open interval `(0, 1)`.
pub fn verify_probability(p: f64) -> ReliabilityResult<f64> {
    if !(p > 0.0 && p < 1.0) {
        return Err(ReliabilityError::InvalidProbability { value: p });
    }
    Ok(p)
}
