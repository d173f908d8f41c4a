//! random_variables::inverse — safeguarded bisection for quantile functions
//! without a closed form.
//!
//! The CDF is monotone, so a bracket `[lower, upper]` with
//! `cdf(lower) <= p <= cdf(upper)` always contains the quantile. The upper
//! end is grown geometrically from a caller-supplied guess until it brackets
//! `p`; the bracket is then halved until its width meets the relative
//! tolerance.
use crate::{
    errors::{ReliabilityError, ReliabilityResult},
    random_variables::validation::verify_probability,
};

/// Relative width at which the bisection stops.
pub const BISECTION_TOL: f64 = 1e-13;

const MAX_EXPANSIONS: usize = 1100;
const MAX_BISECTIONS: usize = 400;

/// Invert a monotone CDF on `[lower, ∞)` by bisection.
///
/// Parameters
/// ----------
/// - `cdf`: `&F`
///   Non-decreasing CDF of the distribution.
/// - `p`: `f64`
///   Target probability in `(0, 1)`.
/// - `lower`: `f64`
///   Finite lower end of the support.
/// - `upper_guess`: `f64`
///   Finite starting point for the upper bracket end (e.g. mean plus a few
///   standard deviations); must exceed `lower`.
///
/// Returns
/// -------
/// `ReliabilityResult<f64>`
///   Midpoint of the final bracket.
///
/// Errors
/// ------
/// - `ReliabilityError::InvalidProbability` unless `0 < p < 1`.
/// - `ReliabilityError::InvalidRange` if `lower`/`upper_guess` are not
///   finite and ordered.
/// - `ReliabilityError::RootNotBracketed` if `cdf(upper)` never reaches
///   `p` before the upper end overflows.
pub fn bisect_inverse_cdf<F: Fn(f64) -> f64>(
    cdf: &F, p: f64, lower: f64, upper_guess: f64,
) -> ReliabilityResult<f64> {
    verify_probability(p)?;
    if !lower.is_finite() || !upper_guess.is_finite() || upper_guess <= lower {
        return Err(ReliabilityError::InvalidRange { lower, upper: upper_guess });
    }

    let mut lo = lower;
    let mut hi = upper_guess;
    let mut width = upper_guess - lower;
    let mut expansions = 0;
    while cdf(hi) < p {
        lo = hi;
        width *= 2.0;
        hi = lo + width;
        expansions += 1;
        if expansions > MAX_EXPANSIONS || !hi.is_finite() {
            return Err(ReliabilityError::RootNotBracketed { lower, upper: hi });
        }
    }

    for _ in 0..MAX_BISECTIONS {
        let mid = 0.5 * (lo + hi);
        if hi - lo <= BISECTION_TOL * mid.abs() || hi - lo <= f64::MIN_POSITIVE {
            break;
        }
        if cdf(mid) < p {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Ok(0.5 * (lo + hi))
}
