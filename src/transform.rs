//! transform — probability transformation between physical space and
//! uncorrelated standard normal space.
//!
//! Purpose
//! -------
//! Map realizations `x` of correlated, non-normal random variables to points
//! `u` of the independent standard normal space where the design-point
//! search runs, map search iterates back, and transform limit-state
//! gradients from x- to u-space.
//!
//! Key behaviors
//! -------------
//! - [`NatafProbabilityTransformation`]: `zᵢ = Φ⁻¹(Fᵢ(xᵢ))`, `u = L⁻¹z` and
//!   back `z = Lu`, `xᵢ = Fᵢ⁻¹(Φ(zᵢ))`, where `L` is the lower Cholesky factor
//!   of the correlation matrix of `z`.
//! - The Jacobian `∂x/∂u` has entries `φ(zᵢ)/fᵢ(xᵢ) · Lᵢⱼ`; gradients map as
//!   `∇ᵤg = (∂x/∂u)ᵀ ∇ₓg`.
//! - Without correlation, `L = I` and the transformation is the usual
//!   marginal (independent) mapping.
//!
//! Invariants & assumptions
//! ------------------------
//! - Probabilities handed to `Φ⁻¹` and `Fᵢ⁻¹` are clamped to
//!   `[f64::MIN_POSITIVE, 1 − f64::EPSILON]`, so points deep in the tails map
//!   to finite values instead of failing.
//! - A vanishing marginal density in the Jacobian is reported as
//!   [`ReliabilityError::ZeroDensity`].
//!
//! Downstream usage
//! ----------------
//! - The search problem holds one transformation behind
//!   `Arc<dyn ProbabilityTransformation>` and calls it once per iterate.
//! - [`draw_realization`] combines a transformation with a
//!   [`RandomNumberGenerator`] to sample physical realizations.
use crate::{
    domain::ReliabilityDomain,
    errors::{ReliabilityError, ReliabilityResult},
    linalg::MatrixOperations,
    random_numbers::RandomNumberGenerator,
    random_variables::RandomVariable,
    types::{Grad, USpace, XSpace},
};
use ndarray::{Array1, Array2};
use statrs::distribution::{Continuous, ContinuousCDF, Normal};
use std::sync::Arc;

const P_LOWER: f64 = f64::MIN_POSITIVE;
const P_UPPER: f64 = 1.0 - f64::EPSILON;

pub trait ProbabilityTransformation: Send + Sync {
    fn dimension(&self) -> usize;

    fn x_to_u(&self, x: &XSpace) -> ReliabilityResult<USpace>;

    fn u_to_x(&self, u: &USpace) -> ReliabilityResult<XSpace>;

    /// Jacobian `∂x/∂u` at the pair `(u, x = T⁻¹(u))`.
    fn jacobian_x_u(&self, u: &USpace, x: &XSpace) -> ReliabilityResult<Array2<f64>>;

    /// `∇ᵤg = (∂x/∂u)ᵀ ∇ₓg`.
    fn gradient_x_to_u(&self, u: &USpace, x: &XSpace, grad_x: &Grad) -> ReliabilityResult<Grad> {
        if grad_x.len() != self.dimension() {
            return Err(ReliabilityError::GradientDimMismatch {
                expected: self.dimension(),
                found: grad_x.len(),
            });
        }
        Ok(self.jacobian_x_u(u, x)?.t().dot(grad_x))
    }

    /// Marginals in vector order.
    fn random_variables(&self) -> &[Arc<dyn RandomVariable>];
}

#[derive(Debug, Clone)]
pub struct NatafProbabilityTransformation {
    random_variables: Vec<Arc<dyn RandomVariable>>,
    lower_cholesky: Array2<f64>,
    inverse_lower_cholesky: Array2<f64>,
    std_normal: Normal,
}

impl NatafProbabilityTransformation {
    /// Build the transformation for all random variables of `domain`.
    ///
    /// Errors
    /// ------
    /// - `ReliabilityError::EmptyDomain` without random variables.
    /// - `ReliabilityError::NotPositiveDefinite` if the correlation matrix
    ///   cannot be factored.
    pub fn from_domain(domain: &ReliabilityDomain) -> ReliabilityResult<Self> {
        Self::new(domain.random_variables(), domain.correlation_matrix()?)
    }

    /// Build from marginals and a correlation matrix of the normal images.
    ///
    /// Errors
    /// ------
    /// - `ReliabilityError::DimensionMismatch` if the matrix does not match
    ///   the number of marginals.
    /// - Factorization errors from
    ///   [`MatrixOperations::compute_cholesky_and_its_inverse`].
    pub fn new(
        random_variables: Vec<Arc<dyn RandomVariable>>, correlation: Array2<f64>,
    ) -> ReliabilityResult<Self> {
        let n = random_variables.len();
        if n == 0 {
            return Err(ReliabilityError::EmptyDomain);
        }
        if correlation.nrows() != n {
            return Err(ReliabilityError::DimensionMismatch {
                expected: n,
                found: correlation.nrows(),
            });
        }
        let mut ops = MatrixOperations::new(correlation)?;
        ops.compute_cholesky_and_its_inverse()?;
        let lower_cholesky = ops.lower_cholesky()?.clone();
        let inverse_lower_cholesky = ops.inverse_lower_cholesky()?.clone();
        let std_normal = Normal::new(0.0, 1.0)
            .map_err(|e| ReliabilityError::BackendError { text: e.to_string() })?;
        Ok(Self { random_variables, lower_cholesky, inverse_lower_cholesky, std_normal })
    }

    /// Independent marginals (identity correlation).
    pub fn independent(random_variables: Vec<Arc<dyn RandomVariable>>) -> ReliabilityResult<Self> {
        let n = random_variables.len();
        Self::new(random_variables, Array2::eye(n))
    }

    fn check_dimension(&self, len: usize) -> ReliabilityResult<()> {
        if len != self.random_variables.len() {
            return Err(ReliabilityError::DimensionMismatch {
                expected: self.random_variables.len(),
                found: len,
            });
        }
        Ok(())
    }
}

impl ProbabilityTransformation for NatafProbabilityTransformation {
    fn dimension(&self) -> usize {
        self.random_variables.len()
    }

    fn x_to_u(&self, x: &XSpace) -> ReliabilityResult<USpace> {
        self.check_dimension(x.len())?;
        let z: Array1<f64> = self
            .random_variables
            .iter()
            .zip(x.iter())
            .map(|(rv, &xi)| self.std_normal.inverse_cdf(rv.cdf_value(xi).clamp(P_LOWER, P_UPPER)))
            .collect();
        Ok(self.inverse_lower_cholesky.dot(&z))
    }

    fn u_to_x(&self, u: &USpace) -> ReliabilityResult<XSpace> {
        self.check_dimension(u.len())?;
        let z = self.lower_cholesky.dot(u);
        self.random_variables
            .iter()
            .zip(z.iter())
            .map(|(rv, &zi)| rv.inverse_cdf_value(self.std_normal.cdf(zi).clamp(P_LOWER, P_UPPER)))
            .collect()
    }

    fn jacobian_x_u(&self, u: &USpace, x: &XSpace) -> ReliabilityResult<Array2<f64>> {
        self.check_dimension(u.len())?;
        self.check_dimension(x.len())?;
        let z = self.lower_cholesky.dot(u);
        let mut jacobian = self.lower_cholesky.clone();
        for (i, mut row) in jacobian.rows_mut().into_iter().enumerate() {
            let density = self.random_variables[i].pdf_value(x[i]);
            if !(density > 0.0 && density.is_finite()) {
                return Err(ReliabilityError::ZeroDensity { index: i, x: x[i] });
            }
            row *= self.std_normal.pdf(z[i]) / density;
        }
        Ok(jacobian)
    }

    fn random_variables(&self) -> &[Arc<dyn RandomVariable>] {
        &self.random_variables
    }
}

/// Sample one physical realization: draw `u ~ N(0, I)` and map it to x.
///
/// `seed` follows the [`RandomNumberGenerator`] convention (`0` continues
/// the current stream).
pub fn draw_realization<T, R>(
    transformation: &T, rng: &mut R, seed: u64,
) -> ReliabilityResult<XSpace>
where
    T: ProbabilityTransformation + ?Sized,
    R: RandomNumberGenerator + ?Sized,
{
    let u = rng.generate_n_independent_std_normal_numbers(transformation.dimension(), seed)?;
    transformation.u_to_x(&u)
}
