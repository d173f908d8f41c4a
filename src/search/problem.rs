//! search::problem — the limit-state problem as seen from u-space.
//!
//! Purpose
//! -------
//! Bundle the probability transformation with the g- and ∇g-evaluators so
//! the search components can work purely in standard normal space:
//! [`LimitStateProblem::evaluate`] maps `u → x → g`, and
//! [`LimitStateProblem::evaluate_gradient`] completes an [`Iterate`] with
//! `∇ₓg` and `∇ᵤg = Jᵀ∇ₓg`.
//!
//! Key behaviors
//! -------------
//! - A problem can be *restricted* with [`LimitStateProblem::excluding`]:
//!   iterates and u-space gradients are projected onto the orthogonal
//!   complement of the excluded directions. Curvature-by-search uses this to
//!   confine later searches away from already found principal axes.
//! - Evaluation counters are read from the evaluators, so a restricted copy
//!   shares the counts of the problem it was derived from.
use crate::{
    errors::{ReliabilityError, ReliabilityResult},
    evaluators::{GFunEvaluator, GradGEvaluator},
    reporting::Reporter,
    transform::ProbabilityTransformation,
    types::{Grad, USpace, XSpace},
};
use ndarray::Array1;
use std::sync::Arc;

/// Norms below this are treated as zero when orthonormalizing directions.
const DIRECTION_TOL: f64 = 1e-12;

/// Gradient of g at an iterate, in both spaces.
#[derive(Debug, Clone, PartialEq)]
pub struct IterateGradient {
    pub x: Grad,
    pub u: Grad,
}

/// One evaluated point of a search.
#[derive(Debug, Clone, PartialEq)]
pub struct Iterate {
    pub u: USpace,
    pub x: XSpace,
    pub g: f64,
    pub gradient: Option<IterateGradient>,
}

impl Iterate {
    /// u-space gradient, or `NotComputed` if it was not evaluated yet.
    pub fn gradient_u(&self) -> ReliabilityResult<&Grad> {
        self.gradient
            .as_ref()
            .map(|grad| &grad.u)
            .ok_or(ReliabilityError::NotComputed { product: "limit-state gradient" })
    }
}

#[derive(Clone)]
pub struct LimitStateProblem {
    transformation: Arc<dyn ProbabilityTransformation>,
    gfun: Arc<dyn GFunEvaluator>,
    gradg: Arc<dyn GradGEvaluator>,
    reporter: Arc<dyn Reporter>,
    excluded: Vec<Array1<f64>>,
}

impl LimitStateProblem {
    pub fn new(
        transformation: Arc<dyn ProbabilityTransformation>, gfun: Arc<dyn GFunEvaluator>,
        gradg: Arc<dyn GradGEvaluator>, reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self { transformation, gfun, gradg, reporter, excluded: Vec::new() }
    }

    /// Copy of this problem restricted to the orthogonal complement of
    /// `directions` (in addition to any directions already excluded).
    ///
    /// Errors
    /// ------
    /// - `ReliabilityError::DimensionMismatch` for a direction of the wrong
    ///   length.
    /// - `ReliabilityError::DegenerateCurvature` when a direction is zero or
    ///   lies in the span of the others.
    pub fn excluding(&self, directions: &[Array1<f64>]) -> ReliabilityResult<Self> {
        let n = self.dimension();
        let mut restricted = self.clone();
        for direction in directions {
            if direction.len() != n {
                return Err(ReliabilityError::DimensionMismatch {
                    expected: n,
                    found: direction.len(),
                });
            }
            // Gram–Schmidt against what is already excluded.
            let residual = restricted.project(direction);
            let norm = residual.dot(&residual).sqrt();
            if !(norm > DIRECTION_TOL) {
                return Err(ReliabilityError::DegenerateCurvature {
                    reason: "Excluded direction is zero or linearly dependent.",
                });
            }
            restricted.excluded.push(residual / norm);
        }
        Ok(restricted)
    }

    /// Remove the components of `v` along the excluded directions.
    pub fn project(&self, v: &Array1<f64>) -> Array1<f64> {
        let mut projected = v.clone();
        for e in &self.excluded {
            let component = projected.dot(e);
            projected.scaled_add(-component, e);
        }
        projected
    }

    /// Copy of this problem reporting to `reporter`.
    pub fn with_reporter(&self, reporter: Arc<dyn Reporter>) -> Self {
        Self { reporter, ..self.clone() }
    }

    /// Whether `∇ₓg` comes from finite differences.
    pub fn has_finite_difference_gradient(&self) -> bool {
        self.gradg.is_finite_difference()
    }

    pub fn excluded_directions(&self) -> &[Array1<f64>] {
        &self.excluded
    }

    pub fn dimension(&self) -> usize {
        self.transformation.dimension()
    }

    pub fn transformation(&self) -> &Arc<dyn ProbabilityTransformation> {
        &self.transformation
    }

    pub fn reporter(&self) -> &Arc<dyn Reporter> {
        &self.reporter
    }

    pub fn g_evaluations(&self) -> usize {
        self.gfun.number_of_evaluations()
    }

    pub fn grad_evaluations(&self) -> usize {
        self.gradg.number_of_evaluations()
    }

    /// Evaluate g at `u` (projected onto the admissible subspace).
    pub fn evaluate(&self, u: &USpace) -> ReliabilityResult<Iterate> {
        if u.len() != self.dimension() {
            return Err(ReliabilityError::DimensionMismatch {
                expected: self.dimension(),
                found: u.len(),
            });
        }
        let u = self.project(u);
        let x = self.transformation.u_to_x(&u)?;
        let g = self.gfun.evaluate_g(&x)?;
        Ok(Iterate { u, x, g, gradient: None })
    }

    /// Fill in the gradient of `iterate` unless it is already known.
    pub fn evaluate_gradient(&self, iterate: &mut Iterate) -> ReliabilityResult<()> {
        if iterate.gradient.is_some() {
            return Ok(());
        }
        let grad_x = self.gradg.evaluate_grad_g(iterate.g, &iterate.x)?;
        let grad_u = self.transformation.gradient_x_to_u(&iterate.u, &iterate.x, &grad_x)?;
        iterate.gradient = Some(IterateGradient { x: grad_x, u: self.project(&grad_u) });
        Ok(())
    }

    /// Evaluate g and its gradient at `u`.
    pub fn evaluate_with_gradient(&self, u: &USpace) -> ReliabilityResult<Iterate> {
        let mut iterate = self.evaluate(u)?;
        self.evaluate_gradient(&mut iterate)?;
        Ok(iterate)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::paraboloid;
    use super::*;
    use crate::reporting::RecordingReporter;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Evaluation maps u to g and completes the gradient on demand.
    fn evaluate_and_gradient_on_paraboloid() {
        let problem = paraboloid(2.0, &[0.2], Arc::new(RecordingReporter::new()));

        let mut iterate = problem.evaluate(&array![1.0, 2.0]).unwrap();
        assert_relative_eq!(iterate.g, 2.0 - 1.0 + 0.4, epsilon = 1e-12);
        assert!(iterate.gradient_u().is_err());

        problem.evaluate_gradient(&mut iterate).unwrap();
        let grad = iterate.gradient_u().unwrap();
        assert_relative_eq!(grad[0], -1.0, epsilon = 1e-9);
        assert_relative_eq!(grad[1], 0.4, epsilon = 1e-9);
        assert_eq!(problem.g_evaluations(), 1);
        assert_eq!(problem.grad_evaluations(), 1);
    }

    #[test]
    // Purpose
    // -------
    // A restricted problem projects iterates and gradients onto the
    // complement of the excluded directions.
    //
    // Given
    // -----
    // - Three variables with `e₁` excluded, then an attempt to exclude a
    //   direction dependent on `e₁`.
    //
    // Expect
    // ------
    // - The second coordinate of iterate and gradient is zero.
    // - The dependent direction is rejected.
    fn excluding_projects_iterates_and_gradients() {
        // Arrange
        let problem = paraboloid(2.0, &[0.2, 0.3], Arc::new(RecordingReporter::new()));

        // Act
        let restricted = problem.excluding(&[array![0.0, 2.0, 0.0]]).unwrap();
        let iterate = restricted.evaluate_with_gradient(&array![1.0, 1.0, 1.0]).unwrap();

        // Assert
        assert_eq!(iterate.u, array![1.0, 0.0, 1.0]);
        assert_relative_eq!(iterate.gradient_u().unwrap()[1], 0.0);
        assert!(matches!(
            restricted.excluding(&[array![0.0, -1.0, 0.0]]),
            Err(ReliabilityError::DegenerateCurvature { .. })
        ));
        assert!(problem.excluded_directions().is_empty());
    }

    #[test]
    fn wrong_dimension_is_rejected() {
        let problem = paraboloid(2.0, &[0.2], Arc::new(RecordingReporter::new()));
        assert_eq!(
            problem.evaluate(&array![1.0]),
            Err(ReliabilityError::DimensionMismatch { expected: 2, found: 1 })
        );
    }
}
