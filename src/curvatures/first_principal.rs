//! curvatures::first_principal — largest principal curvature from the
//! Hessian.
use crate::{
    curvatures::{
        FindCurvatures,
        hessian::{curvature_matrix, u_space_hessian},
    },
    errors::{ReliabilityError, ReliabilityResult},
    linalg::bridge::{from_dvector, to_dmatrix},
    search::{DesignPoint, LimitStateProblem},
};
use argmin_math::ArgminL2Norm;
use ndarray::Array1;

/// Principal curvature of largest magnitude at the design point.
///
/// The u-space Hessian `H` is projected onto the tangent plane,
/// `K = P H P / ‖∇g‖`, and `K` is eigen-decomposed with `nalgebra`. The
/// eigenvalue of largest magnitude and its eigenvector are kept.
#[derive(Debug, Clone, Default)]
pub struct FirstPrincipalCurvature {
    curvatures: Option<Array1<f64>>,
    principal_direction: Option<Array1<f64>>,
}

impl FirstPrincipalCurvature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unit principal axis belonging to the last computed curvature.
    pub fn principal_direction(&self) -> ReliabilityResult<&Array1<f64>> {
        self.principal_direction
            .as_ref()
            .ok_or(ReliabilityError::NotComputed { product: "principal direction" })
    }
}

impl FindCurvatures for FirstPrincipalCurvature {
    fn compute_curvatures(
        &mut self, problem: &LimitStateProblem, design_point: &DesignPoint,
    ) -> ReliabilityResult<Array1<f64>> {
        if design_point.u.len() < 2 {
            return Err(ReliabilityError::DegenerateCurvature {
                reason: "A one-dimensional limit state has no tangent plane.",
            });
        }
        let hessian = u_space_hessian(problem, &design_point.u)?;
        let gradient_norm = design_point.gradient_u.l2_norm();
        let k = curvature_matrix(&hessian, &design_point.alpha, gradient_norm)?;

        let eigen = to_dmatrix(&k).symmetric_eigen();
        let mut best: Option<(usize, f64)> = None;
        for (index, &value) in eigen.eigenvalues.iter().enumerate() {
            if best.is_none_or(|(_, b)| value.abs() > b.abs()) {
                best = Some((index, value));
            }
        }
        let (index, curvature) = best.ok_or(ReliabilityError::DegenerateCurvature {
            reason: "Curvature matrix has no eigenvalues.",
        })?;
        if !curvature.is_finite() {
            return Err(ReliabilityError::DegenerateCurvature {
                reason: "Curvature matrix has a non-finite eigenvalue.",
            });
        }
        let direction = from_dvector(&eigen.eigenvectors.column(index).into_owned());
        log::debug!("first principal curvature: {curvature:.6}");

        let curvatures = Array1::from(vec![curvature]);
        self.curvatures = Some(curvatures.clone());
        self.principal_direction = Some(direction);
        Ok(curvatures)
    }

    fn curvatures(&self) -> ReliabilityResult<&Array1<f64>> {
        self.curvatures.as_ref().ok_or(ReliabilityError::NotComputed { product: "curvatures" })
    }
}
