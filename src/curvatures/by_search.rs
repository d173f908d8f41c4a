//! curvatures::by_search — principal curvatures from repeated design-point
//! searches.
//!
//! Purpose
//! -------
//! Estimate principal curvatures without a Hessian. A design-point search
//! with fixed HL-RF steps, started in the tangent plane at distance
//! `start_offset` from `u*`, creeps back to `u*`; its error shrinks slowest
//! along one principal axis, so the last iterates line up with that axis
//! and
//!
//! `κ = sign · ∠(αₖ, αₖ₋₁) / ‖Pₖ(uₖ − uₖ₋₁)‖`,
//!
//! with `Pₖ = I − αₖαₖᵀ`, `∠ = 2 asin(‖αₖ − αₖ₋₁‖ / 2)` and
//! `sign = −sign((αₖ − αₖ₋₁)·Pₖ(uₖ − uₖ₋₁))`.
//!
//! Key behaviors
//! -------------
//! - Near `u*` a step of size `s` scales the tangential error along axis
//!   `i` by `1 − s(1 + βκᵢ)`. Sub-searches start with full steps and halve
//!   the step whenever the tangential steps flip direction without
//!   converging, so every curvature with `1 + βκ > 0` is reached; the
//!   iteration cap grows with `1/s`.
//! - A sub-search that moves away from `u*` without oscillating means
//!   `1 + βκ ≤ 0`: `u*` is not a local minimum of the distance to the
//!   surface, and [`ReliabilityError::DegenerateCurvature`] is returned.
//! - The chord uses the last two iterates whose tangential separation is
//!   still above round-off, and the search is repeated from the axis it
//!   found until that axis moves by less than `e2`.
//! - Each further curvature is searched on the problem restricted to the
//!   complement of the principal axes already found.
//! - A sub-search that hits its cap while still approaching `u*` is reported
//!   as [`Warning::CurvatureSearchNotConverged`]; its iterates are still
//!   used. Any other search error propagates.
use crate::{
    curvatures::{FindCurvatures, tangent_basis},
    errors::{ReliabilityError, ReliabilityResult},
    reporting::{Reporter, Warning},
    search::{
        DesignPoint, FindDesignPointAlgorithm, FixedStepSizeRule, HLRFSearchDirection,
        IterationRecord, LimitStateProblem, SearchOptions, SearchWithStepSizeAndStepDirection,
        StandardReliabilityConvergenceCheck, convergence::DEFAULT_CONVERGENCE_TOL,
    },
    validation::{verify_positive_option, verify_tol},
};
use argmin_math::ArgminL2Norm;
use ndarray::Array1;
use std::sync::{Arc, Mutex};

/// Default tangent distance of each search's start point from `u*`.
pub const DEFAULT_START_OFFSET: f64 = 1.0;

/// Step halvings tried before a sub-search is given up.
const MAX_STEP_HALVINGS: usize = 6;

/// Repeated searches from the latest axis estimate.
const MAX_AXIS_REFINEMENTS: usize = 8;

/// Tangential separations below `CHORD_FLOOR · start_offset` are round-off.
const CHORD_FLOOR: f64 = 1e-8;

/// Forwards everything to `inner` and keeps every reported iterate.
struct IterateCapture {
    inner: Arc<dyn Reporter>,
    records: Mutex<Vec<IterationRecord>>,
}

impl IterateCapture {
    fn new(inner: Arc<dyn Reporter>) -> Self {
        Self { inner, records: Mutex::new(Vec::new()) }
    }

    fn take(&self) -> Vec<IterationRecord> {
        let mut records = match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::take(&mut *records)
    }
}

impl Reporter for IterateCapture {
    fn warn(&self, warning: Warning) {
        self.inner.warn(warning);
    }

    fn progress(&self, record: &IterationRecord) {
        self.inner.progress(record);
        let mut records = match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        records.push(record.clone());
    }
}

/// Two iterates close to `u*` and the step size that produced them.
struct Chord {
    step: f64,
    previous: IterationRecord,
    last: IterationRecord,
}

pub struct CurvaturesBySearchAlgorithm {
    number_of_curvatures: usize,
    options: SearchOptions,
    start_offset: f64,
    e1: f64,
    e2: f64,
    curvatures: Option<Array1<f64>>,
    principal_axes: Vec<Array1<f64>>,
}

impl CurvaturesBySearchAlgorithm {
    /// Errors
    /// ------
    /// - `ReliabilityError::InvalidCount` when `number_of_curvatures == 0`.
    pub fn new(number_of_curvatures: usize, options: SearchOptions) -> ReliabilityResult<Self> {
        if number_of_curvatures == 0 {
            return Err(ReliabilityError::InvalidCount {
                n: number_of_curvatures,
                reason: "At least one curvature must be requested.",
            });
        }
        Ok(Self {
            number_of_curvatures,
            options,
            start_offset: DEFAULT_START_OFFSET,
            e1: DEFAULT_CONVERGENCE_TOL,
            e2: DEFAULT_CONVERGENCE_TOL,
            curvatures: None,
            principal_axes: Vec::new(),
        })
    }

    pub fn with_start_offset(mut self, offset: f64) -> ReliabilityResult<Self> {
        self.start_offset = verify_positive_option("start_offset", offset)?;
        Ok(self)
    }

    /// Convergence tolerances of the sub-searches; `e2` also bounds the
    /// final movement of each principal axis.
    ///
    /// Errors
    /// ------
    /// - `ReliabilityError::InvalidTolerance` unless both are finite and
    ///   positive.
    pub fn with_tolerances(mut self, e1: f64, e2: f64) -> ReliabilityResult<Self> {
        self.e1 = verify_tol("e1", e1)?;
        self.e2 = verify_tol("e2", e2)?;
        Ok(self)
    }

    /// Principal axes found by the last computation, in curvature order.
    pub fn principal_axes(&self) -> &[Array1<f64>] {
        &self.principal_axes
    }

    fn search_one(
        &self, problem: &LimitStateProblem, design_point: &DesignPoint, index: usize,
    ) -> ReliabilityResult<(f64, Array1<f64>)> {
        let restricted = problem.excluding(&self.principal_axes)?;
        let mut direction =
            start_direction(&design_point.alpha, restricted.excluded_directions())?;
        let mut step = 1.0;
        let mut estimate = None;
        for refinement in 0..=MAX_AXIS_REFINEMENTS {
            let chord = self.settle(&restricted, design_point, &direction, step, index)?;
            step = chord.step;
            let (curvature, axis) = curvature_from_iterates(&chord.previous, &chord.last)?;
            let axis = unit_tangent(&restricted.project(&axis), &design_point.alpha)?;
            let change = (&axis - &direction).l2_norm().min((&axis + &direction).l2_norm());
            log::debug!(
                "curvature {} by search, round {refinement}: {curvature:.6} \
                 (step {step}, axis moved {change:.2e})",
                index + 1
            );
            direction = axis;
            estimate = Some(curvature);
            if change <= self.e2 {
                break;
            }
        }
        let curvature = estimate.ok_or(ReliabilityError::NotComputed { product: "curvature" })?;
        Ok((curvature, direction))
    }

    /// Run sub-searches from `u* + start_offset · direction`, halving the
    /// step while they oscillate, until one settles at `u*`.
    fn settle(
        &self, problem: &LimitStateProblem, design_point: &DesignPoint,
        direction: &Array1<f64>, mut step: f64, index: usize,
    ) -> ReliabilityResult<Chord> {
        let u0 = &design_point.u + &(direction * self.start_offset);
        for _ in 0..=MAX_STEP_HALVINGS {
            let capture = Arc::new(IterateCapture::new(problem.reporter().clone()));
            let cap_factor = (1.0 / step).ceil() as usize;
            let options = SearchOptions {
                max_iterations: self.options.max_iterations.saturating_mul(cap_factor),
                ..self.options.clone()
            };
            let mut search = SearchWithStepSizeAndStepDirection::new(
                options,
                Box::new(HLRFSearchDirection),
                Box::new(FixedStepSizeRule::new(step)?),
                Box::new(StandardReliabilityConvergenceCheck::new(self.e1, self.e2)?),
            );
            let observed = problem.with_reporter(capture.clone());
            let converged = match search.find_design_point(&observed, &u0) {
                Ok(_) => true,
                Err(ReliabilityError::NonConvergence { .. }) => false,
                Err(e) => return Err(e),
            };
            let iterates = capture.take();
            let last =
                iterates.last().ok_or(ReliabilityError::NotComputed { product: "iterate" })?;
            let approached = (&last.u - &design_point.u).l2_norm() < self.start_offset;
            let oscillating = !converged && oscillates(&iterates, &design_point.alpha);

            if approached && !oscillating {
                let floor = CHORD_FLOOR * self.start_offset;
                if let Some((previous, last)) = last_chord(&iterates, floor) {
                    if !converged {
                        problem.reporter().warn(Warning::CurvatureSearchNotConverged {
                            curvature: index,
                            iterations: iterates.len(),
                        });
                    }
                    return Ok(Chord { step, previous: previous.clone(), last: last.clone() });
                }
            } else if !oscillating {
                return Err(ReliabilityError::DegenerateCurvature {
                    reason: "Curvature search moved away from the design point; it is not a local \
                             minimum of the distance to the limit-state surface.",
                });
            }
            step *= 0.5;
        }
        Err(ReliabilityError::DegenerateCurvature {
            reason: "Curvature search found no step size that settles at the design point.",
        })
    }
}

/// Unit tangent direction mixing every admissible principal axis.
fn start_direction(
    alpha: &Array1<f64>, excluded: &[Array1<f64>],
) -> ReliabilityResult<Array1<f64>> {
    let basis = tangent_basis(alpha, excluded)?;
    if basis.is_empty() {
        return Err(ReliabilityError::DegenerateCurvature {
            reason: "No tangent direction is left to search.",
        });
    }
    let sum = basis.iter().fold(Array1::<f64>::zeros(alpha.len()), |acc, b| acc + b);
    let norm = sum.l2_norm();
    Ok(sum / norm)
}

/// `v − (v·α)α`.
fn tangential(v: &Array1<f64>, alpha: &Array1<f64>) -> Array1<f64> {
    v - &(alpha * v.dot(alpha))
}

fn unit_tangent(v: &Array1<f64>, alpha: &Array1<f64>) -> ReliabilityResult<Array1<f64>> {
    let t = tangential(v, alpha);
    let norm = t.l2_norm();
    if !(norm > 0.0) {
        return Err(ReliabilityError::DegenerateCurvature {
            reason: "Principal axis estimate is normal to the limit-state surface.",
        });
    }
    Ok(t / norm)
}

/// Whether the last two steps reverse their tangential direction at `u*`.
fn oscillates(iterates: &[IterationRecord], alpha: &Array1<f64>) -> bool {
    match iterates {
        [.., first, second, third] => {
            let earlier = tangential(&(&second.u - &first.u), alpha);
            let later = tangential(&(&third.u - &second.u), alpha);
            earlier.dot(&later) < 0.0
        }
        _ => false,
    }
}

/// Last pair of successive iterates separated tangentially by more than
/// `floor`.
fn last_chord(
    iterates: &[IterationRecord], floor: f64,
) -> Option<(&IterationRecord, &IterationRecord)> {
    iterates.windows(2).rev().find_map(|pair| {
        let separation = tangential(&(&pair[1].u - &pair[0].u), &pair[1].alpha).l2_norm();
        (separation > floor).then_some((&pair[0], &pair[1]))
    })
}

/// Curvature and unit principal axis from two successive iterates.
fn curvature_from_iterates(
    previous: &IterationRecord, last: &IterationRecord,
) -> ReliabilityResult<(f64, Array1<f64>)> {
    let du = tangential(&(&last.u - &previous.u), &last.alpha);
    let du_norm = du.l2_norm();
    if !(du_norm > 0.0) {
        return Err(ReliabilityError::DegenerateCurvature {
            reason: "Last two iterates coincide along the limit-state surface.",
        });
    }
    let dalpha = &last.alpha - &previous.alpha;
    let chord = dalpha.l2_norm();
    let angle = 2.0 * (0.5 * chord).min(1.0).asin();
    let sign = if dalpha.dot(&du) > 0.0 { -1.0 } else { 1.0 };
    Ok((sign * angle / du_norm, du / du_norm))
}

impl FindCurvatures for CurvaturesBySearchAlgorithm {
    fn compute_curvatures(
        &mut self, problem: &LimitStateProblem, design_point: &DesignPoint,
    ) -> ReliabilityResult<Array1<f64>> {
        let available = design_point.u.len().saturating_sub(1);
        if self.number_of_curvatures > available {
            return Err(ReliabilityError::InvalidCount {
                n: self.number_of_curvatures,
                reason: "More curvatures requested than tangent dimensions.",
            });
        }
        self.principal_axes.clear();
        self.curvatures = None;
        let mut curvatures = Vec::with_capacity(self.number_of_curvatures);
        for index in 0..self.number_of_curvatures {
            let (curvature, axis) = self.search_one(problem, design_point, index)?;
            log::debug!("curvature {} by search: {curvature:.6}", index + 1);
            curvatures.push(curvature);
            self.principal_axes.push(axis);
        }
        let curvatures = Array1::from(curvatures);
        self.curvatures = Some(curvatures.clone());
        Ok(curvatures)
    }

    fn curvatures(&self) -> ReliabilityResult<&Array1<f64>> {
        self.curvatures.as_ref().ok_or(ReliabilityError::NotComputed { product: "curvatures" })
    }
}
