//! curvatures::point_fitting — curvatures from fitted semi-paraboloids.
//!
//! Purpose
//! -------
//! Fit the limit-state surface along each tangent axis `vᵢ` at the design
//! point with a semi-paraboloid `η = ½ aᵢ t²` (η along α, t along vᵢ). For
//! each side `s = ±1` the fitting point `u* + s·k·vᵢ + η·α` on `g = 0` is
//! located with `argmin`'s [`BrentRoot`], giving `aᵢ± = 2η/k²`. The
//! curvature along `vᵢ` is the mean of both sides.
//!
//! Key behaviors
//! -------------
//! - The fitting distance follows the reliability index:
//!   `k = 1` for `|β| < 1`, `k = |β|` for `1 ≤ |β| ≤ 3`, `k = 3` beyond.
//! - The root bracket starts at `[−k, k]` and is doubled up to
//!   [`MAX_BRACKET_EXPANSIONS`] times; otherwise
//!   `ReliabilityError::RootNotBracketed`.
//! - Tangent axes are the Gram–Schmidt completion of α over the coordinate
//!   axes, so curvatures come in that order (not sorted by magnitude).
//! - With the `obs_slog` feature and `verbose` set, each Brent solve is
//!   traced by `argmin-observer-slog`.
use crate::{
    curvatures::{FindCurvatures, tangent_basis},
    errors::{ReliabilityError, ReliabilityResult},
    search::{DesignPoint, LimitStateProblem},
    types::USpace,
    validation::{verify_max_iter, verify_tol},
};
use argmin::{
    core::{CostFunction, Error, Executor, State},
    solver::brent::BrentRoot,
};
use ndarray::Array1;

pub const DEFAULT_ROOT_TOL: f64 = 1e-10;
pub const DEFAULT_ROOT_MAX_ITERS: usize = 100;
pub const MAX_BRACKET_EXPANSIONS: usize = 8;

/// Root-solver settings of the fitting-point searches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointFittingOptions {
    pub tolerance: f64,
    pub max_iters: usize,
    /// Attach the slog observer (only with the `obs_slog` feature).
    pub verbose: bool,
}

impl PointFittingOptions {
    pub fn new(tolerance: f64, max_iters: usize, verbose: bool) -> ReliabilityResult<Self> {
        Ok(Self {
            tolerance: verify_tol("root_tolerance", tolerance)?,
            max_iters: verify_max_iter(max_iters)?,
            verbose,
        })
    }
}

impl Default for PointFittingOptions {
    fn default() -> Self {
        Self { tolerance: DEFAULT_ROOT_TOL, max_iters: DEFAULT_ROOT_MAX_ITERS, verbose: false }
    }
}

/// `η ↦ g(base + η α)` as an `argmin` cost function.
struct FittingLine<'a> {
    problem: &'a LimitStateProblem,
    base: USpace,
    alpha: &'a Array1<f64>,
}

impl FittingLine<'_> {
    fn g(&self, eta: f64) -> ReliabilityResult<f64> {
        let u = &self.base + &(self.alpha * eta);
        Ok(self.problem.evaluate(&u)?.g)
    }
}

impl CostFunction for FittingLine<'_> {
    type Param = f64;
    type Output = f64;

    fn cost(&self, eta: &Self::Param) -> Result<Self::Output, Error> {
        Ok(self.g(*eta)?)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CurvaturesByPointFitting {
    options: PointFittingOptions,
    curvatures: Option<Array1<f64>>,
    fitting_points: Vec<USpace>,
}

impl CurvaturesByPointFitting {
    pub fn new(options: PointFittingOptions) -> Self {
        Self { options, curvatures: None, fitting_points: Vec::new() }
    }

    /// Fitting points of the last computation, two per tangent axis
    /// (`+` side first).
    pub fn fitting_points(&self) -> &[USpace] {
        &self.fitting_points
    }

    /// Fitting distance `k` along each tangent axis.
    pub fn fitting_distance(beta: f64) -> f64 {
        beta.abs().clamp(1.0, 3.0)
    }

    /// Root `η` of `g(base + η α)`, bracketed outward from `[−k, k]`.
    fn locate(&self, line: FittingLine<'_>, k: f64) -> ReliabilityResult<f64> {
        let (mut lower, mut upper) = (-k, k);
        let mut bracketed = false;
        for _ in 0..=MAX_BRACKET_EXPANSIONS {
            let (g_lower, g_upper) = (line.g(lower)?, line.g(upper)?);
            if g_lower == 0.0 {
                return Ok(lower);
            }
            if g_upper == 0.0 {
                return Ok(upper);
            }
            if g_lower * g_upper < 0.0 {
                bracketed = true;
                break;
            }
            lower *= 2.0;
            upper *= 2.0;
        }
        if !bracketed {
            return Err(ReliabilityError::RootNotBracketed { lower, upper });
        }

        let solver = BrentRoot::new(lower, upper, self.options.tolerance);
        #[allow(unused_mut)]
        let mut executor = Executor::new(line, solver)
            .configure(|state| state.max_iters(self.options.max_iters as u64));
        #[cfg(feature = "obs_slog")]
        if self.options.verbose {
            let observer = argmin_observer_slog::SlogLogger::term_noblock();
            executor = executor.add_observer(observer, argmin::core::observers::ObserverMode::Always);
        }
        let result = executor.run()?;
        result
            .state()
            .get_best_param()
            .copied()
            .ok_or(ReliabilityError::NotComputed { product: "fitting point" })
    }
}

impl FindCurvatures for CurvaturesByPointFitting {
    fn compute_curvatures(
        &mut self, problem: &LimitStateProblem, design_point: &DesignPoint,
    ) -> ReliabilityResult<Array1<f64>> {
        let axes = tangent_basis(&design_point.alpha, &[])?;
        if axes.is_empty() {
            return Err(ReliabilityError::DegenerateCurvature {
                reason: "A one-dimensional limit state has no tangent plane.",
            });
        }
        let k = Self::fitting_distance(design_point.beta);
        self.curvatures = None;
        self.fitting_points.clear();

        let mut curvatures = Vec::with_capacity(axes.len());
        for axis in &axes {
            let mut sides = [0.0; 2];
            for (side, sign) in sides.iter_mut().zip([1.0, -1.0]) {
                let base = &design_point.u + &(axis * (sign * k));
                let line = FittingLine { problem, base: base.clone(), alpha: &design_point.alpha };
                let eta = self.locate(line, k)?;
                self.fitting_points.push(base + &(&design_point.alpha * eta));
                *side = 2.0 * eta / (k * k);
            }
            curvatures.push(0.5 * (sides[0] + sides[1]));
        }
        log::debug!("curvatures by point fitting: {curvatures:?}");

        let curvatures = Array1::from(curvatures);
        self.curvatures = Some(curvatures.clone());
        Ok(curvatures)
    }

    fn curvatures(&self) -> ReliabilityResult<&Array1<f64>> {
        self.curvatures.as_ref().ok_or(ReliabilityError::NotComputed { product: "curvatures" })
    }
}
