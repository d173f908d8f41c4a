//! Integration tests for the design-point analysis driver.
//!
//! Purpose
//! -------
//! - Validate the end-to-end FORM/SORM pipeline: from a populated
//!   `ReliabilityDomain`, through the Nataf transformation and the
//!   evaluators, to the HL-RF search, curvature estimation and the results
//!   recorded in the domain.
//! - Use limit states with known reliability indices so the numbers, not
//!   only the plumbing, are checked.
//!
//! Coverage
//! --------
//! - `analysis`: `analyze_limit_state`, `analyze_all`, `AnalysisSetup`
//!   variants (step-size rules, gradient methods, curvature methods).
//! - `domain`: correlated and independent domains, start values, closure and
//!   structural performance functions.
//! - `search`: one-step convergence on linear limit states, the iteration
//!   cap, cancellation, and evaluation failures.
//! - `curvatures`: all three variants on the same quadratic surface.
//!
//! Exclusions
//! ----------
//! - Merit-function and step-size internals; these are unit tested in
//!   `search`.
use approx::assert_relative_eq;
use ndarray::array;
use rust_reliability::{
    AnalysisSetup, ErrorClass, ReliabilityError, analyze_all, analyze_limit_state,
    analysis::{CurvatureMethod, StepSizeChoice, finite_difference_gradient},
    curvatures::PointFittingOptions,
    domain::{
        AnalysisFailure, ClosurePerformanceFunction, ReliabilityDomain, StructuralAnalysis,
        StructuralPerformanceFunction,
    },
    random_variables::{LognormalRV, NormalRV, RandomVariable},
    reporting::RecordingReporter,
    search::{CancellationToken, SearchOptions},
    types::XSpace,
};
use std::sync::Arc;

/// Purpose
/// -------
/// Domain with `n` standard normal variables (tags `1..=n`), start values
/// `starts`, and the limit state `g = beta − x₀` under tag 1.
///
/// Invariants
/// ----------
/// - `starts.len() == n`; construction failures are test-setup errors.
fn linear_standard_domain(beta: f64, starts: &[f64]) -> ReliabilityDomain {
    let mut domain = ReliabilityDomain::new();
    for (i, &start) in starts.iter().enumerate() {
        let rv = NormalRV::new(i + 1, 0.0, 1.0)
            .and_then(|rv| rv.with_start_value(start))
            .expect("valid standard normal");
        domain.add_random_variable(rv).expect("unique tag");
    }
    let n = starts.len();
    let g = ClosurePerformanceFunction::new(move |x| Ok(beta - x[0])).with_gradient(move |_| {
        let mut grad = ndarray::Array1::zeros(n);
        grad[0] = -1.0;
        Ok(grad)
    });
    domain.add_limit_state_function(1, Arc::new(g)).expect("unique tag");
    domain
}

/// Purpose
/// -------
/// Two independent standard normals with `g = β − x₀ + κ/2 x₁²`: the HL-RF
/// search from the origin stops at `(β, 0)`, where the single principal
/// curvature is κ.
fn quadratic_domain(beta: f64, kappa: f64) -> ReliabilityDomain {
    let mut domain = ReliabilityDomain::new();
    domain.add_random_variable(NormalRV::new(1, 0.0, 1.0).expect("valid")).expect("unique");
    domain.add_random_variable(NormalRV::new(2, 0.0, 1.0).expect("valid")).expect("unique");
    let g = ClosurePerformanceFunction::new(move |x| Ok(beta - x[0] + 0.5 * kappa * x[1] * x[1]))
        .with_gradient(move |x| Ok(array![-1.0, kappa * x[1]]));
    domain.add_limit_state_function(1, Arc::new(g)).expect("unique");
    domain
}

#[test]
// Purpose
// -------
// A linear limit state is solved in a single HL-RF step from any start.
//
// Given
// -----
// - `g = 3 − x₀` over three standard normals.
// - Start points scattered around the origin, including one in the
//   failure domain.
//
// Expect
// ------
// - One step, two evaluated iterates, `u* = (3, 0, 0)`, `β = 3`.
fn linear_limit_state_converges_in_one_step_from_any_start() {
    let starts: &[[f64; 3]] =
        &[[0.0, 0.0, 0.0], [0.5, -1.2, 2.0], [4.0, 1.0, -0.3], [-2.0, 3.0, 0.7]];
    for start in starts {
        let mut domain = linear_standard_domain(3.0, start);
        let results = analyze_limit_state(
            &mut domain,
            1,
            &AnalysisSetup::default(),
            Arc::new(RecordingReporter::new()),
        )
        .expect("linear limit state converges");

        let dp = results.design_point.expect("design point recorded");
        assert_eq!(dp.steps(), 1, "start {start:?}");
        assert_eq!(dp.iterations, 2);
        assert_relative_eq!(dp.beta, 3.0, epsilon = 1e-10);
        assert_relative_eq!(dp.u[0], 3.0, epsilon = 1e-10);
        assert_relative_eq!(dp.u[1], 0.0, epsilon = 1e-10);
        assert_relative_eq!(dp.u[2], 0.0, epsilon = 1e-10);
        assert_relative_eq!(dp.form_probability(), 1.349_898_031_630_094_6e-3, epsilon = 1e-12);
    }
}

#[test]
// Purpose
// -------
// Correlation between normal variables enters the reliability index.
//
// Given
// -----
// - `g = R − S`, `R ~ N(5, 1)`, `S ~ N(2, 1)`, `ρ = 0.5`.
//
// Expect
// ------
// - `β = 3 / √(1 + 1 − 2ρ) = 3` and `x*` on the limit state.
fn correlated_normals_give_closed_form_beta() {
    let mut domain = ReliabilityDomain::new();
    domain.add_random_variable(NormalRV::new(1, 5.0, 1.0).expect("valid")).expect("unique");
    domain.add_random_variable(NormalRV::new(2, 2.0, 1.0).expect("valid")).expect("unique");
    domain.add_correlation(1, 2, 0.5).expect("valid correlation");
    let g = ClosurePerformanceFunction::new(|x| Ok(x[0] - x[1]))
        .with_gradient(|_| Ok(array![1.0, -1.0]));
    domain.add_limit_state_function(1, Arc::new(g)).expect("unique");

    let setup = AnalysisSetup::default();

    let results = analyze_limit_state(&mut domain, 1, &setup, Arc::new(RecordingReporter::new()))
        .expect("converges");

    let dp = results.design_point.expect("design point");
    assert_relative_eq!(dp.beta, 3.0, epsilon = 1e-8);
    assert_relative_eq!(dp.x[0], dp.x[1], epsilon = 1e-8);
    assert_relative_eq!(dp.alpha.dot(&dp.alpha), 1.0, epsilon = 1e-12);
}

#[test]
// Purpose
// -------
// Finite-difference and analytic gradients reach the same design point
// on a non-normal problem.
//
// Given
// -----
// - Lognormal `R` (mean 10, stdv 2) and `S` (mean 5, stdv 1.5), `g = R − S`.
//   The surface `R = S` is the hyperplane `λR + ζR u₁ = λS + ζS u₂`, so
//   `β = (λR − λS) / √(ζR² + ζS²)`.
// - Tight tolerances; central differences on the rayon pool.
//
// Expect
// ------
// - Both runs match the closed-form β.
fn lognormal_resistance_matches_closed_form_with_both_gradients() {
    let r = LognormalRV::from_mean_stdv(1, 10.0, 2.0).expect("valid");
    let s = LognormalRV::from_mean_stdv(2, 5.0, 1.5).expect("valid");
    let (lr, zr) = (r.parameters()[0], r.parameters()[1]);
    let (ls, zs) = (s.parameters()[0], s.parameters()[1]);
    let expected = (lr - ls) / (zr * zr + zs * zs).sqrt();

    let mut domain = ReliabilityDomain::new();
    domain.add_random_variable(r).expect("unique");
    domain.add_random_variable(s).expect("unique");
    let g = ClosurePerformanceFunction::new(|x| Ok(x[0] - x[1]))
        .with_gradient(|_| Ok(array![1.0, -1.0]));
    domain.add_limit_state_function(1, Arc::new(g)).expect("unique");

    let analytic = AnalysisSetup::default().with_tolerances(1e-6, 1e-6).expect("valid");
    let mut finite_difference = analytic.clone();
    finite_difference.gradient =
        finite_difference_gradient("central", 1000.0, true).expect("valid scheme");

    for setup in [analytic, finite_difference] {
        let results =
            analyze_limit_state(&mut domain, 1, &setup, Arc::new(RecordingReporter::new()))
                .expect("converges");
        let dp = results.design_point.expect("design point");
        assert_relative_eq!(dp.beta, expected, epsilon = 1e-5);
        assert_relative_eq!(dp.x[0], dp.x[1], epsilon = 1e-5);
    }
}

#[test]
// Purpose
// -------
// The three curvature estimates agree on quadratic surfaces, including
// `βκ` large enough that full HL-RF steps oscillate.
//
// Given
// -----
// - `g = β − x₀ + κ/2 x₁²` over standard normals with `(β, κ)` of
//   `(2, 0.2)` and `(3, 0.5)`; curvature search at `e1 = e2 = 1e-4`.
//
// Expect
// ------
// - First principal, search-based and point-fitted curvatures all ≈ κ,
//   and each run records its curvatures in the domain.
fn curvature_variants_agree_on_quadratic_surface() {
    let methods = [
        (CurvatureMethod::FirstPrincipal, 1e-5),
        (
            CurvatureMethod::Search { number_of_curvatures: 1, options: SearchOptions::default() },
            1e-3,
        ),
        (CurvatureMethod::PointFitting(PointFittingOptions::default()), 1e-8),
    ];
    for (beta, kappa) in [(2.0, 0.2), (3.0, 0.5)] {
        for (method, tolerance) in &methods {
            let mut domain = quadratic_domain(beta, kappa);
            let setup = AnalysisSetup::new(
                SearchOptions::default(),
                "analytic".parse().expect("known method"),
                method.clone(),
            )
            .with_tolerances(1e-4, 1e-4)
            .expect("valid tolerances");

            let results =
                analyze_limit_state(&mut domain, 1, &setup, Arc::new(RecordingReporter::new()))
                    .expect("analysis succeeds");

            let curvatures = results.curvatures.expect("curvatures computed");
            assert_eq!(curvatures.len(), 1, "{method:?}");
            assert_relative_eq!(curvatures[0], kappa, epsilon = *tolerance);
            assert_eq!(domain.curvatures(1), Some(&curvatures));
            assert_relative_eq!(results.design_point.expect("dp").beta, beta, epsilon = 1e-6);
        }
    }
}

#[test]
// Purpose
// -------
// At a design point that is a saddle of the distance to the surface, the
// Hessian-based variants still report the local curvature while the
// search-based variant refuses to produce one.
//
// Given
// -----
// - `g = 3 − x₀ − 0.25 x₁²` (κ = −0.5, `1 + βκ < 0`); the search from the
//   origin stops at `(3, 0)`.
//
// Expect
// ------
// - First principal and point fitting give −0.5.
// - Curvature search fails with a numerical-degeneracy error after the
//   design point has been recorded, and records no curvatures.
fn saddle_design_point_is_rejected_by_curvature_search() {
    for method in [
        CurvatureMethod::FirstPrincipal,
        CurvatureMethod::PointFitting(PointFittingOptions::default()),
    ] {
        let mut domain = quadratic_domain(3.0, -0.5);
        let setup =
            AnalysisSetup::new(SearchOptions::default(), "analytic".parse().expect("known"), method);

        let results =
            analyze_limit_state(&mut domain, 1, &setup, Arc::new(RecordingReporter::new()))
                .expect("analysis succeeds");

        let curvatures = results.curvatures.expect("curvatures computed");
        assert_relative_eq!(curvatures[0], -0.5, epsilon = 1e-5);
    }

    let mut domain = quadratic_domain(3.0, -0.5);
    let setup = AnalysisSetup::new(
        SearchOptions::default(),
        "analytic".parse().expect("known"),
        "search".parse().expect("known"),
    );

    let err = analyze_limit_state(&mut domain, 1, &setup, Arc::new(RecordingReporter::new()))
        .unwrap_err();

    assert!(matches!(err, ReliabilityError::DegenerateCurvature { .. }));
    assert_eq!(err.class(), ErrorClass::NumericalDegeneracy);
    assert_relative_eq!(domain.design_point(1).expect("recorded").beta, 3.0, epsilon = 1e-8);
    assert!(domain.curvatures(1).is_none());
}

#[test]
// Purpose
// -------
// The iteration cap counts evaluated iterates and reports the best one.
//
// Given
// -----
// - `g = x₀² + 1` (never reaches zero) from start 0.5, full HL-RF steps,
//   `max_iterations = 5`.
//
// Expect
// ------
// - `NonConvergence { iterations: 5 }`, five progress reports, and a best
//   iterate whose score is minimal among them.
fn non_convergence_reports_best_iterate_at_the_cap() {
    let mut domain = ReliabilityDomain::new();
    let rv = NormalRV::new(1, 0.0, 1.0).and_then(|rv| rv.with_start_value(0.5)).expect("valid");
    domain.add_random_variable(rv).expect("unique");
    let g = ClosurePerformanceFunction::new(|x| Ok(x[0] * x[0] + 1.0))
        .with_gradient(|x| Ok(array![2.0 * x[0]]));
    domain.add_limit_state_function(1, Arc::new(g)).expect("unique");
    let setup = AnalysisSetup::new(
        SearchOptions::new(5, false).expect("valid"),
        "analytic".parse().expect("known"),
        CurvatureMethod::None,
    )
    .with_step_size(StepSizeChoice::Fixed(1.0));
    let reporter = Arc::new(RecordingReporter::new());

    let err = analyze_limit_state(&mut domain, 1, &setup, reporter.clone()).unwrap_err();

    let ReliabilityError::NonConvergence { iterations, best } = &err else {
        panic!("expected NonConvergence, got {err:?}");
    };
    assert_eq!(*iterations, 5);
    assert_eq!(err.class(), ErrorClass::NonConvergence);
    let records = reporter.progress_records();
    assert_eq!(records.len(), 5);
    let min_score =
        records.iter().map(|r| r.score(setup.e1, setup.e2)).fold(f64::INFINITY, f64::min);
    assert_relative_eq!(best.score(setup.e1, setup.e2), min_score);
    assert!(domain.design_point(1).is_none());
}

#[test]
// Purpose
// -------
// A cancelled token stops the analysis before any evaluation.
fn cancelled_analysis_reports_cancellation() {
    let mut domain = linear_standard_domain(3.0, &[0.0, 0.0]);
    let token = CancellationToken::new();
    token.cancel();
    let setup = AnalysisSetup::new(
        SearchOptions::default().with_cancellation(token),
        "analytic".parse().expect("known"),
        CurvatureMethod::None,
    );

    let err = analyze_limit_state(&mut domain, 1, &setup, Arc::new(RecordingReporter::new()))
        .unwrap_err();

    assert!(matches!(err, ReliabilityError::Cancelled { iteration: 1, last: None, .. }));
    assert_eq!(err.class(), ErrorClass::Cancelled);
}

/// Spring of stiffness `x₁` under load `x₀`; fails for non-positive
/// stiffness.
struct Spring;

impl StructuralAnalysis for Spring {
    type Response = f64;

    fn analyze(&self, realization: &XSpace) -> Result<f64, AnalysisFailure> {
        let (load, stiffness) = (realization[0], realization[1]);
        if stiffness <= 0.0 {
            return Err(AnalysisFailure::new("singular stiffness"));
        }
        Ok(load / stiffness)
    }
}

/// Structural analysis that never converges.
struct Diverging;

impl StructuralAnalysis for Diverging {
    type Response = f64;

    fn analyze(&self, _realization: &XSpace) -> Result<f64, AnalysisFailure> {
        Err(AnalysisFailure::new("Newton iterations diverged"))
    }
}

#[test]
// Purpose
// -------
// A structural model behind the performance-function seam is analyzed
// with finite-difference gradients; failures of the model surface as
// evaluation errors at iteration 1, while asking such a model for an
// analytic gradient is a configuration error caught before iterating.
//
// Given
// -----
// - Tag 1: displacement limit `0.05 − P/k` with `P ~ N(10, 2)` and
//   lognormal `k` (mean 400, stdv 40), analyzed by `Spring`.
// - Tag 2: the same variables analyzed by `Diverging`.
// - Tag 3: `Spring` again, but with the analytic-gradient setup.
//
// Expect
// ------
// - Tag 1 converges to a point with `P/k ≈ 0.05` and `β > 0`.
// - Tag 2 fails with `SearchFailed` at iteration 1 (evaluation class).
// - Tag 3 fails with `GradientNotImplemented` (configuration class, no
//   iteration) because the model provides no gradient.
fn structural_model_behind_performance_function() {
    let mut domain = ReliabilityDomain::new();
    domain.add_random_variable(NormalRV::new(1, 10.0, 2.0).expect("valid")).expect("unique");
    domain
        .add_random_variable(LognormalRV::from_mean_stdv(2, 400.0, 40.0).expect("valid"))
        .expect("unique");
    let limit = |displacement: &f64, _: &XSpace| 0.05 - displacement;
    domain
        .add_limit_state_function(1, Arc::new(StructuralPerformanceFunction::new(Spring, limit)))
        .expect("unique");
    domain
        .add_limit_state_function(2, Arc::new(StructuralPerformanceFunction::new(Diverging, limit)))
        .expect("unique");
    domain
        .add_limit_state_function(3, Arc::new(StructuralPerformanceFunction::new(Spring, limit)))
        .expect("unique");
    let mut setup = AnalysisSetup::default();
    setup.gradient = "fd".parse().expect("known");

    let converged = analyze_limit_state(&mut domain, 1, &setup, Arc::new(RecordingReporter::new()))
        .expect("spring converges");
    let diverged = analyze_limit_state(&mut domain, 2, &setup, Arc::new(RecordingReporter::new()))
        .unwrap_err();
    let no_gradient = analyze_limit_state(
        &mut domain,
        3,
        &AnalysisSetup::default(),
        Arc::new(RecordingReporter::new()),
    )
    .unwrap_err();

    let dp = converged.design_point.expect("design point");
    assert!(dp.beta > 0.0);
    assert_relative_eq!(dp.x[0] / dp.x[1], 0.05, epsilon = 1e-4);
    assert!(matches!(diverged, ReliabilityError::SearchFailed { iteration: 1, .. }));
    assert_eq!(diverged.class(), ErrorClass::Evaluation);
    assert_eq!(no_gradient, ReliabilityError::GradientNotImplemented);
    assert_eq!(no_gradient.class(), ErrorClass::Configuration);
    assert_eq!(no_gradient.iteration(), None);
    assert!(domain.design_point(2).is_none());
    assert!(domain.design_point(3).is_none());
}

#[test]
// Purpose
// -------
// `analyze_all` visits every limit-state function in tag order and records
// each result.
fn analyze_all_visits_every_limit_state() {
    let mut domain = quadratic_domain(2.0, 0.2);
    let linear = ClosurePerformanceFunction::new(|x| Ok(1.5 - x[1]))
        .with_gradient(|_| Ok(array![0.0, -1.0]));
    domain.add_limit_state_function(0, Arc::new(linear)).expect("unique");

    let results =
        analyze_all(&mut domain, &AnalysisSetup::default(), Arc::new(RecordingReporter::new()))
            .expect("both converge");

    let tags: Vec<usize> = results.iter().map(|(tag, _)| *tag).collect();
    assert_eq!(tags, vec![0, 1]);
    assert_relative_eq!(domain.design_point(0).expect("recorded").beta, 1.5, epsilon = 1e-8);
    assert_relative_eq!(domain.design_point(1).expect("recorded").beta, 2.0, epsilon = 1e-6);
}
