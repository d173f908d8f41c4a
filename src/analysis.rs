//! analysis — the FORM/SORM driver over a [`ReliabilityDomain`].
//!
//! Purpose
//! -------
//! Run one design-point analysis of a registered limit-state function:
//! build the probability transformation and the evaluators, search for the
//! design point from the domain's start point, optionally estimate
//! curvatures, and record the results in the domain.
//!
//! Key behaviors
//! -------------
//! - [`AnalysisSetup`] is plain, validated configuration. Every call of
//!   [`analyze_limit_state`] builds fresh evaluators, a fresh search
//!   algorithm and fresh merit state from it, so repeated analyses never
//!   share penalty parameters or evaluation counters.
//! - The start point is `T(x₀)` with `x₀` the random variables' start
//!   values in ascending tag order.
//! - Nothing is recorded when the design-point search fails. A curvature
//!   failure is returned after the design point has been recorded.
//!
//! Conventions
//! -----------
//! - Method names parse case-insensitively through `FromStr`, in the same
//!   way as [`FiniteDifferenceScheme`].
use crate::{
    curvatures::{
        CurvaturesByPointFitting, CurvaturesBySearchAlgorithm, FindCurvatures,
        FirstPrincipalCurvature, PointFittingOptions,
    },
    domain::{LimitStateResults, ReliabilityDomain},
    errors::{ReliabilityError, ReliabilityResult},
    evaluators::{
        AnalyticGradGEvaluator, BasicGFunEvaluator, FiniteDifferenceGradGEvaluator,
        FiniteDifferenceOptions, FiniteDifferenceScheme, GFunEvaluator, GradGEvaluator,
        GradientCheck,
    },
    reporting::Reporter,
    search::{
        AdkZhangMeritFunctionCheck, ArmijoStepSizeRule, CriteriaReductionMeritFunctionCheck,
        FindDesignPointAlgorithm, FixedStepSizeRule, HLRFSearchDirection, LimitStateProblem,
        MeritFunctionCheck, SearchOptions, SearchWithStepSizeAndStepDirection,
        StandardReliabilityConvergenceCheck, StepSizeRule,
        convergence::DEFAULT_CONVERGENCE_TOL,
        merit::{DEFAULT_MERIT_ADD, DEFAULT_MERIT_FACTOR, DEFAULT_MERIT_MULTI},
        step_size::{DEFAULT_ARMIJO_BASE, DEFAULT_MAX_REDUCTIONS},
    },
    transform::{NatafProbabilityTransformation, ProbabilityTransformation},
    validation::{verify_tol, verify_unit_interval_option},
};
use std::{str::FromStr, sync::Arc};

/// Source of the limit-state gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientMethod {
    /// `PerformanceFunction::gradient`, optionally cross-checked.
    Analytic(GradientCheck),
    FiniteDifference(FiniteDifferenceOptions),
}

impl FromStr for GradientMethod {
    type Err = ReliabilityError;

    /// `"analytic"` (unchecked) or `"finitedifference"` / `"fd"` (default
    /// options), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "analytic" => Ok(GradientMethod::Analytic(GradientCheck::Never)),
            "finitedifference" | "fd" => {
                Ok(GradientMethod::FiniteDifference(FiniteDifferenceOptions::default()))
            }
            _ => Err(ReliabilityError::InvalidChoice {
                option: "gradient method",
                name: s.to_string(),
                reason: "Valid options are case insensitive 'analytic' or 'finitedifference'.",
            }),
        }
    }
}

/// Merit function used by the Armijo rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeritChoice {
    AdkZhang { multi: f64, add: f64, factor: f64 },
    CriteriaReduction,
}

impl Default for MeritChoice {
    fn default() -> Self {
        MeritChoice::AdkZhang {
            multi: DEFAULT_MERIT_MULTI,
            add: DEFAULT_MERIT_ADD,
            factor: DEFAULT_MERIT_FACTOR,
        }
    }
}

impl FromStr for MeritChoice {
    type Err = ReliabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "adkzhang" => Ok(MeritChoice::default()),
            "criteriareduction" => Ok(MeritChoice::CriteriaReduction),
            _ => Err(ReliabilityError::InvalidChoice {
                option: "merit function",
                name: s.to_string(),
                reason: "Valid options are case insensitive 'adkzhang' or 'criteriareduction'.",
            }),
        }
    }
}

/// Step-size rule of the design-point search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepSizeChoice {
    Fixed(f64),
    Armijo { merit: MeritChoice, base: f64, max_reductions: usize },
}

impl StepSizeChoice {
    /// Errors
    /// ------
    /// - `ReliabilityError::InvalidOption` unless `0 < base < 1`.
    pub fn armijo(
        merit: MeritChoice, base: f64, max_reductions: usize,
    ) -> ReliabilityResult<Self> {
        Ok(StepSizeChoice::Armijo {
            merit,
            base: verify_unit_interval_option("base", base)?,
            max_reductions,
        })
    }
}

impl Default for StepSizeChoice {
    fn default() -> Self {
        StepSizeChoice::Armijo {
            merit: MeritChoice::default(),
            base: DEFAULT_ARMIJO_BASE,
            max_reductions: DEFAULT_MAX_REDUCTIONS,
        }
    }
}

/// Curvature estimate run after a converged design point.
#[derive(Debug, Clone, PartialEq)]
pub enum CurvatureMethod {
    None,
    FirstPrincipal,
    /// Sub-searches share the setup's `e1`/`e2`.
    Search { number_of_curvatures: usize, options: SearchOptions },
    PointFitting(PointFittingOptions),
}

impl FromStr for CurvatureMethod {
    type Err = ReliabilityError;

    /// `"none"`, `"firstprincipal"`, `"search"` (one curvature) or
    /// `"pointfitting"`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(CurvatureMethod::None),
            "firstprincipal" => Ok(CurvatureMethod::FirstPrincipal),
            "search" => Ok(CurvatureMethod::Search {
                number_of_curvatures: 1,
                options: SearchOptions::default(),
            }),
            "pointfitting" => Ok(CurvatureMethod::PointFitting(PointFittingOptions::default())),
            _ => Err(ReliabilityError::InvalidChoice {
                option: "curvature method",
                name: s.to_string(),
                reason: "Valid options are case insensitive 'none', 'firstprincipal', \
                         'search' or 'pointfitting'.",
            }),
        }
    }
}

/// Configuration of one design-point analysis.
///
/// Default: HL-RF with the Adk–Zhang Armijo rule, `e1 = e2 = 1e-3`, 100
/// iterations, analytic gradient without check, no curvatures.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSetup {
    pub search: SearchOptions,
    pub e1: f64,
    pub e2: f64,
    pub step_size: StepSizeChoice,
    pub gradient: GradientMethod,
    pub curvature: CurvatureMethod,
}

impl AnalysisSetup {
    pub fn new(
        search: SearchOptions, gradient: GradientMethod, curvature: CurvatureMethod,
    ) -> Self {
        Self {
            search,
            e1: DEFAULT_CONVERGENCE_TOL,
            e2: DEFAULT_CONVERGENCE_TOL,
            step_size: StepSizeChoice::default(),
            gradient,
            curvature,
        }
    }

    /// Errors
    /// ------
    /// - `ReliabilityError::InvalidTolerance` unless both are finite and
    ///   positive.
    pub fn with_tolerances(mut self, e1: f64, e2: f64) -> ReliabilityResult<Self> {
        self.e1 = verify_tol("e1", e1)?;
        self.e2 = verify_tol("e2", e2)?;
        Ok(self)
    }

    pub fn with_step_size(mut self, step_size: StepSizeChoice) -> Self {
        self.step_size = step_size;
        self
    }

    fn merit(&self, choice: MeritChoice) -> ReliabilityResult<Box<dyn MeritFunctionCheck>> {
        Ok(match choice {
            MeritChoice::AdkZhang { multi, add, factor } => {
                Box::new(AdkZhangMeritFunctionCheck::new(multi, add, factor)?)
            }
            MeritChoice::CriteriaReduction => {
                Box::new(CriteriaReductionMeritFunctionCheck::new(self.e1, self.e2)?)
            }
        })
    }

    /// Fresh HL-RF search built from this setup.
    pub fn design_point_algorithm(&self) -> ReliabilityResult<SearchWithStepSizeAndStepDirection> {
        let step_size: Box<dyn StepSizeRule> = match self.step_size {
            StepSizeChoice::Fixed(step) => Box::new(FixedStepSizeRule::new(step)?),
            StepSizeChoice::Armijo { merit, base, max_reductions } => {
                Box::new(ArmijoStepSizeRule::new(self.merit(merit)?, base, max_reductions)?)
            }
        };
        Ok(SearchWithStepSizeAndStepDirection::new(
            self.search.clone(),
            Box::new(HLRFSearchDirection::new()),
            step_size,
            Box::new(StandardReliabilityConvergenceCheck::new(self.e1, self.e2)?),
        ))
    }

    fn curvature_algorithm(&self) -> ReliabilityResult<Option<Box<dyn FindCurvatures>>> {
        Ok(match &self.curvature {
            CurvatureMethod::None => None,
            CurvatureMethod::FirstPrincipal => Some(Box::new(FirstPrincipalCurvature::new())),
            CurvatureMethod::Search { number_of_curvatures, options } => Some(Box::new(
                CurvaturesBySearchAlgorithm::new(*number_of_curvatures, options.clone())?
                    .with_tolerances(self.e1, self.e2)?,
            )),
            CurvatureMethod::PointFitting(options) => {
                Some(Box::new(CurvaturesByPointFitting::new(*options)))
            }
        })
    }
}

impl Default for AnalysisSetup {
    fn default() -> Self {
        Self::new(
            SearchOptions::default(),
            GradientMethod::Analytic(GradientCheck::Never),
            CurvatureMethod::None,
        )
    }
}

/// Assemble the u-space problem of limit-state function `lsf_tag`.
///
/// Errors
/// ------
/// - `ReliabilityError::UnknownTag` for an unregistered function.
/// - `ReliabilityError::GradientNotImplemented` when an analytic gradient
///   is requested from a function that has none.
/// - `ReliabilityError::EmptyDomain` without random variables.
/// - Factorization errors of the correlation matrix.
pub fn build_problem(
    domain: &ReliabilityDomain, lsf_tag: usize, gradient: &GradientMethod,
    reporter: Arc<dyn Reporter>,
) -> ReliabilityResult<LimitStateProblem> {
    let function = domain.limit_state_function(lsf_tag)?.function();
    if matches!(gradient, GradientMethod::Analytic(_)) && !function.has_gradient() {
        return Err(ReliabilityError::GradientNotImplemented);
    }
    let transformation = NatafProbabilityTransformation::from_domain(domain)?;
    let random_variables = domain.random_variables();
    let gfun: Arc<dyn GFunEvaluator> = Arc::new(BasicGFunEvaluator::new(function));
    let gradg: Arc<dyn GradGEvaluator> = match gradient {
        GradientMethod::Analytic(check) => Arc::new(AnalyticGradGEvaluator::new(
            gfun.clone(),
            &random_variables,
            *check,
            reporter.clone(),
        )),
        GradientMethod::FiniteDifference(options) => Arc::new(
            FiniteDifferenceGradGEvaluator::new(gfun.clone(), &random_variables, *options),
        ),
    };
    Ok(LimitStateProblem::new(Arc::new(transformation), gfun, gradg, reporter))
}

/// Design point (and curvatures, if configured) of limit-state function
/// `lsf_tag`, recorded in `domain` and returned.
///
/// Errors
/// ------
/// - Setup errors of [`build_problem`] and of the configured algorithms.
/// - `ReliabilityError::SearchFailed`, `NonConvergence` or `Cancelled`
///   from the design-point search; nothing is recorded then.
/// - Curvature errors, after the design point has been recorded.
pub fn analyze_limit_state(
    domain: &mut ReliabilityDomain, lsf_tag: usize, setup: &AnalysisSetup,
    reporter: Arc<dyn Reporter>,
) -> ReliabilityResult<LimitStateResults> {
    let problem = build_problem(domain, lsf_tag, &setup.gradient, reporter)?;
    let mut algorithm = setup.design_point_algorithm()?;
    let mut curvature_algorithm = setup.curvature_algorithm()?;
    let u0 = problem.transformation().x_to_u(&domain.start_point())?;

    let design_point = algorithm.find_design_point(&problem, &u0)?;
    log::info!(
        "limit-state function {lsf_tag}: beta = {:.6}, pf1 = {:.6e} after {} iterations",
        design_point.beta,
        design_point.form_probability(),
        design_point.iterations,
    );
    domain.record_design_point(lsf_tag, design_point.clone())?;

    let curvatures = match curvature_algorithm.as_mut() {
        Some(curvature_algorithm) => {
            let curvatures = curvature_algorithm.compute_curvatures(&problem, &design_point)?;
            log::info!("limit-state function {lsf_tag}: curvatures {curvatures}");
            domain.record_curvatures(lsf_tag, curvatures.clone())?;
            Some(curvatures)
        }
        None => None,
    };
    Ok(LimitStateResults { design_point: Some(design_point), curvatures })
}

/// [`analyze_limit_state`] for every registered limit-state function in
/// ascending tag order, stopping at the first error.
pub fn analyze_all(
    domain: &mut ReliabilityDomain, setup: &AnalysisSetup, reporter: Arc<dyn Reporter>,
) -> ReliabilityResult<Vec<(usize, LimitStateResults)>> {
    let mut results = Vec::new();
    for tag in domain.limit_state_function_tags() {
        let result = analyze_limit_state(domain, tag, setup, reporter.clone())?;
        results.push((tag, result));
    }
    Ok(results)
}

/// Parse a finite-difference gradient method from a scheme name.
pub fn finite_difference_gradient(
    scheme: &str, perturbation_factor: f64, parallel: bool,
) -> ReliabilityResult<GradientMethod> {
    let scheme = FiniteDifferenceScheme::from_str(scheme)?;
    Ok(GradientMethod::FiniteDifference(FiniteDifferenceOptions::new(
        scheme,
        perturbation_factor,
        parallel,
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::ClosurePerformanceFunction, errors::ErrorClass, random_variables::NormalRV,
        reporting::RecordingReporter,
    };
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Method-name parsing and setup validation.
    // - Recording of design points and curvatures in the domain.
    // - Failure paths: unknown tags and failed searches record nothing.
    // -------------------------------------------------------------------------

    /// `R − S` with R ~ N(5, 1), S ~ N(2, 1): β = 3/√2.
    fn resistance_load_domain() -> ReliabilityDomain {
        let mut domain = ReliabilityDomain::new();
        domain.add_random_variable(NormalRV::new(1, 5.0, 1.0).unwrap()).unwrap();
        domain.add_random_variable(NormalRV::new(2, 2.0, 1.0).unwrap()).unwrap();
        let g = ClosurePerformanceFunction::new(|x| Ok(x[0] - x[1]))
            .with_gradient(|_| Ok(array![1.0, -1.0]));
        domain.add_limit_state_function(7, Arc::new(g)).unwrap();
        domain
    }

    #[test]
    fn method_names_parse_case_insensitively() {
        assert_eq!(
            "Analytic".parse::<GradientMethod>().unwrap(),
            GradientMethod::Analytic(GradientCheck::Never)
        );
        assert!(matches!("FD".parse::<GradientMethod>(), Ok(GradientMethod::FiniteDifference(_))));
        assert_eq!(
            "CriteriaReduction".parse::<MeritChoice>().unwrap(),
            MeritChoice::CriteriaReduction
        );
        assert_eq!(
            "POINTFITTING".parse::<CurvatureMethod>().unwrap(),
            CurvatureMethod::PointFitting(PointFittingOptions::default())
        );
        let err = "newton".parse::<CurvatureMethod>().unwrap_err();
        assert_eq!(err.class(), ErrorClass::Configuration);
    }

    #[test]
    fn invalid_setup_values_are_rejected() {
        assert!(AnalysisSetup::default().with_tolerances(0.0, 1e-3).is_err());
        assert!(StepSizeChoice::armijo(MeritChoice::default(), 1.0, 10).is_err());
        assert!(finite_difference_gradient("backward", 1000.0, false).is_err());
        assert!(finite_difference_gradient("central", -1.0, false).is_err());
    }

    #[test]
    // Purpose
    // -------
    // The driver records the design point of a linear limit state.
    //
    // Given
    // -----
    // - `g = R − S`, analytic gradient, default setup.
    //
    // Expect
    // ------
    // - β = 3/√2, `x* = (3.5, 3.5)`, recorded under tag 7, no curvatures.
    fn linear_limit_state_is_recorded() {
        // Arrange
        let mut domain = resistance_load_domain();
        let reporter = Arc::new(RecordingReporter::new());

        // Act
        let results =
            analyze_limit_state(&mut domain, 7, &AnalysisSetup::default(), reporter).unwrap();

        // Assert
        let dp = results.design_point.as_ref().unwrap();
        assert_relative_eq!(dp.beta, 3.0 / 2.0_f64.sqrt(), epsilon = 1e-8);
        assert_relative_eq!(dp.x[0], 3.5, epsilon = 1e-8);
        assert_relative_eq!(dp.x[1], 3.5, epsilon = 1e-8);
        assert_eq!(domain.design_point(7), Some(dp));
        assert!(domain.curvatures(7).is_none());
        assert!(results.curvatures.is_none());
    }

    #[test]
    // Purpose
    // -------
    // Finite-difference gradients with a fixed step and criteria-reduction
    // setup still find the linear design point, and curvatures are recorded.
    fn finite_difference_setup_with_curvatures() {
        let mut domain = resistance_load_domain();
        let setup = AnalysisSetup::new(
            SearchOptions::default(),
            finite_difference_gradient("central", 1000.0, false).unwrap(),
            CurvatureMethod::PointFitting(PointFittingOptions::default()),
        )
        .with_step_size(
            StepSizeChoice::armijo(MeritChoice::CriteriaReduction, 0.5, 10).unwrap(),
        );

        let results =
            analyze_limit_state(&mut domain, 7, &setup, Arc::new(RecordingReporter::new()))
                .unwrap();

        let dp = results.design_point.unwrap();
        assert_relative_eq!(dp.beta, 3.0 / 2.0_f64.sqrt(), epsilon = 1e-6);
        let curvatures = domain.curvatures(7).unwrap();
        assert_eq!(curvatures.len(), 1);
        assert_relative_eq!(curvatures[0], 0.0, epsilon = 1e-6);
    }

    #[test]
    // Purpose
    // -------
    // Failures leave the domain untouched.
    //
    // Given
    // -----
    // - An unknown tag, and a limit state returning NaN.
    //
    // Expect
    // ------
    // - `UnknownTag` (configuration) and `SearchFailed` (evaluation), with
    //   no recorded results.
    fn failures_record_nothing() {
        let mut domain = resistance_load_domain();
        let nan = ClosurePerformanceFunction::new(|_| Ok(f64::NAN))
            .with_gradient(|_| Ok(array![1.0, -1.0]));
        domain.add_limit_state_function(8, Arc::new(nan)).unwrap();
        let setup = AnalysisSetup::default();
        let reporter = Arc::new(RecordingReporter::new());

        let unknown = analyze_limit_state(&mut domain, 99, &setup, reporter.clone());
        let failed = analyze_limit_state(&mut domain, 8, &setup, reporter);

        assert!(matches!(unknown, Err(ReliabilityError::UnknownTag { tag: 99, .. })));
        let err = failed.unwrap_err();
        assert!(matches!(err, ReliabilityError::SearchFailed { iteration: 1, .. }));
        assert_eq!(err.class(), ErrorClass::Evaluation);
        assert!(domain.results(8).is_none());
    }

    #[test]
    // Purpose
    // -------
    // Requesting an analytic gradient the function does not provide is a
    // setup error, raised before the model is evaluated.
    //
    // Given
    // -----
    // - A value-only closure counting its calls, default (analytic) setup.
    //
    // Expect
    // ------
    // - `GradientNotImplemented` of class `Configuration`, no iteration, no
    //   model call, nothing recorded; a finite-difference setup succeeds.
    fn analytic_gradient_without_implementation_fails_at_setup() {
        // Arrange
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = calls.clone();
        let mut domain = resistance_load_domain();
        let value_only = ClosurePerformanceFunction::new(move |x| {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(x[0] - x[1])
        });
        domain.add_limit_state_function(9, Arc::new(value_only)).unwrap();
        let reporter = Arc::new(RecordingReporter::new());

        // Act
        let err = analyze_limit_state(&mut domain, 9, &AnalysisSetup::default(), reporter.clone())
            .unwrap_err();

        // Assert
        assert_eq!(err, ReliabilityError::GradientNotImplemented);
        assert_eq!(err.class(), ErrorClass::Configuration);
        assert_eq!(err.iteration(), None);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
        assert!(domain.results(9).is_none());

        let mut fd = AnalysisSetup::default();
        fd.gradient = "fd".parse().unwrap();
        let results = analyze_limit_state(&mut domain, 9, &fd, reporter).unwrap();
        assert_relative_eq!(
            results.design_point.unwrap().beta,
            3.0 / 2.0_f64.sqrt(),
            epsilon = 1e-6
        );
    }

    #[test]
    fn fresh_algorithms_per_call_give_identical_results() {
        let mut domain = resistance_load_domain();
        let setup = AnalysisSetup::default();

        let first = analyze_all(&mut domain, &setup, Arc::new(RecordingReporter::new())).unwrap();
        let second = analyze_all(&mut domain, &setup, Arc::new(RecordingReporter::new())).unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(first, second);
    }
}
