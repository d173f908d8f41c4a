//! errors — unified error surface for the reliability engine.
//!
//! Purpose
//! -------
//! Collect every failure the design-point engine can report into a single
//! enum, [`ReliabilityError`], together with a coarse classification
//! ([`ErrorClass`]) that lets callers tell a model problem apart from an
//! optimizer problem without matching on individual variants.
//!
//! Key behaviors
//! -------------
//! - Group variants by origin: distribution/domain configuration, option
//!   validation, matrix operations, limit-state evaluation, numerical
//!   degeneracy, search termination, and wrapped `argmin` errors.
//! - Wrap failures raised inside the search loop in
//!   [`ReliabilityError::SearchFailed`] so the iteration and search status at
//!   which they occurred travel with the cause.
//! - Convert `argmin` errors back into [`ReliabilityError`], recovering our own
//!   errors when they were tunnelled through an `argmin` cost function.
//!
//! Conventions
//! -----------
//! - Configuration errors are raised eagerly at construction/setup time, never
//!   from inside a search iteration.
//! - Non-finite values are never coerced; they surface as
//!   [`ReliabilityError::NonFiniteResponse`] or
//!   [`ReliabilityError::InvalidGradient`].
//! - Indices are 0-based and refer to random-variable positions in ascending
//!   tag order.
use crate::search::outcome::{IterationRecord, SearchStatus};
use argmin::core::{ArgminError, Error};

/// Crate-wide result alias.
pub type ReliabilityResult<T> = Result<T, ReliabilityError>;

/// Coarse failure classes reported to the top-level caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Invalid parameters, dimensions, or options detected before iterating.
    Configuration,
    /// The limit-state evaluation (structural model) failed or returned a
    /// non-finite value.
    Evaluation,
    /// The search exhausted its iteration budget.
    NonConvergence,
    /// Singular or ill-conditioned linear algebra, zero gradients, or
    /// unbracketed roots.
    NumericalDegeneracy,
    /// The search was cancelled or ran out of wall-clock budget.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReliabilityError {
    // ---- Distribution / domain configuration ----
    /// A distribution parameter lies outside its admissible range.
    InvalidDistributionParameter {
        distribution: &'static str,
        parameter: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// Probability arguments must lie in the open interval (0, 1).
    InvalidProbability {
        value: f64,
    },

    /// A tag is already registered in the reliability domain.
    DuplicateTag {
        kind: &'static str,
        tag: usize,
    },

    /// A tag is not registered in the reliability domain.
    UnknownTag {
        kind: &'static str,
        tag: usize,
    },

    /// The reliability domain holds no random variables.
    EmptyDomain,

    /// Correlation coefficients must be finite with |rho| < 1.
    InvalidCorrelation {
        rv1: usize,
        rv2: usize,
        value: f64,
        reason: &'static str,
    },

    // ---- Dimensions ----
    /// Vector length does not match the number of random variables.
    DimensionMismatch {
        expected: usize,
        found: usize,
    },

    /// A requested count (samples, curvatures, ...) is not admissible.
    InvalidCount {
        n: usize,
        reason: &'static str,
    },

    /// Interval bounds must be finite with lower < upper.
    InvalidRange {
        lower: f64,
        upper: f64,
    },

    // ---- Options ----
    /// Tolerances need to be positive and finite.
    InvalidTolerance {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// Maximum iterations needs to be positive.
    InvalidMaxIter {
        max_iter: usize,
        reason: &'static str,
    },

    /// Generic numeric option outside its admissible range.
    InvalidOption {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// Unknown name for an enumerated option.
    InvalidChoice {
        option: &'static str,
        name: String,
        reason: &'static str,
    },

    // ---- Matrix operations ----
    /// Matrix entries need to be finite.
    NonFiniteEntry {
        row: usize,
        col: usize,
        value: f64,
    },

    /// Operation requires a square matrix.
    NotSquare {
        rows: usize,
        cols: usize,
    },

    /// Operation requires a symmetric matrix.
    NotSymmetric {
        row: usize,
        col: usize,
    },

    /// Cholesky factorization failed.
    NotPositiveDefinite,

    /// Square root requested for a matrix with a negative eigenvalue.
    NotPositiveSemiDefinite {
        eigenvalue: f64,
    },

    /// Inverse requested for a (numerically) singular matrix.
    SingularMatrix {
        pivot: f64,
    },

    /// A product was requested before the matching `compute_*` call.
    NotComputed {
        product: &'static str,
    },

    // ---- Evaluation ----
    /// The structural analysis or user performance function failed.
    EvaluationFailed {
        reason: String,
    },

    /// The performance function returned NaN or an infinity.
    NonFiniteResponse {
        value: f64,
    },

    /// An analytic gradient was requested from a performance function that
    /// has none; finite differences should be configured instead.
    GradientNotImplemented,

    /// Gradient dimensions do not match parameter dimensions.
    GradientDimMismatch {
        expected: usize,
        found: usize,
    },

    /// Gradient elements need to be finite.
    InvalidGradient {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    /// Hessian matrix dimensions do not match parameter dimensions.
    HessianDimMismatch {
        expected: usize,
        found: (usize, usize),
    },

    /// Hessian values need to be finite.
    InvalidHessian {
        row: usize,
        col: usize,
        value: f64,
    },

    // ---- Numerical degeneracy ----
    /// The limit-state gradient vanished; the HL-RF update divides by ‖∇g‖².
    ZeroGradientNorm {
        norm: f64,
    },

    /// A marginal density vanished where the probability transformation
    /// needs to divide by it.
    ZeroDensity {
        index: usize,
        x: f64,
    },

    /// Curvature estimation could not be carried out.
    DegenerateCurvature {
        reason: &'static str,
    },

    /// No sign change of g was found along a fitting line.
    RootNotBracketed {
        lower: f64,
        upper: f64,
    },

    // ---- Search termination ----
    /// A failure raised inside the design-point search.
    SearchFailed {
        iteration: usize,
        status: SearchStatus,
        cause: Box<ReliabilityError>,
    },

    /// The iteration budget was exhausted; carries the best iterate found.
    NonConvergence {
        iterations: usize,
        best: Box<IterationRecord>,
    },

    /// The search was stopped by its cancellation hook.
    Cancelled {
        iteration: usize,
        reason: &'static str,
        last: Option<Box<IterationRecord>>,
    },

    // ---- Argmin ----
    /// Wrapper for argmin::InvalidParameter
    InvalidParameter {
        text: String,
    },
    /// Wrapper for argmin::NotImplemented
    NotImplemented {
        text: String,
    },
    /// Wrapper for argmin::NotInitialized
    NotInitialized {
        text: String,
    },
    /// Wrapper for argmin::ConditionViolated
    ConditionViolated {
        text: String,
    },
    /// Wrapper for argmin::CheckPointNotFound
    CheckPointNotFound {
        text: String,
    },
    /// Wrapper for argmin::PotentialBug
    PotentialBug {
        text: String,
    },
    /// Wrapper for argmin::ImpossibleError
    ImpossibleError {
        text: String,
    },
    /// Wrapper for other argmin::Error types
    BackendError {
        text: String,
    },

    // ---- Fallback ----
    UnknownError,
}

impl ReliabilityError {
    /// Classify the error for top-level reporting.
    ///
    /// Search wrappers report the class of their cause, so a failed
    /// structural analysis at iteration 7 is still an
    /// [`ErrorClass::Evaluation`].
    pub fn class(&self) -> ErrorClass {
        match self {
            ReliabilityError::InvalidDistributionParameter { .. }
            | ReliabilityError::InvalidProbability { .. }
            | ReliabilityError::DuplicateTag { .. }
            | ReliabilityError::UnknownTag { .. }
            | ReliabilityError::EmptyDomain
            | ReliabilityError::InvalidCorrelation { .. }
            | ReliabilityError::DimensionMismatch { .. }
            | ReliabilityError::InvalidCount { .. }
            | ReliabilityError::InvalidRange { .. }
            | ReliabilityError::InvalidTolerance { .. }
            | ReliabilityError::InvalidMaxIter { .. }
            | ReliabilityError::InvalidOption { .. }
            | ReliabilityError::InvalidChoice { .. }
            | ReliabilityError::NonFiniteEntry { .. }
            | ReliabilityError::NotSquare { .. }
            | ReliabilityError::NotSymmetric { .. }
            | ReliabilityError::NotPositiveDefinite
            | ReliabilityError::NotComputed { .. }
            | ReliabilityError::GradientNotImplemented
            | ReliabilityError::InvalidParameter { .. } => ErrorClass::Configuration,

            ReliabilityError::EvaluationFailed { .. }
            | ReliabilityError::NonFiniteResponse { .. }
            | ReliabilityError::GradientDimMismatch { .. }
            | ReliabilityError::InvalidGradient { .. }
            | ReliabilityError::HessianDimMismatch { .. }
            | ReliabilityError::InvalidHessian { .. } => ErrorClass::Evaluation,

            ReliabilityError::NotPositiveSemiDefinite { .. }
            | ReliabilityError::SingularMatrix { .. }
            | ReliabilityError::ZeroGradientNorm { .. }
            | ReliabilityError::ZeroDensity { .. }
            | ReliabilityError::DegenerateCurvature { .. }
            | ReliabilityError::RootNotBracketed { .. }
            | ReliabilityError::NotImplemented { .. }
            | ReliabilityError::NotInitialized { .. }
            | ReliabilityError::ConditionViolated { .. }
            | ReliabilityError::CheckPointNotFound { .. }
            | ReliabilityError::PotentialBug { .. }
            | ReliabilityError::ImpossibleError { .. }
            | ReliabilityError::BackendError { .. }
            | ReliabilityError::UnknownError => ErrorClass::NumericalDegeneracy,

            ReliabilityError::SearchFailed { cause, .. } => cause.class(),
            ReliabilityError::NonConvergence { .. } => ErrorClass::NonConvergence,
            ReliabilityError::Cancelled { .. } => ErrorClass::Cancelled,
        }
    }

    /// Iteration at which a search-level failure occurred, if any.
    pub fn iteration(&self) -> Option<usize> {
        match self {
            ReliabilityError::SearchFailed { iteration, .. }
            | ReliabilityError::Cancelled { iteration, .. } => Some(*iteration),
            ReliabilityError::NonConvergence { iterations, .. } => Some(*iterations),
            _ => None,
        }
    }

    /// Innermost cause, looking through [`ReliabilityError::SearchFailed`].
    pub fn root_cause(&self) -> &ReliabilityError {
        match self {
            ReliabilityError::SearchFailed { cause, .. } => cause.root_cause(),
            other => other,
        }
    }
}

impl std::error::Error for ReliabilityError {}

impl std::fmt::Display for ReliabilityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Distribution / domain configuration ----
            ReliabilityError::InvalidDistributionParameter {
                distribution,
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid {distribution} parameter '{parameter}' = {value}: {reason}")
            }
            ReliabilityError::InvalidProbability { value } => {
                write!(f, "Probability must lie in (0, 1); got: {value}")
            }
            ReliabilityError::DuplicateTag { kind, tag } => {
                write!(f, "A {kind} with tag {tag} is already registered")
            }
            ReliabilityError::UnknownTag { kind, tag } => {
                write!(f, "No {kind} with tag {tag} is registered")
            }
            ReliabilityError::EmptyDomain => {
                write!(f, "Reliability domain holds no random variables")
            }
            ReliabilityError::InvalidCorrelation { rv1, rv2, value, reason } => {
                write!(f, "Invalid correlation between {rv1} and {rv2}: {value}: {reason}")
            }

            // ---- Dimensions ----
            ReliabilityError::DimensionMismatch { expected, found } => {
                write!(f, "Dimension mismatch: expected {expected}, found {found}")
            }
            ReliabilityError::InvalidCount { n, reason } => {
                write!(f, "Invalid count {n}: {reason}")
            }
            ReliabilityError::InvalidRange { lower, upper } => {
                write!(f, "Invalid range [{lower}, {upper}]: bounds must be finite with lower < upper")
            }

            // ---- Options ----
            ReliabilityError::InvalidTolerance { name, value, reason } => {
                write!(f, "Invalid tolerance {name} = {value}: {reason}")
            }
            ReliabilityError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            ReliabilityError::InvalidOption { name, value, reason } => {
                write!(f, "Invalid option {name} = {value}: {reason}")
            }

            ReliabilityError::InvalidChoice { option, name, reason } => {
                write!(f, "Invalid {option} '{name}': {reason}")
            }

            // ---- Matrix operations ----
            ReliabilityError::NonFiniteEntry { row, col, value } => {
                write!(f, "Matrix entry ({row}, {col}) = {value} must be finite")
            }
            ReliabilityError::NotSquare { rows, cols } => {
                write!(f, "Matrix must be square; got {rows}x{cols}")
            }
            ReliabilityError::NotSymmetric { row, col } => {
                write!(f, "Matrix must be symmetric; entries ({row}, {col}) and ({col}, {row}) differ")
            }
            ReliabilityError::NotPositiveDefinite => {
                write!(f, "Matrix is not positive definite")
            }
            ReliabilityError::NotPositiveSemiDefinite { eigenvalue } => {
                write!(f, "Matrix is not positive semi-definite (eigenvalue {eigenvalue})")
            }
            ReliabilityError::SingularMatrix { pivot } => {
                write!(f, "Matrix is singular or ill-conditioned (relative pivot {pivot})")
            }
            ReliabilityError::NotComputed { product } => {
                write!(f, "The {product} has not been computed")
            }

            // ---- Evaluation ----
            ReliabilityError::EvaluationFailed { reason } => {
                write!(f, "Limit-state evaluation failed: {reason}")
            }
            ReliabilityError::NonFiniteResponse { value } => {
                write!(f, "Limit-state evaluation returned a non-finite value: {value}")
            }
            ReliabilityError::GradientNotImplemented => {
                write!(f, "Analytic gradient not implemented")
            }
            ReliabilityError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient dimension mismatch: expected {expected}, found {found}")
            }
            ReliabilityError::InvalidGradient { index, value, reason } => {
                write!(f, "Invalid gradient at index {index}: {value}: {reason}")
            }
            ReliabilityError::HessianDimMismatch { expected, found } => {
                write!(
                    f,
                    "Hessian dimension mismatch: expected ({expected}, {expected}), found {found:?}"
                )
            }
            ReliabilityError::InvalidHessian { row, col, value } => {
                write!(f, "Invalid Hessian at ({row}, {col}): {value}, must be finite")
            }

            // ---- Numerical degeneracy ----
            ReliabilityError::ZeroGradientNorm { norm } => {
                write!(f, "Limit-state gradient vanished (norm {norm})")
            }
            ReliabilityError::ZeroDensity { index, x } => {
                write!(f, "Density of random variable at position {index} vanishes at x = {x}")
            }
            ReliabilityError::DegenerateCurvature { reason } => {
                write!(f, "Curvature estimation failed: {reason}")
            }
            ReliabilityError::RootNotBracketed { lower, upper } => {
                write!(f, "No sign change of g found in [{lower}, {upper}]")
            }

            // ---- Search termination ----
            ReliabilityError::SearchFailed { iteration, status, cause } => {
                write!(f, "Design-point search stopped at iteration {iteration} ({status:?}): {cause}")
            }
            ReliabilityError::NonConvergence { iterations, best } => {
                write!(
                    f,
                    "Design-point search did not converge in {iterations} iterations (best g = {})",
                    best.g
                )
            }
            ReliabilityError::Cancelled { iteration, reason, .. } => {
                write!(f, "Design-point search cancelled at iteration {iteration}: {reason}")
            }

            // ---- Argmin ----
            ReliabilityError::InvalidParameter { text } => {
                write!(f, "Invalid parameter: {text}")
            }
            ReliabilityError::NotImplemented { text } => {
                write!(f, "Not implemented: {text}")
            }
            ReliabilityError::NotInitialized { text } => {
                write!(f, "Not initialized: {text}")
            }
            ReliabilityError::ConditionViolated { text } => {
                write!(f, "Condition violated: {text}")
            }
            ReliabilityError::CheckPointNotFound { text } => {
                write!(f, "Checkpoint not found: {text}")
            }
            ReliabilityError::PotentialBug { text } => {
                write!(f, "Potential bug: {text}")
            }
            ReliabilityError::ImpossibleError { text } => {
                write!(f, "Impossible error: {text}")
            }
            ReliabilityError::BackendError { text } => {
                write!(f, "Backend error: {text}")
            }

            // ---- Fallback ----
            ReliabilityError::UnknownError => {
                write!(f, "Unknown error")
            }
        }
    }
}

impl From<Error> for ReliabilityError {
    fn from(original_err: Error) -> Self {
        // Our own errors are tunnelled through argmin cost functions unchanged.
        let original_err = match original_err.downcast::<ReliabilityError>() {
            Ok(err) => return err,
            Err(err) => err,
        };
        match original_err.downcast() {
            Ok(argmin_err) => match argmin_err {
                ArgminError::InvalidParameter { text } => {
                    ReliabilityError::InvalidParameter { text }
                }
                ArgminError::NotImplemented { text } => ReliabilityError::NotImplemented { text },
                ArgminError::NotInitialized { text } => ReliabilityError::NotInitialized { text },
                ArgminError::ConditionViolated { text } => {
                    ReliabilityError::ConditionViolated { text }
                }
                ArgminError::CheckpointNotFound { text } => {
                    ReliabilityError::CheckPointNotFound { text }
                }
                ArgminError::PotentialBug { text } => ReliabilityError::PotentialBug { text },
                ArgminError::ImpossibleError { text } => ReliabilityError::ImpossibleError { text },
                _ => ReliabilityError::UnknownError,
            },
            Err(err) => ReliabilityError::BackendError { text: err.to_string() },
        }
    }
}
