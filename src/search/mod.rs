//! search — design-point (most probable failure point) search.
//!
//! Purpose
//! -------
//! Locate the point of the limit-state surface `g(u) = 0` nearest to the
//! origin of standard normal space. Its distance is the reliability index β
//! used by FORM, and its neighbourhood feeds the SORM curvature algorithms.
//!
//! Layout
//! ------
//! - [`problem`] — u-space view of the limit state (transformation plus
//!   evaluators), optionally restricted to a subspace.
//! - [`direction`], [`step_size`], [`merit`], [`convergence`] — the
//!   pluggable pieces of one iteration.
//! - [`design_point`] — the iteration loop and its state machine.
//! - [`options`], [`cancel`] — search configuration.
//! - [`outcome`] — status, iteration records and the design point.
pub mod cancel;
pub mod convergence;
pub mod design_point;
pub mod direction;
pub mod merit;
pub mod options;
pub mod outcome;
pub mod problem;
pub mod step_size;

pub use cancel::CancellationToken;
pub use convergence::{ReliabilityConvergenceCheck, StandardReliabilityConvergenceCheck};
pub use design_point::{FindDesignPointAlgorithm, SearchWithStepSizeAndStepDirection};
pub use direction::{HLRFSearchDirection, SearchDirection};
pub use merit::{
    AdkZhangMeritFunctionCheck, CriteriaReductionMeritFunctionCheck, MeritFunctionCheck,
};
pub use options::SearchOptions;
pub use outcome::{DesignPoint, IterationRecord, SearchStatus};
pub use problem::{Iterate, IterateGradient, LimitStateProblem};
pub use step_size::{ArmijoStepSizeRule, FixedStepSizeRule, StepOutcome, StepSizeRule};
