//! rust_reliability — FORM/SORM design-point search for structural
//! reliability.
//!
//! Purpose
//! -------
//! Find the most probable failure point (design point) of a limit-state
//! function `g(x)` over correlated random variables, and estimate the
//! curvatures of the failure surface there. The structural model behind
//! `g` is an external collaborator reached through
//! [`domain::PerformanceFunction`] / [`domain::StructuralAnalysis`].
//!
//! Key behaviors
//! -------------
//! - [`random_variables`] provides validated marginal distributions and
//!   [`random_numbers`] a seeded standard-normal/uniform generator.
//! - [`domain::ReliabilityDomain`] registers random variables,
//!   correlations and limit-state functions by tag, and records results.
//! - [`transform`] maps between physical x-space and standard normal
//!   u-space (Nataf with correlated normal images).
//! - [`evaluators`] count and validate g-evaluations and produce analytic
//!   or finite-difference gradients.
//! - [`search`] implements the HL-RF design-point search with Armijo step
//!   sizes and pluggable merit functions, convergence checks and
//!   cancellation.
//! - [`curvatures`] estimates principal curvatures at a converged design
//!   point, and [`analysis`] drives a whole analysis over a domain.
//!
//! Conventions
//! -----------
//! - Point and gradient vectors are `ndarray::Array1<f64>` with one entry
//!   per random variable in ascending tag order (see [`types`]).
//! - Every fallible operation returns [`errors::ReliabilityResult`];
//!   non-fatal conditions go to an injected [`reporting::Reporter`].
//! - `g(x) ≤ 0` is failure. `β` is signed: negative when the mean point
//!   already lies in the failure domain.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each module; `tests/` holds the distribution
//!   property tests and end-to-end analyses through [`analysis`].

pub mod analysis;
pub mod curvatures;
pub mod domain;
pub mod errors;
pub mod evaluators;
pub mod linalg;
pub mod random_numbers;
pub mod random_variables;
pub mod reporting;
pub mod search;
pub mod transform;
pub mod types;
pub mod validation;

pub use analysis::{AnalysisSetup, analyze_all, analyze_limit_state};
pub use errors::{ErrorClass, ReliabilityError, ReliabilityResult};
