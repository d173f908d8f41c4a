//! evaluators — limit-state value and gradient evaluation.
//!
//! Purpose
//! -------
//! Sit between the search algorithms and the (possibly expensive) limit-state
//! function: [`GFunEvaluator`] computes `g(x)` with counting and caching,
//! [`GradGEvaluator`] computes `∇ₓg` either from the analytic gradient
//! ([`AnalyticGradGEvaluator`]) or by finite differences
//! ([`FiniteDifferenceGradGEvaluator`]).
//!
//! Conventions
//! -----------
//! - Everything here works in physical x-space; mapping gradients to u-space
//!   is the probability transformation's job.
//! - Evaluators never panic on model failures; they return
//!   `ReliabilityError::EvaluationFailed`, `NonFiniteResponse`, or
//!   `InvalidGradient`.
pub mod analytic;
pub mod finite_diff;
pub mod gfun;
pub mod gradg;

pub use analytic::{AnalyticGradGEvaluator, GradientCheck};
pub use finite_diff::FiniteDifferenceGradGEvaluator;
pub use gfun::{BasicGFunEvaluator, GFunEvaluator};
pub use gradg::{FiniteDifferenceOptions, FiniteDifferenceScheme, GradGEvaluator};
