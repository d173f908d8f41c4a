//! random_variables — marginal distributions of the basic random variables.
//!
//! Purpose
//! -------
//! Provide the [`RandomVariable`] trait and a compact catalog of
//! distributions commonly used in structural reliability:
//!
//! | Type | Parameters | Support |
//! |---|---|---|
//! | [`NormalRV`] | `μ`, `σ` | ℝ |
//! | [`LognormalRV`] | `λ`, `ζ` (or mean/stdv) | `x > 0` |
//! | [`UniformRV`] | `a`, `b` | `[a, b]` |
//! | [`ExponentialRV`] | `λ`, `x0` | `x ≥ x0` |
//! | [`GumbelRV`] | `u`, `α` | ℝ |
//! | [`WeibullRV`] | `u`, `k` | `x ≥ 0` |
//! | [`ParetoRV`] | `k`, `u` | `x ≥ u` |
//! | [`GammaRV`] | `k`, `λ` | `x > 0` |
//!
//! Conventions
//! -----------
//! - Densities and CDFs delegate to `statrs` where it provides the family;
//!   quantiles are closed form except for the gamma distribution, which
//!   bisects its CDF ([`inverse`]).
//! - Constructors validate parameters eagerly and return
//!   `ReliabilityError::InvalidDistributionParameter`; instances are
//!   immutable afterwards.
//!
//! Testing notes
//! -------------
//! - Each distribution carries unit tests against closed-form values.
//! - `tests/distribution_laws.rs` checks the round-trip, monotonicity, and
//!   non-negativity laws with `proptest` across the whole catalog.
pub mod exponential;
pub mod gamma;
pub mod gumbel;
pub mod inverse;
pub mod lognormal;
pub mod normal;
pub mod pareto;
pub mod traits;
pub mod uniform;
pub mod validation;
pub mod weibull;

pub use exponential::ExponentialRV;
pub use gamma::GammaRV;
pub use gumbel::GumbelRV;
pub use lognormal::LognormalRV;
pub use normal::NormalRV;
pub use pareto::ParetoRV;
pub use traits::{Identity, RandomVariable};
pub use uniform::UniformRV;
pub use weibull::WeibullRV;
