//! domain — the probabilistic model: random variables, correlation,
//! limit-state functions, and recorded results.
pub mod limit_state;
pub mod reliability_domain;

pub use limit_state::{
    AnalysisFailure, ClosurePerformanceFunction, LimitStateFunction, PerformanceFunction,
    StructuralAnalysis, StructuralPerformanceFunction,
};
pub use reliability_domain::{LimitStateResults, ReliabilityDomain};
