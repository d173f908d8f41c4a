//! domain::reliability_domain — registry of random variables, correlations,
//! limit-state functions and their results.
//!
//! Purpose
//! -------
//! Own the probabilistic model of one reliability problem and the results
//! recorded for it. Everything is keyed by integer tag; vectors handed to
//! the rest of the engine list random variables in ascending tag order.
//!
//! Key behaviors
//! -------------
//! - Registration rejects duplicate tags; lookups reject unknown tags. There
//!   is no removal.
//! - Correlation coefficients are stored per unordered pair and assembled
//!   into a symmetric matrix with unit diagonal by
//!   [`ReliabilityDomain::correlation_matrix`].
//! - Design points and curvatures are recorded per limit-state function and
//!   overwritten by later analyses of the same function.
//!
//! Invariants & assumptions
//! ------------------------
//! - Correlation coefficients are finite with `|ρ| < 1` and refer to two
//!   distinct registered random variables. They are interpreted as
//!   correlations of the standard normal images `zᵢ = Φ⁻¹(Fᵢ(xᵢ))`.
//! - Positive definiteness of the assembled matrix is checked when the
//!   probability transformation factors it, not at registration.
use crate::{
    domain::limit_state::{LimitStateFunction, PerformanceFunction},
    errors::{ReliabilityError, ReliabilityResult},
    random_variables::RandomVariable,
    search::outcome::DesignPoint,
    types::XSpace,
};
use ndarray::{Array1, Array2};
use std::{collections::BTreeMap, sync::Arc};

/// Results recorded for one limit-state function.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LimitStateResults {
    pub design_point: Option<DesignPoint>,
    pub curvatures: Option<Array1<f64>>,
}

#[derive(Debug, Default)]
pub struct ReliabilityDomain {
    random_variables: BTreeMap<usize, Arc<dyn RandomVariable>>,
    correlations: BTreeMap<(usize, usize), f64>,
    limit_state_functions: BTreeMap<usize, LimitStateFunction>,
    results: BTreeMap<usize, LimitStateResults>,
}

impl ReliabilityDomain {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- Random variables ----

    /// Register a random variable under its own tag.
    ///
    /// Errors
    /// ------
    /// - `ReliabilityError::DuplicateTag` if the tag is taken.
    pub fn add_random_variable<R: RandomVariable + 'static>(
        &mut self, rv: R,
    ) -> ReliabilityResult<()> {
        let tag = rv.tag();
        if self.random_variables.contains_key(&tag) {
            return Err(ReliabilityError::DuplicateTag { kind: "random variable", tag });
        }
        self.random_variables.insert(tag, Arc::new(rv));
        Ok(())
    }

    pub fn random_variable(&self, tag: usize) -> ReliabilityResult<&Arc<dyn RandomVariable>> {
        self.random_variables
            .get(&tag)
            .ok_or(ReliabilityError::UnknownTag { kind: "random variable", tag })
    }

    /// All random variables in ascending tag order.
    pub fn random_variables(&self) -> Vec<Arc<dyn RandomVariable>> {
        self.random_variables.values().cloned().collect()
    }

    pub fn number_of_random_variables(&self) -> usize {
        self.random_variables.len()
    }

    /// Position of a tag in the ascending-tag vector layout.
    pub fn position_of(&self, tag: usize) -> ReliabilityResult<usize> {
        self.random_variables
            .keys()
            .position(|&t| t == tag)
            .ok_or(ReliabilityError::UnknownTag { kind: "random variable", tag })
    }

    /// Start point of the search in x-space.
    pub fn start_point(&self) -> XSpace {
        self.random_variables.values().map(|rv| rv.start_value()).collect()
    }

    // ---- Correlation ----

    /// Register the correlation coefficient between two random variables.
    ///
    /// Errors
    /// ------
    /// - `ReliabilityError::UnknownTag` for an unregistered random variable.
    /// - `ReliabilityError::InvalidCorrelation` for a self-correlation, a
    ///   coefficient that is not finite with `|ρ| < 1`, or a pair that
    ///   already has a coefficient.
    pub fn add_correlation(&mut self, rv1: usize, rv2: usize, rho: f64) -> ReliabilityResult<()> {
        self.random_variable(rv1)?;
        self.random_variable(rv2)?;
        let invalid = |reason| ReliabilityError::InvalidCorrelation { rv1, rv2, value: rho, reason };
        if rv1 == rv2 {
            return Err(invalid("A random variable cannot be correlated with itself."));
        }
        if !rho.is_finite() || rho.abs() >= 1.0 {
            return Err(invalid("Correlation must be finite with |rho| < 1."));
        }
        let key = (rv1.min(rv2), rv1.max(rv2));
        if self.correlations.contains_key(&key) {
            return Err(invalid("Correlation for this pair is already defined."));
        }
        self.correlations.insert(key, rho);
        Ok(())
    }

    pub fn correlation(&self, rv1: usize, rv2: usize) -> f64 {
        if rv1 == rv2 {
            return 1.0;
        }
        self.correlations.get(&(rv1.min(rv2), rv1.max(rv2))).copied().unwrap_or(0.0)
    }

    pub fn has_correlation(&self) -> bool {
        self.correlations.values().any(|&rho| rho != 0.0)
    }

    /// Symmetric correlation matrix with unit diagonal, ascending tag order.
    ///
    /// Errors
    /// ------
    /// - `ReliabilityError::EmptyDomain` when no random variable is
    ///   registered.
    pub fn correlation_matrix(&self) -> ReliabilityResult<Array2<f64>> {
        let n = self.number_of_random_variables();
        if n == 0 {
            return Err(ReliabilityError::EmptyDomain);
        }
        let mut matrix = Array2::eye(n);
        for (&(a, b), &rho) in &self.correlations {
            let (i, j) = (self.position_of(a)?, self.position_of(b)?);
            matrix[[i, j]] = rho;
            matrix[[j, i]] = rho;
        }
        Ok(matrix)
    }

    // ---- Limit-state functions ----

    pub fn add_limit_state_function(
        &mut self, tag: usize, function: Arc<dyn PerformanceFunction>,
    ) -> ReliabilityResult<()> {
        if self.limit_state_functions.contains_key(&tag) {
            return Err(ReliabilityError::DuplicateTag { kind: "limit-state function", tag });
        }
        self.limit_state_functions.insert(tag, LimitStateFunction::new(tag, function));
        Ok(())
    }

    pub fn limit_state_function(&self, tag: usize) -> ReliabilityResult<&LimitStateFunction> {
        self.limit_state_functions
            .get(&tag)
            .ok_or(ReliabilityError::UnknownTag { kind: "limit-state function", tag })
    }

    pub fn limit_state_function_tags(&self) -> Vec<usize> {
        self.limit_state_functions.keys().copied().collect()
    }

    // ---- Results ----

    pub fn record_design_point(
        &mut self, lsf_tag: usize, design_point: DesignPoint,
    ) -> ReliabilityResult<()> {
        self.limit_state_function(lsf_tag)?;
        self.results.entry(lsf_tag).or_default().design_point = Some(design_point);
        Ok(())
    }

    pub fn record_curvatures(
        &mut self, lsf_tag: usize, curvatures: Array1<f64>,
    ) -> ReliabilityResult<()> {
        self.limit_state_function(lsf_tag)?;
        self.results.entry(lsf_tag).or_default().curvatures = Some(curvatures);
        Ok(())
    }

    pub fn results(&self, lsf_tag: usize) -> Option<&LimitStateResults> {
        self.results.get(&lsf_tag)
    }

    pub fn design_point(&self, lsf_tag: usize) -> Option<&DesignPoint> {
        self.results.get(&lsf_tag).and_then(|r| r.design_point.as_ref())
    }

    pub fn curvatures(&self, lsf_tag: usize) -> Option<&Array1<f64>> {
        self.results.get(&lsf_tag).and_then(|r| r.curvatures.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::limit_state::ClosurePerformanceFunction,
        random_variables::{LognormalRV, NormalRV},
    };

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Tag ordering of vectors and matrices.
    // - Duplicate / unknown tag handling.
    // - Correlation validation and matrix assembly.
    // -------------------------------------------------------------------------

    fn domain() -> ReliabilityDomain {
        let mut d = ReliabilityDomain::new();
        d.add_random_variable(NormalRV::new(5, 10.0, 1.0).unwrap()).unwrap();
        d.add_random_variable(LognormalRV::from_mean_stdv(2, 3.0, 0.3).unwrap()).unwrap();
        d
    }

    #[test]
    // Purpose
    // -------
    // Vectors follow ascending tag order regardless of insertion order.
    //
    // Given
    // -----
    // - Tags 5 (normal, mean 10) and 2 (lognormal, mean 3) inserted in that
    //   order.
    //
    // Expect
    // ------
    // - `start_point()` is `[3, 10]` and tag 5 sits at position 1.
    fn vectors_follow_ascending_tag_order() {
        // Arrange
        let d = domain();

        // Act
        let start = d.start_point();

        // Assert
        assert!((start[0] - 3.0).abs() < 1e-12);
        assert_eq!(start[1], 10.0);
        assert_eq!(d.position_of(5).unwrap(), 1);
    }

    #[test]
    fn duplicate_and_unknown_tags_are_configuration_errors() {
        let mut d = domain();
        assert_eq!(
            d.add_random_variable(NormalRV::new(5, 0.0, 1.0).unwrap()),
            Err(ReliabilityError::DuplicateTag { kind: "random variable", tag: 5 })
        );
        assert!(matches!(d.random_variable(9), Err(ReliabilityError::UnknownTag { tag: 9, .. })));

        let g = Arc::new(ClosurePerformanceFunction::new(|x: &XSpace| Ok(x[0])));
        d.add_limit_state_function(1, g.clone()).unwrap();
        assert!(matches!(
            d.add_limit_state_function(1, g),
            Err(ReliabilityError::DuplicateTag { tag: 1, .. })
        ));
        assert!(d.limit_state_function(2).is_err());
    }

    #[test]
    // Purpose
    // -------
    // Correlations are validated and assembled symmetrically.
    fn correlation_matrix_is_symmetric_with_unit_diagonal() {
        // Arrange
        let mut d = domain();

        // Act
        d.add_correlation(5, 2, 0.4).unwrap();
        let m = d.correlation_matrix().unwrap();

        // Assert
        assert_eq!(m[[0, 1]], 0.4);
        assert_eq!(m[[1, 0]], 0.4);
        assert_eq!(m[[0, 0]], 1.0);
        assert!(d.has_correlation());
        assert!(d.add_correlation(2, 5, 0.1).is_err());
        assert!(d.add_correlation(2, 2, 0.1).is_err());
        assert!(d.add_correlation(2, 5, 1.0).is_err());
        assert_eq!(ReliabilityDomain::new().correlation_matrix(), Err(ReliabilityError::EmptyDomain));
    }
}
