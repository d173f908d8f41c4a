//! linalg::matrix_operations — one matrix plus its cached derived products.
//!
//! Purpose
//! -------
//! Wrap a dense matrix and compute, on request, the derived quantities the
//! reliability engine needs: the lower Cholesky factor of a correlation
//! matrix and its inverse (Nataf transformation), general inverses, the
//! symmetric square root, transpose, trace, and Frobenius norm.
//!
//! Key behaviors
//! -------------
//! - Each `compute_*` method fills one cached product; the matching getter
//!   returns it, or [`ReliabilityError::NotComputed`] when it has not been
//!   computed for the current matrix.
//! - [`MatrixOperations::set_matrix`] replaces the matrix and clears every
//!   cached product.
//! - Factorizations and eigen decompositions are delegated to `nalgebra`
//!   via the copies in [`crate::linalg::bridge`].
//!
//! Invariants & assumptions
//! ------------------------
//! - The stored matrix is non-empty with finite entries; this is checked on
//!   construction and on every `set_matrix`.
//! - Symmetry is checked entry-wise with a relative tolerance of
//!   [`SYMMETRY_TOL`] before Cholesky factorizations and square roots.
//!
//! Testing notes
//! -------------
//! - Unit tests check `L·Lᵀ` reconstruction, `M·M⁻¹ ≈ I`, the square root
//!   identity `S·S ≈ M`, the error paths for non-PD, singular, and
//!   non-square input, and the cache reset in `set_matrix`.
use crate::{
    errors::{ReliabilityError, ReliabilityResult},
    linalg::bridge::{from_dmatrix, to_dmatrix},
};
use nalgebra::{Cholesky, DMatrix};
use ndarray::Array2;

/// Relative tolerance for the entry-wise symmetry check.
pub const SYMMETRY_TOL: f64 = 1e-10;

/// Smallest admissible ratio `min|uᵢᵢ| / max|uᵢᵢ|` of the LU pivots.
pub const PIVOT_TOL: f64 = 1e-14;

/// Eigenvalues above `-EIGEN_EPS·max(1, max|λ|)` count as non-negative.
pub const EIGEN_EPS: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub struct MatrixOperations {
    matrix: Array2<f64>,
    lower_cholesky: Option<Array2<f64>>,
    inverse_lower_cholesky: Option<Array2<f64>>,
    inverse: Option<Array2<f64>>,
    transpose: Option<Array2<f64>>,
    square_root: Option<Array2<f64>>,
    trace: Option<f64>,
    matrix_norm: Option<f64>,
}

impl MatrixOperations {
    /// Wrap `matrix` with an empty product cache.
    ///
    /// Errors
    /// ------
    /// - `ReliabilityError::InvalidCount` for a matrix with zero rows or
    ///   columns.
    /// - `ReliabilityError::NonFiniteEntry` for the first NaN/±∞ entry.
    pub fn new(matrix: Array2<f64>) -> ReliabilityResult<Self> {
        validate_matrix(&matrix)?;
        Ok(Self {
            matrix,
            lower_cholesky: None,
            inverse_lower_cholesky: None,
            inverse: None,
            transpose: None,
            square_root: None,
            trace: None,
            matrix_norm: None,
        })
    }

    /// Replace the stored matrix and drop every cached product.
    pub fn set_matrix(&mut self, matrix: Array2<f64>) -> ReliabilityResult<()> {
        *self = Self::new(matrix)?;
        Ok(())
    }

    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    // ---- Cholesky ----

    /// compute_lower_cholesky — lower-triangular `L` with `L·Lᵀ = M`.
    ///
    /// Errors
    /// ------
    /// - `ReliabilityError::NotSquare` / `ReliabilityError::NotSymmetric`
    ///   when `M` is not a symmetric square matrix.
    /// - `ReliabilityError::NotPositiveDefinite` when the factorization
    ///   breaks down.
    pub fn compute_lower_cholesky(&mut self) -> ReliabilityResult<()> {
        let chol = self.cholesky()?;
        self.lower_cholesky = Some(from_dmatrix(&chol.l()));
        Ok(())
    }

    /// compute_inverse_lower_cholesky — `L⁻¹` by forward substitution.
    ///
    /// The factor itself is not cached by this call; use
    /// [`MatrixOperations::compute_cholesky_and_its_inverse`] for both.
    pub fn compute_inverse_lower_cholesky(&mut self) -> ReliabilityResult<()> {
        let chol = self.cholesky()?;
        self.inverse_lower_cholesky = Some(invert_lower(&chol.l())?);
        Ok(())
    }

    /// compute_cholesky_and_its_inverse — fill both `L` and `L⁻¹` from one
    /// factorization.
    pub fn compute_cholesky_and_its_inverse(&mut self) -> ReliabilityResult<()> {
        let l = self.cholesky()?.l();
        self.inverse_lower_cholesky = Some(invert_lower(&l)?);
        self.lower_cholesky = Some(from_dmatrix(&l));
        Ok(())
    }

    // ---- General products ----

    /// compute_inverse — `M⁻¹` via LU decomposition with partial pivoting.
    ///
    /// Errors
    /// ------
    /// - `ReliabilityError::NotSquare` for a rectangular matrix.
    /// - `ReliabilityError::SingularMatrix` when the pivot ratio
    ///   `min|uᵢᵢ| / max|uᵢᵢ|` falls below [`PIVOT_TOL`] or the inversion
    ///   fails.
    pub fn compute_inverse(&mut self) -> ReliabilityResult<()> {
        require_square(&self.matrix)?;
        let lu = to_dmatrix(&self.matrix).lu();
        let u = lu.u();
        let (min_pivot, max_pivot) = u
            .diagonal()
            .iter()
            .fold((f64::INFINITY, 0.0_f64), |(lo, hi), &p| (lo.min(p.abs()), hi.max(p.abs())));
        let ratio = if max_pivot > 0.0 { min_pivot / max_pivot } else { 0.0 };
        if ratio < PIVOT_TOL {
            return Err(ReliabilityError::SingularMatrix { pivot: ratio });
        }
        let inverse = lu.try_inverse().ok_or(ReliabilityError::SingularMatrix { pivot: ratio })?;
        self.inverse = Some(from_dmatrix(&inverse));
        Ok(())
    }

    pub fn compute_transpose(&mut self) {
        self.transpose = Some(self.matrix.t().to_owned());
    }

    /// compute_square_root — symmetric `S` with `S·S = M` for a symmetric
    /// positive semi-definite `M`.
    ///
    /// Uses the eigen decomposition `M = QΛQᵀ`, `S = QΛ^{1/2}Qᵀ`. Tiny
    /// negative eigenvalues (round-off) are clamped to zero.
    ///
    /// Errors
    /// ------
    /// - `ReliabilityError::NotSquare` / `ReliabilityError::NotSymmetric`.
    /// - `ReliabilityError::NotPositiveSemiDefinite` with the offending
    ///   eigenvalue.
    pub fn compute_square_root(&mut self) -> ReliabilityResult<()> {
        require_square(&self.matrix)?;
        check_symmetric(&self.matrix)?;
        let eigen = to_dmatrix(&self.matrix).symmetric_eigen();
        let scale = eigen.eigenvalues.iter().fold(1.0_f64, |acc, l| acc.max(l.abs()));
        let mut roots = eigen.eigenvalues.clone();
        for lambda in roots.iter_mut() {
            if *lambda < -EIGEN_EPS * scale {
                return Err(ReliabilityError::NotPositiveSemiDefinite { eigenvalue: *lambda });
            }
            *lambda = lambda.max(0.0).sqrt();
        }
        let q = &eigen.eigenvectors;
        let root = q * DMatrix::from_diagonal(&roots) * q.transpose();
        self.square_root = Some(from_dmatrix(&root));
        Ok(())
    }

    pub fn compute_trace(&mut self) -> ReliabilityResult<()> {
        require_square(&self.matrix)?;
        self.trace = Some(self.matrix.diag().sum());
        Ok(())
    }

    /// Frobenius norm `sqrt(Σ mᵢⱼ²)`.
    pub fn compute_matrix_norm(&mut self) {
        self.matrix_norm = Some(self.matrix.iter().map(|v| v * v).sum::<f64>().sqrt());
    }

    // ---- Getters ----

    pub fn lower_cholesky(&self) -> ReliabilityResult<&Array2<f64>> {
        self.lower_cholesky
            .as_ref()
            .ok_or(ReliabilityError::NotComputed { product: "lower Cholesky factor" })
    }

    pub fn inverse_lower_cholesky(&self) -> ReliabilityResult<&Array2<f64>> {
        self.inverse_lower_cholesky
            .as_ref()
            .ok_or(ReliabilityError::NotComputed { product: "inverse lower Cholesky factor" })
    }

    pub fn inverse(&self) -> ReliabilityResult<&Array2<f64>> {
        self.inverse.as_ref().ok_or(ReliabilityError::NotComputed { product: "inverse" })
    }

    pub fn transpose(&self) -> ReliabilityResult<&Array2<f64>> {
        self.transpose.as_ref().ok_or(ReliabilityError::NotComputed { product: "transpose" })
    }

    pub fn square_root(&self) -> ReliabilityResult<&Array2<f64>> {
        self.square_root.as_ref().ok_or(ReliabilityError::NotComputed { product: "square root" })
    }

    pub fn trace(&self) -> ReliabilityResult<f64> {
        self.trace.ok_or(ReliabilityError::NotComputed { product: "trace" })
    }

    pub fn matrix_norm(&self) -> ReliabilityResult<f64> {
        self.matrix_norm.ok_or(ReliabilityError::NotComputed { product: "matrix norm" })
    }

    // ---- Helper methods ----

    fn cholesky(&self) -> ReliabilityResult<Cholesky<f64, nalgebra::Dyn>> {
        require_square(&self.matrix)?;
        check_symmetric(&self.matrix)?;
        Cholesky::new(to_dmatrix(&self.matrix)).ok_or(ReliabilityError::NotPositiveDefinite)
    }
}

/// Entry-wise symmetry check with relative tolerance [`SYMMETRY_TOL`].
///
/// Errors
/// ------
/// - `ReliabilityError::NotSymmetric` with the first offending `(row, col)`,
///   `row > col`.
pub fn check_symmetric(matrix: &Array2<f64>) -> ReliabilityResult<()> {
    require_square(matrix)?;
    for i in 0..matrix.nrows() {
        for j in 0..i {
            let (a, b) = (matrix[[i, j]], matrix[[j, i]]);
            let scale = a.abs().max(b.abs()).max(1.0);
            if (a - b).abs() > SYMMETRY_TOL * scale {
                return Err(ReliabilityError::NotSymmetric { row: i, col: j });
            }
        }
    }
    Ok(())
}

fn require_square(matrix: &Array2<f64>) -> ReliabilityResult<()> {
    let (rows, cols) = matrix.dim();
    if rows != cols {
        return Err(ReliabilityError::NotSquare { rows, cols });
    }
    Ok(())
}

fn validate_matrix(matrix: &Array2<f64>) -> ReliabilityResult<()> {
    if matrix.is_empty() {
        return Err(ReliabilityError::InvalidCount { n: 0, reason: "Matrix must be non-empty." });
    }
    for ((row, col), &value) in matrix.indexed_iter() {
        if !value.is_finite() {
            return Err(ReliabilityError::NonFiniteEntry { row, col, value });
        }
    }
    Ok(())
}

fn invert_lower(l: &DMatrix<f64>) -> ReliabilityResult<Array2<f64>> {
    let n = l.nrows();
    let inv = l
        .solve_lower_triangular(&DMatrix::identity(n, n))
        .ok_or(ReliabilityError::SingularMatrix { pivot: 0.0 })?;
    Ok(from_dmatrix(&inv))
}
