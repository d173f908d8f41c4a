//! linalg::bridge — copies between `ndarray` and `nalgebra` containers.
//!
//! The engine stores vectors and matrices as `ndarray` arrays and hands them
//! to `nalgebra` only for factorizations and eigen decompositions. These
//! helpers perform the element-wise copies in both directions; they never
//! validate shape or finiteness.
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};

/// Copy an `ndarray` matrix into a freshly allocated `DMatrix`.
///
/// Parameters
/// ----------
/// - `matrix`: `&Array2<f64>`
///   Source matrix of any shape.
///
/// Returns
/// -------
/// `DMatrix<f64>`
///   Matrix with identical shape and entries.
///
/// Notes
/// -----
/// - `DMatrix` is column-major while `Array2` defaults to row-major, so the
///   copy is done entry by entry rather than through a raw slice.
pub fn to_dmatrix(matrix: &Array2<f64>) -> DMatrix<f64> {
    let (rows, cols) = matrix.dim();
    DMatrix::from_fn(rows, cols, |i, j| matrix[[i, j]])
}

/// Copy a `DMatrix` back into an `ndarray` matrix.
pub fn from_dmatrix(matrix: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((matrix.nrows(), matrix.ncols()), |(i, j)| matrix[(i, j)])
}

pub fn to_dvector(vector: &Array1<f64>) -> DVector<f64> {
    DVector::from_iterator(vector.len(), vector.iter().copied())
}

pub fn from_dvector(vector: &DVector<f64>) -> Array1<f64> {
    vector.iter().copied().collect()
}
