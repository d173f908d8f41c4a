//! linalg — dense matrix utilities backed by `nalgebra`.
//!
//! [`MatrixOperations`] holds one matrix and its lazily computed products
//! (Cholesky factor, inverse, square root, ...). [`bridge`] copies between the
//! `ndarray` containers used throughout the crate and `nalgebra`.
pub mod bridge;
pub mod matrix_operations;

pub use matrix_operations::{MatrixOperations, check_symmetric};
