//! types — shared numeric aliases.
//!
//! Purpose
//! -------
//! Centralize the vector and matrix aliases used across the engine so the
//! rest of the crate can speak in terms of physical space, standard normal
//! space, and derivatives rather than raw `ndarray` generics.
//!
//! Conventions
//! -----------
//! - Every vector has one entry per random variable, in ascending tag order
//!   of the reliability domain.
//! - `Hessian` is dense and square with that same dimension.
use ndarray::{Array1, Array2};

/// Realization of the random variables in physical (x) space.
pub type XSpace = Array1<f64>;

/// Point in uncorrelated standard normal (u) space.
pub type USpace = Array1<f64>;

/// Gradient of the limit-state function, in x- or u-space.
pub type Grad = Array1<f64>;

/// Dense Hessian of the limit-state function.
pub type Hessian = Array2<f64>;
