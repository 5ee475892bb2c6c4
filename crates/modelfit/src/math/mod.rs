//! Row-major matrix storage backing the feature table.
//!
//! `Array2` keeps the data in one contiguous buffer so rows can be sliced
//! and gathered cheaply for fold splits and bootstrap samples, and converts
//! to a smartcore `DenseMatrix` at the model boundary.
pub mod matrix;

pub use matrix::Array2;
