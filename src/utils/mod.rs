//! Utility functions and helpers for the solver.

pub mod finite_difference;
pub mod matrix_convert;

pub use matrix_convert::{
    nalgebra_to_ndarray, nalgebra_vec_to_ndarray, ndarray_to_nalgebra, ndarray_vec_to_nalgebra,
};
