//! Conversions between ndarray (used for data and results) and nalgebra
//! (used for decompositions).

use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};

/// Convert an ndarray matrix to a nalgebra matrix.
pub fn ndarray_to_nalgebra(a: &Array2<f64>) -> DMatrix<f64> {
    DMatrix::from_fn(a.nrows(), a.ncols(), |i, j| a[[i, j]])
}

/// Convert an ndarray vector to a nalgebra vector.
pub fn ndarray_vec_to_nalgebra(v: &Array1<f64>) -> DVector<f64> {
    DVector::from_iterator(v.len(), v.iter().copied())
}

/// Convert a nalgebra matrix to an ndarray matrix.
pub fn nalgebra_to_ndarray(m: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}

/// Convert a nalgebra vector to an ndarray vector.
pub fn nalgebra_vec_to_ndarray(v: &DVector<f64>) -> Array1<f64> {
    v.iter().copied().collect()
}
