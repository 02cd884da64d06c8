//! # Covariance Matrix Calculations
//!
//! This module provides functions for calculating and manipulating covariance
//! matrices from Jacobian matrices in nonlinear least-squares optimization.

use ndarray::{Array1, Array2};

use crate::error::{AnafitError, Result};
use crate::utils::matrix_convert::ndarray_to_nalgebra;

/// Calculate the parameter covariance of a least-squares solution.
///
/// Uses the `curve_fit` convention
///   covar = inv(J^T * J) * SSR / (m - n)
/// where `m` is the number of residuals, `n` the number of parameters and
/// `SSR` the sum of squared residuals at the solution.
///
/// Fails with `SingularCovariance` when there are no degrees of freedom
/// (`m <= n`) or when `J^T * J` is numerically singular.
pub fn covariance_from_jacobian(jacobian: &Array2<f64>, cost: f64) -> Result<Array2<f64>> {
    let (m, n) = jacobian.dim();
    if m <= n {
        return Err(AnafitError::SingularCovariance(format!(
            "{} data points leave no degrees of freedom for {} parameters",
            m, n
        )));
    }
    let redchi = cost / (m - n) as f64;
    calculate_covariance(jacobian, redchi)
}

/// Calculate covariance matrix from Jacobian matrix.
///
/// For nonlinear least-squares problems, the covariance matrix is estimated as:
///   covar = redchi * inv(J^T * J)
/// where:
///   - J is the Jacobian matrix
///   - redchi is the reduced chi-square (chi^2 / dof)
///
/// The inverse is formed from the singular value decomposition of `J`, so
/// `J^T * J` is never built explicitly. A singular value below
/// `eps * max(m, n) * s_max` makes the matrix singular.
pub fn calculate_covariance(jacobian: &Array2<f64>, redchi: f64) -> Result<Array2<f64>> {
    let (m, n) = jacobian.dim();
    if m < n || n == 0 {
        return Err(AnafitError::SingularCovariance(format!(
            "a {}x{} Jacobian has no full column rank",
            m, n
        )));
    }

    let svd = ndarray_to_nalgebra(jacobian).svd(false, true);
    let v_t = svd.v_t.ok_or_else(|| {
        AnafitError::SingularCovariance("singular value decomposition failed".to_string())
    })?;
    let singular_values = svd.singular_values;

    let s_max = singular_values.iter().cloned().fold(0.0, f64::max);
    let threshold = f64::EPSILON * m.max(n) as f64 * s_max;
    if !s_max.is_finite() || singular_values.iter().any(|&s| s <= threshold) {
        return Err(AnafitError::SingularCovariance(
            "J^T J is singular at the optimum".to_string(),
        ));
    }

    let mut covar = Array2::zeros((n, n));
    for i in 0..n {
        for k in 0..n {
            covar[[i, k]] = (0..singular_values.len())
                .map(|l| v_t[(l, i)] * v_t[(l, k)] / singular_values[l].powi(2))
                .sum::<f64>()
                * redchi;
        }
    }

    Ok(covar)
}

/// Calculate correlation matrix from covariance matrix.
///
/// The correlation matrix is calculated as:
///   correl[i,j] = covar[i,j] / sqrt(covar[i,i] * covar[j,j])
pub fn calculate_correlation(covar: &Array2<f64>) -> Array2<f64> {
    let n = covar.nrows();
    let mut correl = Array2::zeros((n, n));

    for i in 0..n {
        for j in 0..n {
            if i == j {
                correl[[i, j]] = 1.0;
            } else {
                let denom = (covar[[i, i]] * covar[[j, j]]).sqrt();
                if denom > 0.0 {
                    correl[[i, j]] = covar[[i, j]] / denom;
                }
            }
        }
    }

    correl
}

/// Extract standard errors from the covariance matrix.
///
/// Standard errors are the square roots of the diagonal elements
/// of the covariance matrix.
pub fn standard_errors_from_covariance(covar: &Array2<f64>) -> Array1<f64> {
    covar.diag().mapv(|v| if v > 0.0 { v.sqrt() } else { 0.0 })
}
