//! Step calculation for the Levenberg-Marquardt algorithm.
//!
//! This module provides functionality for computing the Levenberg-Marquardt step,
//! which blends the Gauss-Newton and gradient descent steps.

use ndarray::{Array1, Array2};

use crate::utils::matrix_convert::{nalgebra_vec_to_ndarray, ndarray_to_nalgebra, ndarray_vec_to_nalgebra};

/// Floor applied to the diagonal scaling so that a parameter the residuals
/// do not depend on still gets some damping.
const MIN_DIAGONAL: f64 = 1e-10;

/// Result of a Levenberg-Marquardt step calculation.
#[derive(Debug, Clone)]
pub struct StepResult {
    /// The calculated step vector
    pub step: Array1<f64>,

    /// Reduction of the sum of squares predicted by the linearized model
    pub predicted_reduction: f64,

    /// The damping parameter used to calculate the step
    pub lambda: f64,
}

/// Handles step calculation for the Levenberg-Marquardt algorithm.
pub struct LmStep;

impl LmStep {
    /// Calculates the Levenberg-Marquardt step.
    ///
    /// Solves `(JᵀJ + λ·D) δ = −Jᵀr` where `D` is the diagonal of `JᵀJ`
    /// (Marquardt scaling), using a Cholesky factorization.
    ///
    /// # Arguments
    ///
    /// * `jacobian` - The Jacobian matrix at the current position
    /// * `residuals` - The residuals at the current position
    /// * `lambda` - The damping parameter
    ///
    /// # Returns
    ///
    /// * The step, or `None` when the damped system is not positive definite
    pub fn calculate_step(
        jacobian: &Array2<f64>,
        residuals: &Array1<f64>,
        lambda: f64,
    ) -> Option<StepResult> {
        let j_t_j = jacobian.t().dot(jacobian);
        let j_t_r = jacobian.t().dot(residuals);

        let mut augmented = j_t_j;
        for i in 0..augmented.nrows() {
            augmented[[i, i]] += lambda * augmented[[i, i]].max(MIN_DIAGONAL);
        }

        let cholesky = ndarray_to_nalgebra(&augmented).cholesky()?;
        let rhs = -ndarray_vec_to_nalgebra(&j_t_r);
        let step = nalgebra_vec_to_ndarray(&cholesky.solve(&rhs));

        if step.iter().any(|v| !v.is_finite()) {
            return None;
        }

        let predicted_reduction = Self::predicted_reduction(jacobian, residuals, &step);

        Some(StepResult {
            step,
            predicted_reduction,
            lambda,
        })
    }

    /// `‖r‖² − ‖r + Jδ‖²`, the decrease of the linearized sum of squares.
    fn predicted_reduction(jacobian: &Array2<f64>, residuals: &Array1<f64>, step: &Array1<f64>) -> f64 {
        let linearized = residuals + &jacobian.dot(step);
        residuals.dot(residuals) - linearized.dot(&linearized)
    }
}
