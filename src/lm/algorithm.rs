//! Implementation of the Levenberg-Marquardt algorithm.
//!
//! This module contains the core implementation of the Levenberg-Marquardt algorithm
//! for nonlinear least-squares optimization.

use ndarray::{Array1, Array2};
use std::fmt;

use crate::error::{AnafitError, Result};
use crate::problem::Problem;
use crate::utils::finite_difference;

use super::config::LmConfig;
use super::convergence::{ConvergenceCriteria, ConvergenceStatus};
use super::step::LmStep;

/// Result of the Levenberg-Marquardt optimization.
#[derive(Debug, Clone)]
pub struct LmResult {
    /// Optimized parameter values
    pub params: Array1<f64>,

    /// Residuals at the solution
    pub residuals: Array1<f64>,

    /// Sum of squared residuals
    pub cost: f64,

    /// Number of accepted steps
    pub iterations: usize,

    /// Number of function evaluations
    pub func_evals: usize,

    /// Whether the optimization succeeded
    pub success: bool,

    /// Why the optimization stopped
    pub status: ConvergenceStatus,

    /// A message describing the result
    pub message: String,

    /// The Jacobian matrix at the returned parameters
    pub jacobian: Array2<f64>,
}

impl fmt::Display for LmResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Optimization Result:")?;
        writeln!(f, "  Success: {}", self.success)?;
        writeln!(f, "  Message: {}", self.message)?;
        writeln!(f, "  Cost: {:.6e}", self.cost)?;
        writeln!(f, "  Iterations: {}", self.iterations)?;
        writeln!(f, "  Function evaluations: {}", self.func_evals)?;
        writeln!(f, "  Parameters: {:?}", self.params)?;
        Ok(())
    }
}

/// The Levenberg-Marquardt optimizer.
///
/// The algorithm is deterministic: the same problem and starting point
/// always produce bit-identical results.
#[derive(Debug, Clone, Default)]
pub struct LevenbergMarquardt {
    /// Configuration options
    config: LmConfig,
}

impl LevenbergMarquardt {
    /// Create a new Levenberg-Marquardt optimizer with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new Levenberg-Marquardt optimizer with the given configuration.
    pub fn with_config(config: LmConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &LmConfig {
        &self.config
    }

    /// Set the maximum number of iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.config.max_iterations = max_iterations;
        self
    }

    /// Set the tolerance for change in residual norm.
    pub fn with_ftol(mut self, ftol: f64) -> Self {
        self.config.ftol = ftol;
        self
    }

    /// Set the tolerance for change in parameter values.
    pub fn with_xtol(mut self, xtol: f64) -> Self {
        self.config.xtol = xtol;
        self
    }

    /// Set the tolerance for the scaled gradient.
    pub fn with_gtol(mut self, gtol: f64) -> Self {
        self.config.gtol = gtol;
        self
    }

    /// Set the initial value for the damping parameter.
    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.config.initial_lambda = lambda;
        self
    }

    /// Set the finite-difference step.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.config.epsilon = epsilon;
        self
    }

    /// Minimize the sum of squared residuals for the given problem.
    ///
    /// # Arguments
    ///
    /// * `problem` - The problem to solve
    /// * `initial_params` - Initial guess for the parameter values
    ///
    /// # Returns
    ///
    /// * `Result<LmResult>` - The result of the optimization. A run that stops
    ///   without converging is still `Ok`, with `success == false`; errors are
    ///   reserved for invalid inputs and failing residual evaluations.
    pub fn minimize<P: Problem>(&self, problem: &P, initial_params: Array1<f64>) -> Result<LmResult> {
        let n_params = problem.parameter_count();
        if initial_params.len() != n_params {
            return Err(AnafitError::DimensionMismatch(format!(
                "Expected {} parameters, got {}",
                n_params,
                initial_params.len()
            )));
        }
        if problem.residual_count() == 0 {
            return Err(AnafitError::InvalidInput(
                "cannot minimize a problem without residuals".to_string(),
            ));
        }

        let criteria = ConvergenceCriteria::from(&self.config);
        let mut params = initial_params;
        let mut lambda = self.config.initial_lambda;

        let mut residuals = problem.eval(&params)?;
        let mut cost = sum_of_squares(&residuals);
        let mut func_evals = 1;
        let mut iterations = 0;

        if !cost.is_finite() {
            let jacobian = Array2::zeros((residuals.len(), n_params));
            return Ok(LmResult {
                params,
                residuals,
                cost,
                iterations,
                func_evals,
                success: false,
                status: ConvergenceStatus::NumericalError,
                message: "the model is not finite at the initial parameters".to_string(),
                jacobian,
            });
        }

        loop {
            let jacobian = self.jacobian(problem, &params, &residuals)?;
            func_evals += n_params;

            if jacobian.iter().any(|v| !v.is_finite()) {
                return Ok(self.finish(
                    params,
                    residuals,
                    cost,
                    iterations,
                    func_evals,
                    ConvergenceStatus::NumericalError,
                    jacobian,
                ));
            }

            let status = criteria.check_gradient(scaled_gradient(&jacobian, &residuals));
            if status.is_terminated() {
                return Ok(self.finish(params, residuals, cost, iterations, func_evals, status, jacobian));
            }

            // Retry with growing damping until a step lowers the cost
            let status = loop {
                let step = match LmStep::calculate_step(&jacobian, &residuals, lambda) {
                    Some(step) => step,
                    None => {
                        lambda *= self.config.lambda_up_factor;
                        if lambda > self.config.max_lambda {
                            break ConvergenceStatus::DampingSaturated;
                        }
                        continue;
                    }
                };

                let new_params = &params + &step.step;
                let new_residuals = problem.eval(&new_params)?;
                let new_cost = sum_of_squares(&new_residuals);
                func_evals += 1;

                if new_cost.is_finite() && new_cost < cost {
                    iterations += 1;
                    let status = criteria.check(&params, &new_params, cost, new_cost, iterations);
                    log::debug!(
                        "lm iteration {}: cost {:.6e} -> {:.6e}, lambda {:.1e}",
                        iterations,
                        cost,
                        new_cost,
                        lambda
                    );

                    params = new_params;
                    residuals = new_residuals;
                    cost = new_cost;
                    lambda = (lambda * self.config.lambda_down_factor).max(self.config.min_lambda);
                    break status;
                }

                // The linearized model itself sees nothing left to gain: this is
                // the minimum, up to rounding in the cost.
                if step.predicted_reduction <= self.config.ftol * cost {
                    break ConvergenceStatus::FunctionValueConvergence;
                }
                if super::convergence::relative_step(&params, &new_params) <= self.config.xtol {
                    break ConvergenceStatus::ParameterConvergence;
                }

                lambda *= self.config.lambda_up_factor;
                if lambda > self.config.max_lambda {
                    break ConvergenceStatus::DampingSaturated;
                }
            };

            if status.is_terminated() {
                let jacobian = self.jacobian(problem, &params, &residuals)?;
                func_evals += n_params;
                return Ok(self.finish(params, residuals, cost, iterations, func_evals, status, jacobian));
            }
        }
    }

    fn jacobian<P: Problem>(
        &self,
        problem: &P,
        params: &Array1<f64>,
        residuals: &Array1<f64>,
    ) -> Result<Array2<f64>> {
        if problem.has_custom_jacobian() {
            problem.jacobian(params)
        } else {
            finite_difference::jacobian_at(problem, params, residuals, Some(self.config.epsilon))
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn finish(
        &self,
        params: Array1<f64>,
        residuals: Array1<f64>,
        cost: f64,
        iterations: usize,
        func_evals: usize,
        status: ConvergenceStatus,
        jacobian: Array2<f64>,
    ) -> LmResult {
        let message = match status {
            ConvergenceStatus::MaxIterationsReached => format!(
                "Maximum iterations ({}) reached",
                self.config.max_iterations
            ),
            _ => status.description().to_string(),
        };
        LmResult {
            params,
            residuals,
            cost,
            iterations,
            func_evals,
            success: status.is_converged(),
            status,
            message,
            jacobian,
        }
    }
}

fn sum_of_squares(residuals: &Array1<f64>) -> f64 {
    residuals.iter().map(|r| r.powi(2)).sum()
}

/// Largest cosine between the residual vector and a Jacobian column.
///
/// Zero at an exact fit, and for columns that are identically zero.
fn scaled_gradient(jacobian: &Array2<f64>, residuals: &Array1<f64>) -> f64 {
    let r_norm = residuals.dot(residuals).sqrt();
    if r_norm == 0.0 {
        return 0.0;
    }
    jacobian
        .columns()
        .into_iter()
        .map(|column| {
            let c_norm = column.dot(&column).sqrt();
            if c_norm == 0.0 {
                0.0
            } else {
                (column.dot(residuals) / (c_norm * r_norm)).abs()
            }
        })
        .fold(0.0, f64::max)
}
