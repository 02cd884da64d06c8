//! Convergence criteria for optimization algorithms.
//!
//! This module defines the criteria used to determine when an optimization
//! algorithm has converged to a solution.

use ndarray::Array1;

use super::config::LmConfig;

/// Possible convergence states for an optimization algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvergenceStatus {
    /// The algorithm is still running.
    Running,

    /// The algorithm has converged due to a small parameter change.
    ParameterConvergence,

    /// The algorithm has converged due to a small function value change.
    FunctionValueConvergence,

    /// The algorithm has converged due to a small gradient.
    GradientConvergence,

    /// The algorithm has terminated due to reaching the maximum number of iterations.
    MaxIterationsReached,

    /// No step reduced the cost before lambda reached its maximum.
    DampingSaturated,

    /// The algorithm has terminated due to a numerical error.
    NumericalError,
}

impl ConvergenceStatus {
    /// Returns true if the optimization has terminated (either converged or failed).
    pub fn is_terminated(&self) -> bool {
        !matches!(self, ConvergenceStatus::Running)
    }

    /// Returns true if the optimization has converged.
    pub fn is_converged(&self) -> bool {
        matches!(
            self,
            ConvergenceStatus::ParameterConvergence
                | ConvergenceStatus::FunctionValueConvergence
                | ConvergenceStatus::GradientConvergence
        )
    }

    /// Returns a description of the convergence status.
    pub fn description(&self) -> &'static str {
        match self {
            ConvergenceStatus::Running => "Optimization is still running",
            ConvergenceStatus::ParameterConvergence => "Converged: small parameter change",
            ConvergenceStatus::FunctionValueConvergence => "Converged: small function value change",
            ConvergenceStatus::GradientConvergence => "Converged: small gradient",
            ConvergenceStatus::MaxIterationsReached => "Terminated: maximum iterations reached",
            ConvergenceStatus::DampingSaturated => {
                "Terminated: no step decreased the cost before the damping reached its maximum"
            }
            ConvergenceStatus::NumericalError => "Terminated: numerical error",
        }
    }
}

/// Criteria for determining when an optimization algorithm has converged.
#[derive(Debug, Clone)]
pub struct ConvergenceCriteria {
    /// Tolerance for change in parameter values.
    pub xtol: f64,

    /// Tolerance for change in function value.
    pub ftol: f64,

    /// Tolerance for the scaled gradient.
    pub gtol: f64,

    /// Maximum number of iterations.
    pub max_iterations: usize,
}

impl Default for ConvergenceCriteria {
    fn default() -> Self {
        Self::from(&LmConfig::default())
    }
}

impl From<&LmConfig> for ConvergenceCriteria {
    fn from(config: &LmConfig) -> Self {
        Self {
            xtol: config.xtol,
            ftol: config.ftol,
            gtol: config.gtol,
            max_iterations: config.max_iterations,
        }
    }
}

impl ConvergenceCriteria {
    /// Creates a new set of convergence criteria with the given tolerances.
    pub fn new(xtol: f64, ftol: f64, gtol: f64, max_iterations: usize) -> Self {
        Self {
            xtol,
            ftol,
            gtol,
            max_iterations,
        }
    }

    /// Checks the scaled gradient before a step is attempted.
    pub fn check_gradient(&self, scaled_gradient: f64) -> ConvergenceStatus {
        if scaled_gradient <= self.gtol {
            ConvergenceStatus::GradientConvergence
        } else {
            ConvergenceStatus::Running
        }
    }

    /// Checks whether the optimization has converged after an accepted step.
    ///
    /// Convergence takes precedence over the iteration budget, so the final
    /// allowed step may still converge.
    ///
    /// # Arguments
    ///
    /// * `params` - The parameter values before the step
    /// * `new_params` - The parameter values after the step
    /// * `cost` - The function value before the step
    /// * `new_cost` - The function value after the step
    /// * `iterations` - The number of accepted steps including this one
    pub fn check(
        &self,
        params: &Array1<f64>,
        new_params: &Array1<f64>,
        cost: f64,
        new_cost: f64,
        iterations: usize,
    ) -> ConvergenceStatus {
        if relative_step(params, new_params) <= self.xtol {
            return ConvergenceStatus::ParameterConvergence;
        }

        let cost_change = (cost - new_cost).abs() / cost.max(f64::MIN_POSITIVE);
        if cost_change <= self.ftol {
            return ConvergenceStatus::FunctionValueConvergence;
        }

        if iterations >= self.max_iterations {
            return ConvergenceStatus::MaxIterationsReached;
        }

        ConvergenceStatus::Running
    }
}

/// Largest parameter change relative to the parameter magnitude (at least 1).
pub fn relative_step(params: &Array1<f64>, new_params: &Array1<f64>) -> f64 {
    new_params
        .iter()
        .zip(params.iter())
        .map(|(a, b)| (a - b).abs() / b.abs().max(1.0))
        .fold(0.0, f64::max)
}
