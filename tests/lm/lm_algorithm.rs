//! Integration tests for the Levenberg-Marquardt algorithm.

use anafit::lm::{ConvergenceStatus, LevenbergMarquardt, LmConfig};
use anafit::{AnafitError, Problem, Result};
use approx::assert_relative_eq;
use ndarray::{array, Array1, Array2};

/// Test Problem: Simple 1D linear function f(x) = a*x + b
struct LinearProblem {
    x_data: Array1<f64>,
    y_data: Array1<f64>,
}

impl Problem for LinearProblem {
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        if params.len() != 2 {
            return Err(AnafitError::DimensionMismatch(format!(
                "Expected 2 parameters, got {}",
                params.len()
            )));
        }
        Ok(&self.x_data * params[0] + params[1] - &self.y_data)
    }

    fn parameter_count(&self) -> usize {
        2
    }

    fn residual_count(&self) -> usize {
        self.x_data.len()
    }

    fn jacobian(&self, _params: &Array1<f64>) -> Result<Array2<f64>> {
        let mut jac = Array2::ones((self.x_data.len(), 2));
        jac.column_mut(0).assign(&self.x_data);
        Ok(jac)
    }

    fn has_custom_jacobian(&self) -> bool {
        true
    }
}

/// Test Problem: Rosenbrock function written as residuals
///   r1 = 1 - x, r2 = 10(y - x^2)
struct RosenbrockProblem;

impl Problem for RosenbrockProblem {
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        let (x, y) = (params[0], params[1]);
        Ok(array![1.0 - x, 10.0 * (y - x.powi(2))])
    }

    fn parameter_count(&self) -> usize {
        2
    }

    fn residual_count(&self) -> usize {
        2
    }

    fn jacobian(&self, params: &Array1<f64>) -> Result<Array2<f64>> {
        Ok(array![[-1.0, 0.0], [-20.0 * params[0], 10.0]])
    }

    fn has_custom_jacobian(&self) -> bool {
        true
    }
}

/// Test Problem: a * exp(-b * x), Jacobian by finite differences
struct ExponentialProblem {
    x_data: Array1<f64>,
    y_data: Array1<f64>,
}

impl Problem for ExponentialProblem {
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        let (a, b) = (params[0], params[1]);
        Ok(self.x_data.mapv(|x| a * (-b * x).exp()) - &self.y_data)
    }

    fn parameter_count(&self) -> usize {
        2
    }

    fn residual_count(&self) -> usize {
        self.x_data.len()
    }
}

#[test]
fn test_linear_fitting() {
    // y = 3x + 2 + noise
    let problem = LinearProblem {
        x_data: array![0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
        y_data: array![2.1, 4.9, 8.05, 10.8, 14.1, 17.0],
    };

    let lm = LevenbergMarquardt::new();
    let result = lm.minimize(&problem, array![1.0, 1.0]).unwrap();

    assert!(result.success);
    assert_relative_eq!(result.params[0], 3.0, epsilon = 0.1);
    assert_relative_eq!(result.params[1], 2.0, epsilon = 0.1);
    assert!(result.cost < 0.1);
}

#[test]
fn test_rosenbrock_optimization() {
    let config = LmConfig {
        max_iterations: 200,
        ..LmConfig::default()
    };
    let lm = LevenbergMarquardt::with_config(config);

    // Start from the classic point far from the minimum at (1, 1)
    let result = lm.minimize(&RosenbrockProblem, array![-1.2, 1.0]).unwrap();

    assert!(result.success, "{}", result.message);
    assert_relative_eq!(result.params[0], 1.0, epsilon = 1e-4);
    assert_relative_eq!(result.params[1], 1.0, epsilon = 1e-4);
    assert!(result.cost < 1e-8);
}

#[test]
fn test_exponential_fitting() {
    // y = 2 * exp(-0.5 * x) + noise
    let problem = ExponentialProblem {
        x_data: array![0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0],
        y_data: array![2.02, 1.67, 1.21, 0.98, 0.81, 0.62, 0.45, 0.39, 0.29],
    };

    let result = LevenbergMarquardt::new()
        .minimize(&problem, array![1.0, 0.1])
        .unwrap();

    assert!(result.success);
    assert_relative_eq!(result.params[0], 2.0, epsilon = 0.1);
    assert_relative_eq!(result.params[1], 0.5, epsilon = 0.1);
    assert!(result.cost < 0.01);
}

#[test]
fn test_bad_initial_guess() {
    // Exact data: y = 3x + 2
    let problem = LinearProblem {
        x_data: array![0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
        y_data: array![2.0, 5.0, 8.0, 11.0, 14.0, 17.0],
    };

    let result = LevenbergMarquardt::new()
        .minimize(&problem, array![-1000.0, 500.0])
        .unwrap();

    assert!(result.success);
    assert_relative_eq!(result.params[0], 3.0, epsilon = 1e-6);
    assert_relative_eq!(result.params[1], 2.0, epsilon = 1e-6);
}

#[test]
fn test_iteration_budget_is_reported() {
    let problem = ExponentialProblem {
        x_data: array![0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5, 4.0],
        y_data: array![2.02, 1.67, 1.21, 0.98, 0.81, 0.62, 0.45, 0.39, 0.29],
    };

    let result = LevenbergMarquardt::new()
        .with_max_iterations(2)
        .minimize(&problem, array![1.0, 0.1])
        .unwrap();

    assert!(!result.success);
    assert_eq!(result.status, ConvergenceStatus::MaxIterationsReached);
    assert_eq!(result.iterations, 2);
    assert!(result.to_string().contains("Success: false"));
}

#[test]
fn test_builders_update_config() {
    let lm = LevenbergMarquardt::new()
        .with_ftol(1e-6)
        .with_xtol(1e-7)
        .with_gtol(1e-8)
        .with_lambda(1.0)
        .with_epsilon(1e-6);

    let config = lm.config();
    assert_eq!(config.ftol, 1e-6);
    assert_eq!(config.xtol, 1e-7);
    assert_eq!(config.gtol, 1e-8);
    assert_eq!(config.initial_lambda, 1.0);
    assert_eq!(config.epsilon, 1e-6);
    assert_eq!(config.max_iterations, LmConfig::default().max_iterations);
}
