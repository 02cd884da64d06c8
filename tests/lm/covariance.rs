//! Covariance of solver results.

use anafit::lm::LevenbergMarquardt;
use anafit::uncertainty::{calculate_correlation, covariance_from_jacobian, standard_errors_from_covariance};
use anafit::{Problem, Result};
use approx::assert_relative_eq;
use ndarray::{array, Array1};

struct Line {
    x: Array1<f64>,
    y: Array1<f64>,
}

impl Problem for Line {
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        Ok(&self.x * params[0] + params[1] - &self.y)
    }

    fn parameter_count(&self) -> usize {
        2
    }

    fn residual_count(&self) -> usize {
        self.x.len()
    }
}

#[test]
fn test_line_covariance_matches_closed_form() {
    let problem = Line {
        x: array![0.0, 1.0, 2.0, 3.0, 4.0],
        y: array![1.0, 3.2, 4.8, 7.1, 9.0],
    };
    let result = LevenbergMarquardt::new().minimize(&problem, array![1.0, 1.0]).unwrap();
    let covar = covariance_from_jacobian(&result.jacobian, result.cost).unwrap();

    // Ordinary least squares: var(a) = s^2 / Sxx, var(b) = s^2 (1/n + mean^2 / Sxx)
    let s2 = result.cost / 3.0;
    let sxx = 10.0;
    assert_relative_eq!(covar[[0, 0]], s2 / sxx, max_relative = 1e-5);
    assert_relative_eq!(covar[[1, 1]], s2 * (0.2 + 4.0 / sxx), max_relative = 1e-5);

    let errors = standard_errors_from_covariance(&covar);
    assert_relative_eq!(errors[0], (s2 / sxx).sqrt(), max_relative = 1e-5);

    let correl = calculate_correlation(&covar);
    assert!(correl[[0, 1]] < 0.0);
    assert_relative_eq!(correl[[0, 1]], correl[[1, 0]], max_relative = 1e-12);
}
