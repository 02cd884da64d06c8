//! Least-squares problem for fitting a compiled function to a dataset.

use ndarray::Array1;

use crate::error::{AnafitError, Result};
use crate::expression::FitFunction;
use crate::problem::Problem;

use super::dataset::Dataset;

/// Residuals `f(x_i, p) - y_i` over a dataset.
pub(crate) struct CurveProblem<'a> {
    function: &'a FitFunction,
    data: &'a Dataset,
}

impl<'a> CurveProblem<'a> {
    pub(crate) fn new(function: &'a FitFunction, data: &'a Dataset) -> Self {
        Self { function, data }
    }
}

impl Problem for CurveProblem<'_> {
    fn eval(&self, params: &Array1<f64>) -> Result<Array1<f64>> {
        if params.len() != self.function.arity() {
            return Err(AnafitError::DimensionMismatch(format!(
                "Expected {} parameters, got {}",
                self.function.arity(),
                params.len()
            )));
        }
        let params = params.to_vec();
        Ok(self.function.eval_many(self.data.x(), &params) - self.data.y())
    }

    fn parameter_count(&self) -> usize {
        self.function.arity()
    }

    fn residual_count(&self) -> usize {
        self.data.len()
    }
}
