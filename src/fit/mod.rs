//! Fits of a model to a dataset.
//!
//! A [`Fit`] snapshots a dataset, restricts it to an optional x range,
//! compiles its model and runs the Levenberg-Marquardt solver. The result
//! carries the optimal parameters, their covariance and standard errors.
//!
//! ```
//! use anafit::fit::{Dataset, Fit};
//! use anafit::registry::FunctionRegistry;
//!
//! let registry = FunctionRegistry::in_memory();
//! let data = Dataset::from_points(&[(0.0, 1.1), (1.0, 2.9), (2.0, 5.2), (3.0, 6.9)]);
//! let fit = Fit::new(&data, None, "ax+b", None, &registry).unwrap();
//!
//! let popt = fit.optimal_params().unwrap();
//! assert!((popt[0] - 2.0).abs() < 0.2);
//! ```

mod dataset;
mod problem;

pub use dataset::{Dataset, FitRange};

use ndarray::{Array1, Array2};
use serde::Serialize;
use std::fmt;

use crate::error::{AnafitError, Result};
use crate::expression::{compile, format_tuple, CompiledDefinition, FitFunction};
use crate::lm::{LevenbergMarquardt, LmConfig};
use crate::registry::FunctionRegistry;
use crate::uncertainty::{covariance_from_jacobian, standard_errors_from_covariance};

use problem::CurveProblem;

/// How a fit names its model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ModelRef {
    /// A registry name such as `ax+b`
    Named(String),
    /// A full definition string such as `lambda x, a : a*x ; (1,)`
    Literal(String),
}

impl ModelRef {
    /// Text containing `;` is a literal definition, anything else a name.
    pub fn parse(text: &str) -> Self {
        if text.contains(';') {
            ModelRef::Literal(text.to_string())
        } else {
            ModelRef::Named(text.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ModelRef::Named(text) | ModelRef::Literal(text) => text,
        }
    }

    fn resolve(&self, registry: &FunctionRegistry) -> Result<CompiledDefinition> {
        match self {
            ModelRef::Named(name) => registry.lookup(name)?.compile(),
            ModelRef::Literal(definition) => compile(definition),
        }
    }

    /// The name, or the function clause of a literal definition.
    fn label(&self) -> &str {
        match self {
            ModelRef::Named(name) => name,
            ModelRef::Literal(definition) => definition.split(';').next().unwrap_or_default().trim(),
        }
    }
}

impl From<&str> for ModelRef {
    fn from(text: &str) -> Self {
        ModelRef::parse(text)
    }
}

impl From<String> for ModelRef {
    fn from(text: String) -> Self {
        ModelRef::parse(&text)
    }
}

impl fmt::Display for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Curves through `popt + sigma` and `popt - sigma`.
///
/// First order only: parameter correlation is ignored and `upper` is not
/// guaranteed to lie above `lower`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceBand {
    pub x: Array1<f64>,
    pub upper: Array1<f64>,
    pub lower: Array1<f64>,
}

/// Serializable snapshot of a fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitReport {
    pub model: String,
    pub parameter_names: Vec<String>,
    pub range: Option<FitRange>,
    pub n_points: usize,
    pub initial_params: Vec<f64>,
    pub optimal_params: Option<Vec<f64>>,
    pub std_errors: Option<Vec<f64>>,
    pub covariance: Option<Vec<Vec<f64>>>,
    pub cost: Option<f64>,
    pub iterations: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
struct Regression {
    optimal_params: Array1<f64>,
    covariance: Array2<f64>,
    std_errors: Array1<f64>,
    cost: f64,
    iterations: usize,
}

/// A model fitted to a dataset.
#[derive(Debug, Clone)]
pub struct Fit {
    source: Dataset,
    range: Option<FitRange>,
    xydata: Dataset,
    model_ref: ModelRef,
    function: FitFunction,
    initial_params: Vec<f64>,
    config: LmConfig,
    regression: Option<Regression>,
}

impl Fit {
    /// Resolve the model, filter the data and fit.
    ///
    /// `params` overrides the model's default initial parameters.
    pub fn new(
        dataset: &Dataset,
        range: Option<FitRange>,
        model_ref: impl Into<ModelRef>,
        params: Option<Vec<f64>>,
        registry: &FunctionRegistry,
    ) -> Result<Self> {
        let mut fit = Self::prepare(dataset, range, model_ref, params, registry)?;
        fit.fit()?;
        Ok(fit)
    }

    /// Everything [`Fit::new`] does except the regression.
    pub fn prepare(
        dataset: &Dataset,
        range: Option<FitRange>,
        model_ref: impl Into<ModelRef>,
        params: Option<Vec<f64>>,
        registry: &FunctionRegistry,
    ) -> Result<Self> {
        let model_ref = model_ref.into();
        let compiled = model_ref.resolve(registry)?;
        let initial_params = match params {
            Some(params) => {
                check_arity(&compiled.function, &params)?;
                params
            }
            None => compiled.initial_params,
        };
        let xydata = filter_nonempty(dataset, range)?;

        Ok(Self {
            source: dataset.clone(),
            range,
            xydata,
            model_ref,
            function: compiled.function,
            initial_params,
            config: LmConfig::default(),
            regression: None,
        })
    }

    /// Use `config` for subsequent regressions.
    pub fn with_config(mut self, config: LmConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the regression from the initial parameters.
    ///
    /// On failure the previous result, if any, is kept.
    pub fn fit(&mut self) -> Result<()> {
        match self.regress() {
            Ok(regression) => {
                log::info!(
                    "fitted {} on {} points in {} iterations",
                    self.model_ref,
                    self.xydata.len(),
                    regression.iterations
                );
                self.regression = Some(regression);
                Ok(())
            }
            Err(e) => {
                log::warn!("fit of {} failed: {}", self.model_ref, e);
                Err(e)
            }
        }
    }

    fn regress(&self) -> Result<Regression> {
        let (xmin, xmax) = match self.range {
            Some(range) => (range.xmin, range.xmax),
            None => (f64::NEG_INFINITY, f64::INFINITY),
        };
        if self.xydata.is_empty() {
            return Err(AnafitError::EmptyFitRange { xmin, xmax });
        }
        let (m, n) = (self.xydata.len(), self.function.arity());
        if m <= n {
            return Err(AnafitError::SingularCovariance(format!(
                "{} data points leave no degrees of freedom for {} parameters",
                m, n
            )));
        }

        let problem = CurveProblem::new(&self.function, &self.xydata);
        let solver = LevenbergMarquardt::with_config(self.config.clone());
        let result = solver.minimize(&problem, Array1::from(self.initial_params.clone()))?;
        if !result.success {
            return Err(AnafitError::FitDidNotConverge(result.message));
        }

        let covariance = covariance_from_jacobian(&result.jacobian, result.cost)?;
        let std_errors = standard_errors_from_covariance(&covariance);
        Ok(Regression {
            optimal_params: result.params,
            covariance,
            std_errors,
            cost: result.cost,
            iterations: result.iterations,
        })
    }

    /// Restrict the fit to `range` and refit.
    pub fn set_range(&mut self, range: Option<FitRange>) -> Result<()> {
        let xydata = filter_nonempty(&self.source, range)?;
        self.try_update(|fit| {
            fit.range = range;
            fit.xydata = xydata;
        })
    }

    /// Switch to another model, starting from its default parameters, and refit.
    pub fn set_model_ref(
        &mut self,
        model_ref: impl Into<ModelRef>,
        registry: &FunctionRegistry,
    ) -> Result<()> {
        let model_ref = model_ref.into();
        let compiled = model_ref.resolve(registry)?;
        self.try_update(|fit| {
            fit.model_ref = model_ref;
            fit.function = compiled.function;
            fit.initial_params = compiled.initial_params;
        })
    }

    /// Change the initial parameters and refit.
    pub fn set_initial_params(&mut self, params: Vec<f64>) -> Result<()> {
        check_arity(&self.function, &params)?;
        self.try_update(|fit| fit.initial_params = params)
    }

    /// Change the solver configuration and refit.
    pub fn set_solver_config(&mut self, config: LmConfig) -> Result<()> {
        self.try_update(|fit| fit.config = config)
    }

    /// Apply `change` to a copy, refit it and keep it only on success.
    fn try_update<F: FnOnce(&mut Fit)>(&mut self, change: F) -> Result<()> {
        let mut candidate = self.clone();
        change(&mut candidate);
        candidate.regression = None;
        candidate.fit()?;
        *self = candidate;
        Ok(())
    }

    /// The dataset the fit was created from.
    pub fn source(&self) -> &Dataset {
        &self.source
    }

    /// The points actually fitted.
    pub fn xydata(&self) -> &Dataset {
        &self.xydata
    }

    pub fn range(&self) -> Option<FitRange> {
        self.range
    }

    pub fn model_ref(&self) -> &ModelRef {
        &self.model_ref
    }

    pub fn function(&self) -> &FitFunction {
        &self.function
    }

    pub fn initial_params(&self) -> &[f64] {
        &self.initial_params
    }

    pub fn config(&self) -> &LmConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        self.regression.is_some()
    }

    pub fn optimal_params(&self) -> Option<&Array1<f64>> {
        self.regression.as_ref().map(|r| &r.optimal_params)
    }

    pub fn covariance(&self) -> Option<&Array2<f64>> {
        self.regression.as_ref().map(|r| &r.covariance)
    }

    pub fn std_errors(&self) -> Option<&Array1<f64>> {
        self.regression.as_ref().map(|r| &r.std_errors)
    }

    /// Sum of squared residuals at the optimum.
    pub fn cost(&self) -> Option<f64> {
        self.regression.as_ref().map(|r| r.cost)
    }

    /// The fitted model evaluated at the fitted x values.
    pub fn fitted_curve(&self) -> Option<Array1<f64>> {
        let popt = self.optimal_params()?.to_vec();
        Some(self.function.eval_many(self.xydata.x(), &popt))
    }

    /// The one-sigma band around the fitted curve.
    pub fn confidence_band(&self) -> Option<ConfidenceBand> {
        let regression = self.regression.as_ref()?;
        let up = (&regression.optimal_params + &regression.std_errors).to_vec();
        let down = (&regression.optimal_params - &regression.std_errors).to_vec();
        let x = self.xydata.x().clone();
        Some(ConfidenceBand {
            upper: self.function.eval_many(&x, &up),
            lower: self.function.eval_many(&x, &down),
            x,
        })
    }

    /// Annotation text: `Fit <model> :` then `value +/- error` per parameter.
    pub fn fit_info(&self) -> Option<String> {
        let regression = self.regression.as_ref()?;
        let mut info = format!("Fit {} :", self.model_ref.label());
        for (value, error) in regression
            .optimal_params
            .iter()
            .zip(regression.std_errors.iter())
        {
            info.push_str(&format!("\n{:.2} +/- {:.2}", value, error));
        }
        Some(info)
    }

    /// Multi-line human-readable report.
    pub fn summary(&self) -> String {
        let xrange = match self.xydata.x_bounds() {
            Some((lo, hi)) => format!("[{:.1}, {:.1}]", lo, hi),
            None => "None".to_string(),
        };
        let coeff = self.optimal_params().map(format_array);
        let uncertainty = self.std_errors().map(format_array);
        [
            format!("Fitting function : {}", self.model_ref),
            format!("Xrange : {}", xrange),
            format!("Initialising parameters : {}", format_tuple(&self.initial_params)),
            format!("Coeff. : {}", coeff.as_deref().unwrap_or("None")),
            format!("Uncertainty: {}", uncertainty.as_deref().unwrap_or("None")),
        ]
        .join("\n")
    }

    pub fn report(&self) -> FitReport {
        let regression = self.regression.as_ref();
        FitReport {
            model: self.model_ref.to_string(),
            parameter_names: self.function.param_names().to_vec(),
            range: self.range,
            n_points: self.xydata.len(),
            initial_params: self.initial_params.clone(),
            optimal_params: regression.map(|r| r.optimal_params.to_vec()),
            std_errors: regression.map(|r| r.std_errors.to_vec()),
            covariance: regression.map(|r| r.covariance.outer_iter().map(|row| row.to_vec()).collect()),
            cost: regression.map(|r| r.cost),
            iterations: regression.map(|r| r.iterations),
        }
    }
}

impl fmt::Display for Fit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

fn check_arity(function: &FitFunction, params: &[f64]) -> Result<()> {
    if params.len() != function.arity() {
        return Err(AnafitError::DimensionMismatch(format!(
            "Expected {} parameters, got {}",
            function.arity(),
            params.len()
        )));
    }
    Ok(())
}

fn filter_nonempty(dataset: &Dataset, range: Option<FitRange>) -> Result<Dataset> {
    let xydata = dataset.filter(range);
    match range {
        Some(range) if xydata.is_empty() => Err(AnafitError::EmptyFitRange {
            xmin: range.xmin,
            xmax: range.xmax,
        }),
        None if xydata.is_empty() => Err(AnafitError::InvalidInput(
            "cannot fit an empty dataset".to_string(),
        )),
        _ => Ok(xydata),
    }
}

fn format_array(values: &Array1<f64>) -> String {
    let items: Vec<String> = values.iter().map(|v| format!("{:.6}", v)).collect();
    format!("[{}]", items.join(", "))
}
