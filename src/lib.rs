//! # anafit
//!
//! `anafit` fits named parametric models `y = f(x; p1..pn)` to 2-D datasets
//! by nonlinear least squares and reports parameter uncertainties.
//!
//! The library provides:
//! - A compiler from definition strings (`lambda x, a, b : a*x+b ; (1, 1)`)
//!   to safe, whitelisted model functions
//! - A registry of built-in models plus a persisted catalog of custom ones
//! - Fits driven by a Levenberg-Marquardt solver, with covariance, standard
//!   errors and a one-sigma confidence band
//! - Per-dataset fit histories with undo
//!
//! ## Basic Usage
//!
//! ```
//! use anafit::{Dataset, Fit, FitHistory, FunctionRegistry};
//!
//! let registry = FunctionRegistry::in_memory();
//! let data = Dataset::from_points(&[(0.0, 5.1), (1.0, 6.9), (2.0, 9.0), (3.0, 11.1), (4.0, 12.9)]);
//!
//! let fit = Fit::new(&data, None, "ax+b", None, &registry).unwrap();
//! println!("{}", fit);
//!
//! let mut history = FitHistory::new();
//! history.record(fit);
//! assert!(history.last_fit().is_some());
//! ```

// Public modules
pub mod error;
pub mod expression;
pub mod fit;
pub mod history;
pub mod lm;
pub mod problem;
pub mod registry;
pub mod uncertainty;
pub mod utils;

// Re-exports for convenience
pub use error::{AnafitError, Result};
pub use expression::{compile, CompiledDefinition, FitFunction};
pub use fit::{ConfidenceBand, Dataset, Fit, FitRange, FitReport, ModelRef};
pub use history::{FitHistory, HistoryBook};
pub use lm::{LevenbergMarquardt, LmConfig};
pub use problem::Problem;
pub use registry::{Category, CatalogEvent, FunctionRegistry, JsonFileStore, ModelDefinition};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
