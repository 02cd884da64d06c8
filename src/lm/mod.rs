//! Levenberg-Marquardt algorithm implementation.
//!
//! This module provides the damped least-squares solver that backs every fit.
//! The implementation is deterministic and configurable through [`LmConfig`].

pub mod algorithm;
pub mod config;
pub mod convergence;
pub mod step;

// Re-export key types
pub use algorithm::{LevenbergMarquardt, LmResult};
pub use config::LmConfig;
pub use convergence::{ConvergenceCriteria, ConvergenceStatus};
pub use step::{LmStep, StepResult};
