//! # Uncertainty Calculation
//!
//! This module provides functionality for calculating uncertainties in parameter
//! estimates from nonlinear least-squares optimization results:
//!
//! - Covariance matrix estimation from Jacobian matrices
//! - Standard error calculation for parameter estimates
//! - Correlation between parameters

mod covariance;

pub use covariance::{
    calculate_correlation, calculate_covariance, covariance_from_jacobian,
    standard_errors_from_covariance,
};
