//! Noisy data for each built-in family, generated with seeded generators.

use anafit::{Fit, FunctionRegistry};
use approx::assert_relative_eq;
use ndarray::Array1;

use crate::test_helpers::noisy_dataset;

#[test]
fn test_power_law() {
    let registry = FunctionRegistry::in_memory();
    let data = noisy_dataset(|x| 1.5 * x.powf(1.7), Array1::linspace(0.5, 5.0, 40), 0.02, 1);

    let fit = Fit::new(&data, None, "ax^n", None, &registry).unwrap();
    let popt = fit.optimal_params().unwrap();
    assert_relative_eq!(popt[0], 1.5, epsilon = 0.02);
    assert_relative_eq!(popt[1], 1.7, epsilon = 0.02);
}

#[test]
fn test_exponential_decay_with_offset() {
    let registry = FunctionRegistry::in_memory();
    let data = noisy_dataset(
        |x| 4.0 * (x / -2.0).exp() + 1.0,
        Array1::linspace(0.0, 10.0, 60),
        0.01,
        2,
    );

    let fit = Fit::new(&data, None, "a*exp(x/b) + c", Some(vec![3.0, -1.0, 0.5]), &registry).unwrap();
    let popt = fit.optimal_params().unwrap();
    assert_relative_eq!(popt[0], 4.0, epsilon = 0.05);
    assert_relative_eq!(popt[1], -2.0, epsilon = 0.05);
    assert_relative_eq!(popt[2], 1.0, epsilon = 0.02);
}

#[test]
fn test_saturation() {
    let registry = FunctionRegistry::in_memory();
    let data = noisy_dataset(
        |x| 3.0 * (1.0 - (-x / 1.5).exp()),
        Array1::linspace(0.0, 8.0, 50),
        0.01,
        3,
    );

    let fit = Fit::new(&data, None, "a(1-exp(-x/b))", None, &registry).unwrap();
    let popt = fit.optimal_params().unwrap();
    assert_relative_eq!(popt[0], 3.0, epsilon = 0.02);
    assert_relative_eq!(popt[1], 1.5, epsilon = 0.02);

    let band = fit.confidence_band().unwrap();
    assert_eq!(band.x.len(), 50);
    assert!(band.upper.iter().zip(band.lower.iter()).all(|(u, l)| u.is_finite() && l.is_finite()));
}

#[test]
fn test_std_errors_shrink_with_less_noise() {
    let registry = FunctionRegistry::in_memory();
    let x = Array1::linspace(0.0, 10.0, 30);
    let noisy = noisy_dataset(|x| 2.0 * x + 5.0, x.clone(), 2.0, 9);
    let quiet = noisy_dataset(|x| 2.0 * x + 5.0, x, 0.02, 9);

    let noisy_fit = Fit::new(&noisy, None, "ax+b", None, &registry).unwrap();
    let quiet_fit = Fit::new(&quiet, None, "ax+b", None, &registry).unwrap();
    assert!(quiet_fit.std_errors().unwrap()[0] < noisy_fit.std_errors().unwrap()[0]);
}
