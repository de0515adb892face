//! Limits, fixed flags and tie expressions under the default solver

use approx::assert_relative_eq;
use ndarray::Array1;
use specfit_rs::models::{gaussian_fitter, n_gaussian};
use specfit_rs::parinfo::ParInfoArrays;
use specfit_rs::{FitError, FitOptions, ModelFitter, ModelOptions, SpectralAxis};

use crate::test_helpers::{axis, gaussians};

#[test]
fn test_fixed_parameter_keeps_exact_value() {
    let x = axis(-5.0, 5.0, 101);
    let data = gaussians(&x, &[1.0, 0.0, 1.0]);

    let mut fitter = gaussian_fitter(1).unwrap();
    let options = FitOptions::new()
        .with_params(vec![0.5, 0.25, 1.3])
        .with_fixed(vec![false, true, false]);
    let result = fitter.fit(&SpectralAxis::new(x), &data, None, &options).unwrap();

    assert_eq!(result.params[1], 0.25);
    assert_eq!(fitter.parinfo()[1].value, 0.25);
    assert_eq!(result.perror[1], 0.0);
    assert!(result.chi2 > 0.0);
}

#[test]
fn test_limited_parameter_stays_in_bounds() {
    let x = axis(-5.0, 5.0, 101);
    let data = gaussians(&x, &[1.0, 0.0, 1.0]);

    let mut fitter = gaussian_fitter(1).unwrap();
    let options = FitOptions::new()
        .with_params(vec![0.5, 0.0, 0.5])
        .with_limits(vec![[0.0, 0.0], [0.0, 0.0], [0.2, 0.8]])
        .with_limited(vec![[false, false], [false, false], [true, true]]);
    let result = fitter.fit(&SpectralAxis::new(x), &data, None, &options).unwrap();

    assert!(result.params[2] >= 0.2 && result.params[2] <= 0.8);
    assert_relative_eq!(result.params[2], 0.8, epsilon = 1e-8);
}

#[test]
fn test_tied_parameters_follow_expression() {
    // Two lines whose second center sits 3 units from the first and whose
    // widths are shared
    let truth = [1.0, -1.0, 0.6, 0.5, 2.0, 0.6];
    let x = axis(-5.0, 6.0, 221);
    let data = gaussians(&x, &truth);

    let mut fitter = gaussian_fitter(2).unwrap();
    let options = FitOptions::new()
        .with_params(vec![0.8, -0.8, 0.8, 0.4, 0.0, 0.0])
        .with_tied(["", "", "", "", "p[1] + 3", "WIDTH0"]);
    let result = fitter.fit(&SpectralAxis::new(x), &data, None, &options).unwrap();

    assert_relative_eq!(result.params[4], result.params[1] + 3.0, epsilon = 1e-12);
    assert_relative_eq!(result.params[5], result.params[2], epsilon = 1e-12);
    for (fitted, expected) in result.params.iter().zip(truth.iter()) {
        assert_relative_eq!(fitted, expected, epsilon = 1e-6);
    }
    assert_eq!(result.perror[4], 0.0);
    assert_eq!(result.perror[5], 0.0);
}

#[test]
fn test_start_outside_limits_fails() {
    let x = axis(-5.0, 5.0, 51);
    let data = gaussians(&x, &[1.0, 0.0, 1.0]);

    let mut fitter = gaussian_fitter(1).unwrap();
    let before = fitter.parinfo().clone();
    let options = FitOptions::new().with_params(vec![1.0, 0.0, -1.0]);
    let err = fitter
        .fit(&SpectralAxis::new(x), &data, None, &options)
        .unwrap_err();

    assert!(matches!(err, FitError::SolverFailure(_)));
    // Only the pre-solve guess was stored; no fit outcome was written
    assert_eq!(fitter.parinfo().values(), vec![1.0, 0.0, -1.0]);
    assert_eq!(fitter.parinfo().errors(), before.errors());
    assert!(fitter.last_result().is_none());
}

#[test]
fn test_everything_fixed_fails() {
    let x = axis(-5.0, 5.0, 51);
    let data = gaussians(&x, &[1.0, 0.0, 1.0]);
    let arrays = ParInfoArrays::new()
        .with_values(vec![1.0, 0.0, 1.0])
        .with_fixed(vec![true, true, true]);
    let mut fitter = ModelFitter::new(n_gaussian, 3, &arrays).unwrap();

    match fitter.fit(&SpectralAxis::new(x), &data, None, &FitOptions::default()) {
        Err(FitError::SolverFailure(message)) => assert_eq!(message, "No free parameters"),
        other => panic!("Expected SolverFailure, got {:?}", other),
    }
}

#[test]
fn test_unknown_tie_name_fails() {
    let x = axis(-5.0, 5.0, 51);
    let data = gaussians(&x, &[1.0, 0.0, 1.0]);
    let mut fitter = gaussian_fitter(1).unwrap();

    let options = FitOptions::new().with_tied(["", "", "WIDTH7 * 2"]);
    let err = fitter
        .fit(&SpectralAxis::new(x), &data, None, &options)
        .unwrap_err();
    assert!(matches!(err, FitError::SolverFailure(_)));
}

#[test]
fn test_tie_undefined_at_a_bound_only_rejects_the_step() {
    // The slope is driven toward its lower bound of 0, where `1 / p[0]`
    // has no value; the fit must settle inside the interval instead
    let line = |x: &Array1<f64>, p: &[f64], _: &ModelOptions| -> specfit_rs::Result<Array1<f64>> {
        Ok(x.mapv(|xi| p[0] * xi + p[1]))
    };
    let arrays = ParInfoArrays::new()
        .with_values(vec![1.0, 1.0])
        .with_limits(vec![[0.0, 10.0], [0.0, 0.0]])
        .with_limited(vec![[true, true], [false, false]])
        .with_tied(["", "1 / p[0]"]);
    let mut fitter = ModelFitter::new(line, 2, &arrays).unwrap();

    let x = axis(0.0, 9.0, 10);
    let data = x.mapv(|xi| -xi);
    let result = fitter
        .fit(&SpectralAxis::new(x), &data, None, &FitOptions::default())
        .unwrap();

    assert!(result.params[0] > 0.0);
    assert_relative_eq!(result.params[1], 1.0 / result.params[0], epsilon = 1e-12);
    assert!(result.chi2.is_finite());
}
