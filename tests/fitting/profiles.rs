//! Fits of the built-in line profiles and of user-supplied closures

use approx::assert_relative_eq;
use ndarray::Array1;
use specfit_rs::models::{
    gaussian_fitter, lorentzian, lorentzian_fitter, n_voigt, voigt_fitter,
};
use specfit_rs::parinfo::ParInfoArrays;
use specfit_rs::{FitOptions, ModelFitter, ModelOptions, SpectralAxis};

use crate::test_helpers::{axis, gaussians};

#[test]
fn test_gaussian_recovers_true_parameters() {
    let x = axis(-5.0, 5.0, 101);
    let data = gaussians(&x, &[1.0, 0.0, 1.0]);

    let mut fitter = gaussian_fitter(1).unwrap();
    let options = FitOptions::new().with_params(vec![0.8, 0.3, 1.4]);
    let result = fitter.fit(&SpectralAxis::new(x), &data, None, &options).unwrap();

    assert!(result.status > 0);
    assert_relative_eq!(result.params[0], 1.0, epsilon = 1e-6);
    assert_relative_eq!(result.params[1], 0.0, epsilon = 1e-6);
    assert_relative_eq!(result.params[2], 1.0, epsilon = 1e-6);
    assert!(result.chi2 < 1e-12);
    assert_eq!(result.dof(), 98);

    // The model curve matches the data
    for (m, d) in result.model.iter().zip(data.iter()) {
        assert_relative_eq!(m, d, epsilon = 1e-6);
    }

    // Records carry the best fit
    assert_relative_eq!(fitter.parinfo()[0].value, 1.0, epsilon = 1e-6);
    assert!(fitter.parinfo().errors().iter().all(|&e| e > 0.0));
}

#[test]
fn test_two_gaussians() {
    let truth = [1.0, -2.0, 0.5, 0.6, 2.5, 0.8];
    let x = axis(-6.0, 6.0, 241);
    let data = gaussians(&x, &truth);

    let mut fitter = gaussian_fitter(2).unwrap();
    let options = FitOptions::new().with_params(vec![0.8, -1.8, 0.6, 0.5, 2.3, 1.0]);
    let result = fitter.fit(&SpectralAxis::new(x), &data, None, &options).unwrap();

    for (fitted, expected) in result.params.iter().zip(truth.iter()) {
        assert_relative_eq!(fitted, expected, epsilon = 1e-6);
    }
}

#[test]
fn test_lorentzian() {
    let x = axis(-4.0, 6.0, 201);
    let data = x.mapv(|xi| lorentzian(xi, 3.0, 1.0, 0.4));

    let mut fitter = lorentzian_fitter(1).unwrap();
    let options = FitOptions::new().with_params(vec![2.0, 0.8, 0.6]);
    let result = fitter.fit(&SpectralAxis::new(x), &data, None, &options).unwrap();

    assert_relative_eq!(result.params[0], 3.0, epsilon = 1e-6);
    assert_relative_eq!(result.params[1], 1.0, epsilon = 1e-6);
    assert_relative_eq!(result.params[2], 0.4, epsilon = 1e-6);
}

#[test]
fn test_pseudo_voigt() {
    let truth = [2.0, 0.0, 0.5, 0.3];
    let x = axis(-5.0, 5.0, 201);
    let data = n_voigt(&x, &truth, &ModelOptions::new()).unwrap();

    let mut fitter = voigt_fitter(1).unwrap();
    let options = FitOptions::new().with_params(vec![1.5, 0.1, 0.6, 0.2]);
    let result = fitter.fit(&SpectralAxis::new(x), &data, None, &options).unwrap();

    assert!(result.chi2 < 1e-10);
    for (fitted, expected) in result.params.iter().zip(truth.iter()) {
        assert_relative_eq!(fitted, expected, epsilon = 1e-3);
    }
}

#[test]
fn test_closure_model() {
    // Exponential decay with a constant background
    let decay = |x: &Array1<f64>, p: &[f64], _: &ModelOptions| -> specfit_rs::Result<Array1<f64>> {
        Ok(x.mapv(|xi| p[0] * (-xi / p[1]).exp() + p[2]))
    };

    let x = axis(0.0, 10.0, 60);
    let data = x.mapv(|xi| 4.0 * (-xi / 1.5).exp() + 0.5);

    let arrays = ParInfoArrays::new()
        .with_names(["NORM", "TAU", "BACKGROUND"])
        .with_values(vec![1.0, 1.0, 0.0])
        .with_limits(vec![[0.0, 0.0], [0.01, 0.0], [0.0, 0.0]])
        .with_limited(vec![[false, false], [true, false], [false, false]]);
    let mut fitter = ModelFitter::new(decay, 3, &arrays).unwrap();

    let result = fitter
        .fit(&SpectralAxis::new(x), &data, None, &FitOptions::default())
        .unwrap();

    assert_relative_eq!(result.params[0], 4.0, epsilon = 1e-6);
    assert_relative_eq!(result.params[1], 1.5, epsilon = 1e-6);
    assert_relative_eq!(result.params[2], 0.5, epsilon = 1e-6);
    assert_eq!(result.parnames, vec!["NORM", "TAU", "BACKGROUND"]);
}

#[test]
fn test_refit_starts_from_previous_best_fit() {
    let x = axis(-5.0, 5.0, 101);
    let data = gaussians(&x, &[1.5, 0.2, 0.8]);
    let xax = SpectralAxis::new(x);

    let mut fitter = gaussian_fitter(1).unwrap();
    let first = fitter.fit(&xax, &data, None, &FitOptions::default()).unwrap();
    let second = fitter.fit(&xax, &data, None, &FitOptions::default()).unwrap();

    assert!(second.niter <= first.niter);
    for (a, b) in first.params.iter().zip(second.params.iter()) {
        assert_relative_eq!(a, b, epsilon = 1e-8);
    }
}
