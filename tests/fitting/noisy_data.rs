//! Fits to noisy and partially missing data

use approx::assert_relative_eq;
use ndarray::Array1;
use specfit_rs::models::gaussian_fitter;
use specfit_rs::parinfo::ParInfoArrays;
use specfit_rs::{FitError, FitOptions, ModelFitter, ModelOptions, SpectralAxis};

use crate::test_helpers::{axis, gaussians, with_noise};

#[test]
fn test_noisy_gaussian_within_uncertainties() {
    let truth = [5.0, 1.0, 0.7];
    let sigma = 0.1;
    let x = axis(-4.0, 6.0, 201);
    let data = with_noise(&gaussians(&x, &truth), sigma, 42);
    let err = Array1::from_elem(x.len(), sigma);

    let mut fitter = gaussian_fitter(1).unwrap();
    let options = FitOptions::new().with_params(vec![4.0, 0.8, 1.0]);
    let result = fitter
        .fit(&SpectralAxis::new(x), &data, Some(&err), &options)
        .unwrap();

    for ((fitted, error), expected) in result.params.iter().zip(&result.perror).zip(truth.iter()) {
        assert!(*error > 0.0);
        assert!(
            (fitted - expected).abs() < 5.0 * error,
            "{} is more than 5 sigma from {} (sigma = {})",
            fitted,
            expected,
            error
        );
    }

    // Chi-squared per point is close to one for correctly sized errors
    let reduced = result.reduced_chi2();
    assert!(reduced > 0.7 && reduced < 1.3, "reduced chi2 = {}", reduced);
}

#[test]
fn test_errors_scale_with_data_uncertainty() {
    let truth = [5.0, 1.0, 0.7];
    let x = axis(-4.0, 6.0, 201);
    let data = gaussians(&x, &truth);
    let xax = SpectralAxis::new(x.clone());

    let mut fitter = gaussian_fitter(1).unwrap();
    let small = fitter
        .fit(&xax, &data, Some(&Array1::from_elem(x.len(), 0.1)), &FitOptions::default())
        .unwrap();
    let large = fitter
        .fit(&xax, &data, Some(&Array1::from_elem(x.len(), 0.2)), &FitOptions::default())
        .unwrap();

    for (a, b) in small.perror.iter().zip(large.perror.iter()) {
        assert_relative_eq!(b / a, 2.0, epsilon = 1e-4);
    }
}

#[test]
fn test_nan_and_inf_points_are_ignored() {
    let truth = [1.0, 0.0, 1.0];
    let x = axis(-5.0, 5.0, 101);
    let mut data = gaussians(&x, &truth);
    data[10] = f64::NAN;
    data[50] = f64::INFINITY;
    data[70] = f64::NEG_INFINITY;
    let snapshot = data.clone();

    let mut fitter = gaussian_fitter(1).unwrap();
    let options = FitOptions::new().with_params(vec![0.7, 0.4, 1.3]);
    let result = fitter.fit(&SpectralAxis::new(x), &data, None, &options).unwrap();

    assert!(result.chi2.is_finite());
    assert!(result.chi2 < 1e-12);
    assert_relative_eq!(result.params[0], 1.0, epsilon = 1e-6);
    assert_relative_eq!(result.params[1], 0.0, epsilon = 1e-6);
    assert_relative_eq!(result.params[2], 1.0, epsilon = 1e-6);

    // The caller's data are not modified
    assert!(data[10].is_nan());
    assert_eq!(data[50], f64::INFINITY);
    assert_eq!(data.len(), snapshot.len());
}

#[test]
fn test_nan_error_array_is_left_alone() {
    let x = axis(-5.0, 5.0, 51);
    let mut data = gaussians(&x, &[1.0, 0.0, 1.0]);
    data[0] = f64::NAN;
    let err = Array1::from_elem(51, 0.5);

    let mut fitter = gaussian_fitter(1).unwrap();
    fitter
        .fit(
            &SpectralAxis::new(x),
            &data,
            Some(&err),
            &FitOptions::new().with_params(vec![0.9, 0.1, 1.1]),
        )
        .unwrap();

    assert!(err.iter().all(|&e| e == 0.5));
}

#[test]
fn test_overflowing_model_fails_instead_of_converging() {
    let growth = |x: &Array1<f64>, p: &[f64], _: &ModelOptions| -> specfit_rs::Result<Array1<f64>> {
        Ok(x.mapv(|xi| (p[0] * xi).exp()))
    };
    let arrays = ParInfoArrays::new().with_values(vec![1.0]);
    let mut fitter = ModelFitter::new(growth, 1, &arrays).unwrap();

    let x = axis(0.0, 709.7827, 50);
    let data = x.mapv(|xi| (0.99 * xi).exp());
    let err = fitter
        .fit(&SpectralAxis::new(x), &data, None, &FitOptions::default())
        .unwrap_err();

    assert!(matches!(err, FitError::SolverFailure(_)), "{:?}", err);
    assert!(fitter.last_result().is_none());
    assert_eq!(fitter.parinfo()[0].value, 1.0);
}
