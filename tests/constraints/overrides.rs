//! Per-fit overrides and their persistence across calls

use approx::assert_relative_eq;
use ndarray::array;
use specfit_rs::models::gaussian_fitter;
use specfit_rs::{FitError, FitOptions, SpectralAxis};

use crate::test_helpers::{axis, gaussians};

#[test]
fn test_overrides_compound_across_calls() {
    let x = axis(-5.0, 5.0, 101);
    let data = gaussians(&x, &[1.0, 0.3, 1.0]);
    let xax = SpectralAxis::new(x);

    let mut fitter = gaussian_fitter(1).unwrap();
    fitter
        .fit(
            &xax,
            &data,
            None,
            &FitOptions::new()
                .with_params(vec![0.8, 0.0, 1.2])
                .with_fixed(vec![false, true, false]),
        )
        .unwrap();
    assert!(fitter.parinfo()[1].fixed);

    // No override on the second call: the center stays fixed at 0
    let result = fitter.fit(&xax, &data, None, &FitOptions::default()).unwrap();
    assert_eq!(result.params[1], 0.0);

    // Releasing it lets the center move to its true value
    let result = fitter
        .fit(
            &xax,
            &data,
            None,
            &FitOptions::new().with_fixed(vec![false, false, false]),
        )
        .unwrap();
    assert_relative_eq!(result.params[1], 0.3, epsilon = 1e-6);
}

#[test]
fn test_wrong_length_override_is_rejected() {
    let x = axis(-5.0, 5.0, 51);
    let data = gaussians(&x, &[1.0, 0.0, 1.0]);
    let mut fitter = gaussian_fitter(1).unwrap();
    let before = fitter.parinfo().clone();

    let err = fitter
        .fit(
            &SpectralAxis::new(x),
            &data,
            None,
            &FitOptions::new().with_limits(vec![[0.0, 1.0]; 2]),
        )
        .unwrap_err();

    assert!(matches!(err, FitError::Configuration(_)));
    assert_eq!(fitter.parinfo(), &before);
}

#[test]
fn test_wrong_length_guess_is_ignored() {
    let x = axis(-5.0, 5.0, 101);
    let data = gaussians(&x, &[1.0, 0.0, 1.0]);
    let mut fitter = gaussian_fitter(1).unwrap();

    let result = fitter
        .fit(
            &SpectralAxis::new(x),
            &data,
            None,
            &FitOptions::new().with_params(vec![100.0, 100.0]),
        )
        .unwrap();

    // The default starting point [1, 0, 1] was used and is already exact
    assert_eq!(result.niter, 0);
    assert_eq!(result.params, vec![1.0, 0.0, 1.0]);
}

#[test]
fn test_units_converted_on_private_copy() {
    // A line at 1.5 GHz fitted in MHz
    let xax = SpectralAxis::with_units(axis(1.0, 2.0, 101), "GHz");
    let data = gaussians(&xax.values.mapv(|v| v * 1000.0), &[1.0, 1500.0, 50.0]);

    let mut fitter = gaussian_fitter(1).unwrap().with_fitunits("MHz");
    let options = FitOptions::new().with_params(vec![0.8, 1480.0, 60.0]);
    let result = fitter.fit(&xax, &data, None, &options).unwrap();

    assert_relative_eq!(result.params[1], 1500.0, epsilon = 1e-6);
    assert_relative_eq!(result.params[2], 50.0, epsilon = 1e-6);
    assert_eq!(xax.units(), Some("GHz"));
    assert_relative_eq!(xax.values[0], 1.0);
    assert_relative_eq!(xax.values[100], 2.0);
}

#[test]
fn test_incompatible_units_fail() {
    let xax = SpectralAxis::with_units(array![1.0, 2.0, 3.0], "km/s");
    let mut fitter = gaussian_fitter(1).unwrap().with_fitunits("GHz");

    let err = fitter
        .fit(&xax, &array![0.0, 1.0, 0.0], None, &FitOptions::default())
        .unwrap_err();
    assert!(matches!(err, FitError::UnitConversion(_)));
}
