//! Annotation labels and result reporting

use ndarray::Array1;
use specfit_rs::models::gaussian_fitter;
use specfit_rs::{FitError, FitOptions, SpectralAxis};

use crate::test_helpers::{axis, gaussians};

fn fitted_gaussian() -> specfit_rs::ModelFitter {
    let x = axis(-5.0, 5.0, 101);
    let data = gaussians(&x, &[2.0, 0.5, 1.0]);
    let mut fitter = gaussian_fitter(1).unwrap();
    fitter
        .fit(
            &SpectralAxis::new(x),
            &data,
            None,
            &FitOptions::new().with_params(vec![1.5, 0.3, 1.2]),
        )
        .unwrap();
    fitter
}

#[test]
fn test_default_symbols() {
    let fitter = fitted_gaussian();
    let labels = fitter.annotations(None).unwrap();

    assert_eq!(labels.len(), 3);
    assert!(labels[0].starts_with("$A(0)$=     2 $\\pm$ "), "{}", labels[0]);
    assert!(labels[1].starts_with("$v(0)$=   0.5 $\\pm$ "), "{}", labels[1]);
    assert!(labels[2].starts_with("$\\sigma(0)$=     1 $\\pm$ "), "{}", labels[2]);
}

#[test]
fn test_symbol_override() {
    let fitter = fitted_gaussian();
    let labels = fitter.annotations(Some(&["T", "x"][..])).unwrap();

    assert_eq!(labels.len(), 2);
    assert!(labels[0].starts_with("$T(0)$="));
    assert!(labels[1].starts_with("$x(0)$="));
}

#[test]
fn test_annotations_need_a_fit() {
    let fitter = gaussian_fitter(1).unwrap();
    assert!(matches!(fitter.annotations(None), Err(FitError::State(_))));
}

#[test]
fn test_peak_index_beyond_fitted_vector() {
    // Peak 1 of symbol 0 sits at index 0 + 1 * 3, past the three fitted values
    let x = axis(-5.0, 5.0, 101);
    let data = gaussians(&x, &[2.0, 0.5, 1.0]);
    let mut fitter = gaussian_fitter(1).unwrap();
    fitter
        .fit(
            &SpectralAxis::new(x),
            &data,
            None,
            &FitOptions::new().with_npeaks(2),
        )
        .unwrap();

    assert_eq!(fitter.npeaks(), 2);
    assert!(matches!(fitter.annotations(None), Err(FitError::State(_))));
}

#[test]
fn test_result_display() {
    let fitter = fitted_gaussian();
    let text = fitter.last_result().unwrap().to_string();

    assert!(text.contains("AMPLITUDE0"));
    assert!(text.contains("SHIFT0"));
    assert!(text.contains("WIDTH0"));
    assert!(text.contains("DOF: 98"));
}

#[test]
fn test_result_serializes() {
    let fitter = fitted_gaussian();
    let json = fitter.last_result().unwrap().to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["parnames"][0], "AMPLITUDE0");
    assert_eq!(value["npoints"], 101);
    let model: Array1<f64> = serde_json::from_value(value["model"].clone()).unwrap();
    assert_eq!(model.len(), 101);
}

#[test]
fn test_multi_peak_helper_labels_first_block() {
    let x = axis(-6.0, 6.0, 241);
    let data = gaussians(&x, &[2.0, -2.0, 0.5, 1.0, 2.5, 0.8]);
    let mut fitter = gaussian_fitter(2).unwrap();
    let result = fitter
        .fit(
            &SpectralAxis::new(x),
            &data,
            None,
            &FitOptions::new().with_params(vec![1.8, -1.8, 0.6, 0.9, 2.3, 1.0]),
        )
        .unwrap();

    assert_eq!(fitter.npeaks(), 1);
    assert_eq!(result.params.len(), 6);
    let labels = fitter.annotations(None).unwrap();
    assert_eq!(labels.len(), 3);
    assert!(labels[0].starts_with("$A(0)$=     2 $\\pm$ "), "{}", labels[0]);
    assert!(labels[1].starts_with("$v(0)$=    -2 $\\pm$ "), "{}", labels[1]);
}
