//! Parameter records saved to and loaded from JSON

use approx::assert_relative_eq;
use specfit_rs::models::gaussian_fitter;
use specfit_rs::{FitOptions, ParInfo, SpectralAxis};

use crate::test_helpers::{axis, gaussians};

#[test]
fn test_fitted_records_survive_a_file_round_trip() {
    let x = axis(-5.0, 5.0, 101);
    let data = gaussians(&x, &[1.2, -0.4, 0.9]);

    let mut fitter = gaussian_fitter(1).unwrap();
    fitter
        .fit(
            &SpectralAxis::new(x),
            &data,
            None,
            &FitOptions::new().with_tied(["", "", ""]),
        )
        .unwrap();

    let path = std::env::temp_dir().join(format!("specfit-parinfo-{}.json", std::process::id()));
    fitter.parinfo().save_json(&path).unwrap();
    let loaded = ParInfo::load_json(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded.names(), fitter.parinfo().names());
    for (a, b) in loaded.iter().zip(fitter.parinfo().iter()) {
        assert_eq!(a.n(), b.n());
        assert_relative_eq!(a.value, b.value, epsilon = 1e-12);
        assert_relative_eq!(a.error, b.error, epsilon = 1e-12);
        assert_eq!(a.limited, b.limited);
    }
}

#[test]
fn test_loaded_records_seed_a_new_fitter() {
    let json = r#"[
        {"n": 0, "value": 2.0, "parname": "AMPLITUDE0"},
        {"n": 1, "value": 0.1, "parname": "SHIFT0"},
        {"n": 2, "value": 1.0, "parname": "WIDTH0", "limited": [true, false]}
    ]"#;
    let loaded = ParInfo::from_json(json).unwrap();
    assert_eq!(loaded[2].limited, [true, false]);
    assert_eq!(loaded[0].step, 0.0);

    let x = axis(-5.0, 5.0, 101);
    let data = gaussians(&x, &[2.0, 0.0, 1.0]);
    let mut fitter = gaussian_fitter(1).unwrap();
    let result = fitter
        .fit(
            &SpectralAxis::new(x),
            &data,
            None,
            &FitOptions::new().with_params(loaded.values()),
        )
        .unwrap();

    assert_relative_eq!(result.params[0], 2.0, epsilon = 1e-6);
    assert_relative_eq!(result.params[1], 0.0, epsilon = 1e-6);
}
