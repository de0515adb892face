//! Built-in multi-peak line profiles.
//!
//! Each model sums `npeaks` copies of a single-peak profile. The parameter
//! vector is a concatenation of per-peak blocks, so the peak count is
//! derived from its length:
//!
//! | Model | Block |
//! |---|---|
//! | [`n_gaussian`] | `[amplitude, center, sigma]` |
//! | [`n_lorentzian`] | `[amplitude, center, gamma]` |
//! | [`n_voigt`] | `[amplitude, center, sigma, gamma]` |
//!
//! The `*_fitter` helpers build a [`ModelFitter`] around these models with
//! parameter names and non-negative widths.

pub mod profiles;

use ndarray::Array1;

use crate::error::{FitError, Result};
use crate::fitter::ModelFitter;
use crate::model::ModelOptions;
use crate::parinfo::ParInfoArrays;

pub use profiles::{gaussian, lorentzian, pseudo_voigt, pseudo_voigt_shape};

/// Number of parameters per Gaussian or Lorentzian peak
pub const THREE_PARAMETER_BLOCK: usize = 3;

/// Number of parameters per Voigt peak
pub const VOIGT_BLOCK: usize = 4;

fn sum_of_peaks<F>(x: &Array1<f64>, params: &[f64], block: usize, model: &str, profile: F) -> Result<Array1<f64>>
where
    F: Fn(f64, &[f64]) -> f64,
{
    if params.is_empty() || params.len() % block != 0 {
        return Err(FitError::DimensionMismatch(format!(
            "{} expects a multiple of {} parameters, got {}",
            model,
            block,
            params.len()
        )));
    }

    Ok(x.mapv(|xi| params.chunks(block).map(|peak| profile(xi, peak)).sum()))
}

/// Sum of Gaussians, one `[amplitude, center, sigma]` block per peak.
pub fn n_gaussian(x: &Array1<f64>, params: &[f64], _options: &ModelOptions) -> Result<Array1<f64>> {
    sum_of_peaks(x, params, THREE_PARAMETER_BLOCK, "n_gaussian", |xi, p| {
        gaussian(xi, p[0], p[1], p[2])
    })
}

/// Sum of Lorentzians, one `[amplitude, center, gamma]` block per peak.
pub fn n_lorentzian(x: &Array1<f64>, params: &[f64], _options: &ModelOptions) -> Result<Array1<f64>> {
    sum_of_peaks(x, params, THREE_PARAMETER_BLOCK, "n_lorentzian", |xi, p| {
        lorentzian(xi, p[0], p[1], p[2])
    })
}

/// Sum of pseudo-Voigt profiles, one `[amplitude, center, sigma, gamma]`
/// block per peak.
pub fn n_voigt(x: &Array1<f64>, params: &[f64], _options: &ModelOptions) -> Result<Array1<f64>> {
    sum_of_peaks(x, params, VOIGT_BLOCK, "n_voigt", |xi, p| {
        pseudo_voigt(xi, p[0], p[1], p[2], p[3])
    })
}

/// Construction arrays for `npeaks` blocks of the given widths.
fn peak_arrays(npeaks: usize, width_names: &[&str]) -> ParInfoArrays {
    let block = 2 + width_names.len();
    let mut names = Vec::with_capacity(npeaks * block);
    let mut values = Vec::with_capacity(npeaks * block);
    let mut limited = Vec::with_capacity(npeaks * block);

    for peak in 0..npeaks {
        names.push(format!("AMPLITUDE{}", peak));
        names.push(format!("SHIFT{}", peak));
        values.extend([1.0, 0.0]);
        limited.extend([[false, false], [false, false]]);
        for width in width_names {
            names.push(format!("{}{}", width, peak));
            values.push(1.0);
            limited.push([true, false]);
        }
    }

    ParInfoArrays::new()
        .with_names(names)
        .with_values(values)
        .with_limits(vec![[0.0, 0.0]; npeaks * block])
        .with_limited(limited)
}

/// A fitter for `npeaks` Gaussians.
///
/// Parameters are named `AMPLITUDE<i>`, `SHIFT<i>`, `WIDTH<i>`; every width
/// is limited below at zero.
///
/// The returned fitter has `npars = 3 * npeaks` but keeps `npeaks() == 1`,
/// so [`ModelFitter::annotations`] labels only the first peak's block. All
/// peaks are still fitted and reported in the result and the records.
pub fn gaussian_fitter(npeaks: usize) -> Result<ModelFitter> {
    ModelFitter::new(
        n_gaussian,
        npeaks * THREE_PARAMETER_BLOCK,
        &peak_arrays(npeaks, &["WIDTH"]),
    )
}

/// A fitter for `npeaks` Lorentzians, named like [`gaussian_fitter`].
///
/// As there, `npeaks()` stays 1 and annotations cover the first peak only.
pub fn lorentzian_fitter(npeaks: usize) -> Result<ModelFitter> {
    ModelFitter::new(
        n_lorentzian,
        npeaks * THREE_PARAMETER_BLOCK,
        &peak_arrays(npeaks, &["WIDTH"]),
    )
}

/// A fitter for `npeaks` pseudo-Voigt profiles.
///
/// Parameters are named `AMPLITUDE<i>`, `SHIFT<i>`, `GWIDTH<i>`, `LWIDTH<i>`.
/// `npars` is `4 * npeaks` while `npeaks()` stays 1, so annotations label
/// the first peak only.
pub fn voigt_fitter(npeaks: usize) -> Result<ModelFitter> {
    ModelFitter::new(n_voigt, npeaks * VOIGT_BLOCK, &peak_arrays(npeaks, &["GWIDTH", "LWIDTH"]))
        .map(|fitter| fitter.with_shortvarnames(["A", "v", "\\sigma", "\\gamma"]))
}
