//! Single-peak line profiles.
//!
//! Every profile is normalized to its peak height: evaluated at `center`, it
//! returns `amplitude`.

/// 2 * sqrt(2 * ln 2), the ratio of a Gaussian's FWHM to its sigma
pub const GAUSSIAN_FWHM_FACTOR: f64 = 2.354_820_045_030_949;

/// Gaussian profile.
///
/// f(x) = amplitude * exp(-(x - center)² / (2 * sigma²))
pub fn gaussian(x: f64, amplitude: f64, center: f64, sigma: f64) -> f64 {
    let dx = x - center;
    amplitude * (-dx * dx / (2.0 * sigma * sigma)).exp()
}

/// Lorentzian profile with half width at half maximum `gamma`.
///
/// f(x) = amplitude / (1 + ((x - center) / gamma)²)
pub fn lorentzian(x: f64, amplitude: f64, center: f64, gamma: f64) -> f64 {
    let u = (x - center) / gamma;
    amplitude / (1.0 + u * u)
}

/// Total FWHM and Lorentzian fraction of the Thompson-Cox-Hastings
/// pseudo-Voigt approximation.
///
/// # Arguments
///
/// * `sigma` - Gaussian standard deviation
/// * `gamma` - Lorentzian half width at half maximum
///
/// # Returns
///
/// * `(fwhm, eta)` where `eta` is the Lorentzian mixing fraction
pub fn pseudo_voigt_shape(sigma: f64, gamma: f64) -> (f64, f64) {
    let fg = GAUSSIAN_FWHM_FACTOR * sigma.abs();
    let fl = 2.0 * gamma.abs();

    let fwhm = (fg.powi(5)
        + 2.69269 * fg.powi(4) * fl
        + 2.42843 * fg.powi(3) * fl.powi(2)
        + 4.47163 * fg.powi(2) * fl.powi(3)
        + 0.07842 * fg * fl.powi(4)
        + fl.powi(5))
    .powf(0.2);

    if fwhm == 0.0 {
        return (0.0, 0.0);
    }

    let ratio = fl / fwhm;
    let eta = 1.36603 * ratio - 0.47719 * ratio * ratio + 0.11116 * ratio.powi(3);
    (fwhm, eta)
}

/// Pseudo-Voigt profile: a mix of a Gaussian and a Lorentzian sharing the
/// approximate Voigt FWHM.
pub fn pseudo_voigt(x: f64, amplitude: f64, center: f64, sigma: f64, gamma: f64) -> f64 {
    let (fwhm, eta) = pseudo_voigt_shape(sigma, gamma);
    let u = 2.0 * (x - center) / fwhm;
    let gauss = (-std::f64::consts::LN_2 * u * u).exp();
    let lorentz = 1.0 / (1.0 + u * u);
    amplitude * (eta * lorentz + (1.0 - eta) * gauss)
}
