//! # Covariance Matrix Calculations
//!
//! Parameter covariance is estimated from the Jacobian of the weighted
//! residuals at the solution as `inv(J^T * J)`. Residuals are already divided
//! by their uncertainties, so no reduced chi-square rescaling is applied.

use crate::utils::matrix_convert::{nalgebra_to_ndarray, ndarray_to_nalgebra};
use ndarray::{Array1, Array2};

/// Singular values below this are treated as zero by the pseudo-inverse.
const PSEUDO_INVERSE_EPS: f64 = 1e-12;

/// Calculate the covariance matrix of the Jacobian's columns.
///
/// Falls back to the Moore-Penrose pseudo-inverse when `J^T * J` is
/// singular. Returns `None` when neither inverse can be formed.
pub fn covariance_from_jacobian(jacobian: &Array2<f64>) -> Option<Array2<f64>> {
    let jtj = ndarray_to_nalgebra(&jacobian.t().dot(jacobian));

    if let Some(inverse) = jtj.clone().try_inverse() {
        return Some(nalgebra_to_ndarray(&inverse));
    }

    log::warn!("Covariance matrix is singular; using pseudo-inverse");
    jtj.pseudo_inverse(PSEUDO_INVERSE_EPS)
        .ok()
        .map(|inverse| nalgebra_to_ndarray(&inverse))
}

/// Embed a covariance over the free parameters into the full parameter space.
///
/// Rows and columns of parameters that are not in `free` stay zero.
pub fn expand_covariance(free_covariance: &Array2<f64>, free: &[usize], npars: usize) -> Array2<f64> {
    let mut covar = Array2::zeros((npars, npars));
    for (a, &i) in free.iter().enumerate() {
        for (b, &j) in free.iter().enumerate() {
            covar[[i, j]] = free_covariance[[a, b]];
        }
    }
    covar
}

/// Calculate correlation matrix from covariance matrix.
///
/// The correlation matrix is calculated as:
///   correl[i,j] = covar[i,j] / sqrt(covar[i,i] * covar[j,j])
///
/// Entries of parameters with zero variance are zero, diagonal included.
pub fn calculate_correlation(covar: &Array2<f64>) -> Array2<f64> {
    let n = covar.nrows();
    Array2::from_shape_fn((n, n), |(i, j)| {
        let denom = (covar[[i, i]] * covar[[j, j]]).sqrt();
        if denom > 0.0 {
            if i == j {
                1.0
            } else {
                covar[[i, j]] / denom
            }
        } else {
            0.0
        }
    })
}

/// Extract standard errors from the covariance matrix.
///
/// Non-positive variances give a zero error.
pub fn standard_errors_from_covariance(covar: &Array2<f64>) -> Array1<f64> {
    covar
        .diag()
        .mapv(|variance| if variance > 0.0 { variance.sqrt() } else { 0.0 })
}
