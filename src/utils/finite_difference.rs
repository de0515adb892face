//! Finite difference methods for numerical differentiation.
//!
//! This module provides the forward-difference Jacobian used by the solver.
//! Each column may carry its own step size and the active bounds of its
//! parameter, so that no perturbed point ever leaves the feasible region.

use crate::error::{FitError, Result};
use crate::parinfo::Limits;
use ndarray::{Array1, Array2};

/// Default relative step size for finite differences (square root of machine epsilon).
pub const DEFAULT_EPSILON: f64 = 1.4901161193847656e-8;

/// Step size for one parameter.
///
/// A positive user step is used verbatim; otherwise the step scales with
/// the parameter magnitude, falling back to `epsilon` near zero.
pub fn step_size(value: f64, user_step: f64, epsilon: f64) -> f64 {
    if user_step > 0.0 {
        user_step
    } else if value.abs() > epsilon {
        value.abs() * epsilon
    } else {
        epsilon
    }
}

/// Compute the Jacobian matrix using one-sided finite differences.
///
/// The Jacobian is the matrix of partial derivatives of the residuals with
/// respect to the parameters: J[i,j] = ∂residual[i]/∂param[j]. Columns whose
/// forward step would cross an active upper bound use a backward step, and
/// intervals narrower than the step are sampled at their wider end.
///
/// # Arguments
///
/// * `f` - The residual function
/// * `params` - The parameter values at which to evaluate the Jacobian
/// * `residuals` - The residuals already evaluated at `params`
/// * `steps` - User step sizes, one per parameter (`0` = automatic)
/// * `bounds` - Active bounds, one per parameter
/// * `epsilon` - Relative step size used when no user step is given
///
/// # Returns
///
/// * `Result<Array2<f64>>` - The Jacobian matrix
pub fn jacobian<F>(
    f: F,
    params: &[f64],
    residuals: &Array1<f64>,
    steps: &[f64],
    bounds: &[Limits],
    epsilon: f64,
) -> Result<Array2<f64>>
where
    F: Fn(&[f64]) -> Result<Array1<f64>>,
{
    let n_params = params.len();
    let n_residuals = residuals.len();

    if steps.len() != n_params || bounds.len() != n_params {
        return Err(FitError::DimensionMismatch(format!(
            "Expected {} step sizes and bounds, got {} and {}",
            n_params,
            steps.len(),
            bounds.len()
        )));
    }

    let mut jac = Array2::zeros((n_residuals, n_params));
    let mut perturbed = params.to_vec();

    for j in 0..n_params {
        let h = bounds[j].difference_step(params[j], step_size(params[j], steps[j], epsilon));

        perturbed[j] = params[j] + h;
        let residuals_perturbed = f(&perturbed)?;
        perturbed[j] = params[j];

        if residuals_perturbed.len() != n_residuals {
            return Err(FitError::DimensionMismatch(format!(
                "Expected {} residuals, got {}",
                n_residuals,
                residuals_perturbed.len()
            )));
        }

        for i in 0..n_residuals {
            jac[[i, j]] = (residuals_perturbed[i] - residuals[i]) / h;
        }
    }

    Ok(jac)
}
