//! Data sanitization and the weighted residual handed to the solver.

use ndarray::Array1;

use crate::error::{FitError, Result};
use crate::model::{ModelFunction, ModelOptions};
use crate::solver::ResidualFunction;

/// Copy `data` and `err`, masking non-finite data points.
///
/// A missing error array means unit weights. Every NaN or infinite data
/// point gets an infinite error and a data value of zero, so its residual
/// carries no weight. The caller's arrays are never modified.
///
/// # Errors
///
/// * `FitError::DimensionMismatch` if `data` or `err` does not have one
///   entry per axis point
pub fn sanitize(
    npoints: usize,
    data: &Array1<f64>,
    err: Option<&Array1<f64>>,
) -> Result<(Array1<f64>, Array1<f64>)> {
    if data.len() != npoints {
        return Err(FitError::DimensionMismatch(format!(
            "data has {} points, axis has {}",
            data.len(),
            npoints
        )));
    }

    let mut err = match err {
        Some(err) if err.len() != npoints => {
            return Err(FitError::DimensionMismatch(format!(
                "error array has {} points, axis has {}",
                err.len(),
                npoints
            )))
        }
        Some(err) => err.to_owned(),
        None => Array1::ones(npoints),
    };
    let mut data = data.to_owned();

    let mut masked = 0;
    for (d, e) in data.iter_mut().zip(err.iter_mut()) {
        if !d.is_finite() {
            *e = f64::INFINITY;
            *d = 0.0;
            masked += 1;
        }
    }
    if masked > 0 {
        log::debug!("Masked {} non-finite data points", masked);
    }

    Ok((data, err))
}

/// `(data - model(x, params)) / err`, borrowed for the duration of one fit
pub struct WeightedResidual<'a> {
    model: &'a dyn ModelFunction,
    x: &'a Array1<f64>,
    data: &'a Array1<f64>,
    err: &'a Array1<f64>,
    options: &'a ModelOptions,
}

impl<'a> WeightedResidual<'a> {
    pub fn new(
        model: &'a dyn ModelFunction,
        x: &'a Array1<f64>,
        data: &'a Array1<f64>,
        err: &'a Array1<f64>,
        options: &'a ModelOptions,
    ) -> Self {
        Self {
            model,
            x,
            data,
            err,
            options,
        }
    }
}

impl ResidualFunction for WeightedResidual<'_> {
    fn residuals(&self, params: &[f64]) -> Result<Array1<f64>> {
        let predicted = self.model.evaluate(self.x, params, self.options)?;
        if predicted.len() != self.data.len() {
            return Err(FitError::FunctionEvaluation(format!(
                "model returned {} values for {} data points",
                predicted.len(),
                self.data.len()
            )));
        }
        Ok((self.data - &predicted) / self.err)
    }

    fn residual_count(&self) -> usize {
        self.data.len()
    }
}
