//! Outcome of a successful fit.

use std::fmt;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::parinfo::record::display_name;
use crate::solver::covariance::calculate_correlation;
use crate::solver::status_message;

/// Best-fit parameters, uncertainties and goodness of fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    /// Best-fit parameter vector
    pub params: Vec<f64>,

    /// One-sigma uncertainties, zero where the solver reported none
    pub perror: Vec<f64>,

    /// Parameter names, in index order
    pub parnames: Vec<String>,

    /// Model evaluated at the best-fit parameters
    pub model: Array1<f64>,

    /// Sum of squared weighted residuals
    pub chi2: f64,

    /// Solver status code
    pub status: i32,

    /// Solver error message (empty on clean success)
    pub errmsg: String,

    pub niter: usize,
    pub nfev: usize,

    /// Number of data points fitted
    pub npoints: usize,

    /// Covariance matrix over all parameters, when the solver provided one
    #[serde(default)]
    pub covariance: Option<Array2<f64>>,
}

impl FitResult {
    /// Degrees of freedom: data points minus parameters.
    pub fn dof(&self) -> i64 {
        self.npoints as i64 - self.params.len() as i64
    }

    /// Chi-squared per data point.
    pub fn reduced_chi2(&self) -> f64 {
        self.chi2 / self.npoints as f64
    }

    pub fn status_message(&self) -> &'static str {
        status_message(self.status)
    }

    /// Report name of parameter `i`, `p[i]` when it has none.
    pub fn parameter_name(&self, i: usize) -> String {
        display_name(self.parnames.get(i).map_or("", String::as_str), i)
    }

    pub fn correlation(&self) -> Option<Array2<f64>> {
        self.covariance.as_ref().map(calculate_correlation)
    }

    /// Serialize the result to pretty-printed JSON.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for FitResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Fit status: {} ({})", self.status, self.status_message())?;
        for (i, (value, error)) in self.params.iter().zip(&self.perror).enumerate() {
            writeln!(
                f,
                "  {:<12} = {:>14.6e} +/- {:.6e}",
                self.parameter_name(i),
                value,
                error
            )?;
        }
        write!(
            f,
            "Chi2: {:.6e}  Reduced Chi2: {:.6e}  DOF: {}",
            self.chi2,
            self.reduced_chi2(),
            self.dof()
        )
    }
}
