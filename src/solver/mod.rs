//! # Least-Squares Solver
//!
//! The fitter reaches its optimizer through the [`LeastSquaresSolver`] trait.
//! A solver receives a residual function, the constraint records of every
//! parameter, and a [`SolverConfig`]; it returns a [`SolverOutput`] whose
//! `status` follows the MPFIT numbering (see [`status`]).
//!
//! [`LevenbergMarquardt`] is the default implementation.

pub mod config;
pub mod covariance;
pub mod levmar;
pub mod status;

use ndarray::{Array1, Array2};

use crate::error::Result;
use crate::parinfo::ParameterRecord;

pub use config::SolverConfig;
pub use levmar::LevenbergMarquardt;
pub use status::{is_failure, status_message, SolverStatus};

/// A function mapping the full parameter vector to residuals.
pub trait ResidualFunction {
    /// Evaluate the residuals at `params`.
    fn residuals(&self, params: &[f64]) -> Result<Array1<f64>>;

    /// Number of residuals returned by every evaluation.
    fn residual_count(&self) -> usize;
}

/// What a solver reports back to the fitter
#[derive(Debug, Clone, PartialEq)]
pub struct SolverOutput {
    /// Best-fit parameters (the starting values when the solve failed)
    pub params: Vec<f64>,

    /// One-sigma uncertainties, zero for fixed and tied parameters
    pub perror: Option<Vec<f64>>,

    /// Covariance over the full parameter vector
    pub covariance: Option<Array2<f64>>,

    /// Sum of squared residuals at `params`
    pub fnorm: f64,

    /// MPFIT status code, `<= 0` on failure
    pub status: i32,

    /// Error message, empty on success
    pub errmsg: String,

    /// Number of iterations performed
    pub niter: usize,

    /// Number of residual function evaluations
    pub nfev: usize,
}

impl SolverOutput {
    /// Output of a solve that stopped before iterating.
    pub fn failure(status: SolverStatus, errmsg: impl Into<String>, params: Vec<f64>) -> Self {
        Self {
            params,
            perror: None,
            covariance: None,
            fnorm: f64::NAN,
            status: status.code(),
            errmsg: errmsg.into(),
            niter: 0,
            nfev: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        !is_failure(self.status)
    }
}

/// A least-squares optimizer honouring parameter constraint records.
pub trait LeastSquaresSolver {
    /// Minimize the sum of squared residuals.
    ///
    /// # Arguments
    ///
    /// * `residual` - The residual function over the full parameter vector
    /// * `parinfo` - One record per parameter; `value` holds the starting point
    /// * `config` - Tolerances, iteration limit and verbosity
    ///
    /// # Returns
    ///
    /// * `Ok(SolverOutput)` for any terminating solve, successful or not
    /// * `Err` only when the residual function itself fails
    fn solve(
        &self,
        residual: &dyn ResidualFunction,
        parinfo: &[ParameterRecord],
        config: &SolverConfig,
    ) -> Result<SolverOutput>;
}
