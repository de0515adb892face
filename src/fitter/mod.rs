//! # Model Fitter
//!
//! [`ModelFitter`] couples one model function with its parameter records and
//! runs weighted least-squares fits of that model to spectra.
//!
//! A fit call proceeds in a fixed order: peak count and initial guesses are
//! stored, constraint overrides are written into the records, the axis is
//! converted to the fit unit, the data are sanitized, and the solver is run
//! on the weighted residual. On success the records receive the best-fit
//! values and uncertainties, and the result is kept for
//! [`annotations`](ModelFitter::annotations).
//!
//! ## Example Usage
//!
//! ```rust
//! use ndarray::Array1;
//! use specfit_rs::models::gaussian_fitter;
//! use specfit_rs::{FitOptions, SpectralAxis};
//!
//! let x = Array1::linspace(-5.0, 5.0, 101);
//! let data = x.mapv(|xi: f64| 2.0 * (-(xi - 0.5).powi(2) / 2.0).exp());
//!
//! let mut fitter = gaussian_fitter(1).unwrap();
//! let result = fitter
//!     .fit(&SpectralAxis::new(x), &data, None, &FitOptions::default())
//!     .unwrap();
//!
//! assert!((result.params[0] - 2.0).abs() < 1e-6);
//! assert!((result.params[1] - 0.5).abs() < 1e-6);
//! assert_eq!(fitter.annotations(None).unwrap().len(), 3);
//! ```

pub mod annotations;
pub mod options;
mod report;
pub mod residual;
pub mod result;


use std::borrow::Cow;
use std::fmt;

use ndarray::Array1;

use crate::axis::SpectralAxis;
use crate::error::{FitError, Result};
use crate::model::{ModelFunction, ModelOptions};
use crate::parinfo::{ParInfo, ParInfoArrays};
use crate::solver::{
    is_failure, status_message, LeastSquaresSolver, LevenbergMarquardt, SolverConfig,
};

pub use options::FitOptions;
pub use residual::WeightedResidual;
pub use result::FitResult;

/// Default display symbols for the three parameters of a line profile
pub const DEFAULT_SHORTVARNAMES: [&str; 3] = ["A", "v", "\\sigma"];

/// A model function, its parameter records, and the solver that fits it
pub struct ModelFitter {
    model: Box<dyn ModelFunction>,
    npars: usize,
    parinfo: ParInfo,
    fitunits: Option<String>,
    npeaks: usize,
    shortvarnames: Vec<String>,
    model_options: ModelOptions,
    solver: Box<dyn LeastSquaresSolver>,
    solver_config: SolverConfig,
    last: Option<FitResult>,
}

impl ModelFitter {
    /// Create a fitter for `model` with `npars` parameters.
    ///
    /// # Arguments
    ///
    /// * `model` - The model function
    /// * `npars` - Length of the flattened parameter vector
    /// * `arrays` - Optional per-parameter construction arrays
    ///
    /// # Returns
    ///
    /// * A fitter with one record per parameter, one peak, the default
    ///   display symbols, no fit unit and the [`LevenbergMarquardt`] solver
    ///
    /// # Errors
    ///
    /// * `FitError::Configuration` if a supplied array is not `npars` long
    pub fn new<M>(model: M, npars: usize, arrays: &ParInfoArrays) -> Result<Self>
    where
        M: ModelFunction + 'static,
    {
        let parinfo = ParInfo::from_arrays(npars, arrays)?;

        Ok(Self {
            model: Box::new(model),
            npars,
            parinfo,
            fitunits: None,
            npeaks: 1,
            shortvarnames: DEFAULT_SHORTVARNAMES.iter().map(|s| s.to_string()).collect(),
            model_options: ModelOptions::new(),
            solver: Box::new(LevenbergMarquardt::new()),
            solver_config: SolverConfig::default(),
            last: None,
        })
    }

    /// Convert unit-bearing axes to `units` before fitting.
    pub fn with_fitunits(mut self, units: &str) -> Self {
        self.fitunits = Some(units.to_string());
        self
    }

    pub fn with_npeaks(mut self, npeaks: usize) -> Self {
        self.npeaks = npeaks;
        self
    }

    pub fn with_shortvarnames<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shortvarnames = names.into_iter().map(Into::into).collect();
        self
    }

    /// Keyword options handed to the model on every evaluation.
    pub fn with_model_options(mut self, options: ModelOptions) -> Self {
        self.model_options = options;
        self
    }

    pub fn with_solver<S: LeastSquaresSolver + 'static>(mut self, solver: S) -> Self {
        self.set_solver(solver);
        self
    }

    pub fn with_solver_config(mut self, config: SolverConfig) -> Self {
        self.solver_config = config;
        self
    }

    pub fn set_solver<S: LeastSquaresSolver + 'static>(&mut self, solver: S) {
        self.solver = Box::new(solver);
    }

    /// Fit the model to `data` sampled on `xax`.
    ///
    /// # Arguments
    ///
    /// * `xax` - The independent axis; converted on a copy when both the axis
    ///   and the fitter carry units
    /// * `data` - Observed values, one per axis point; NaN and infinite
    ///   points are ignored
    /// * `err` - One-sigma errors per point, or `None` for unit weights
    /// * `options` - Initial guesses, overrides, verbosity and solver settings
    ///
    /// # Errors
    ///
    /// * `FitError::Configuration` for override arrays of the wrong length
    /// * `FitError::UnitConversion` if the axis cannot be converted
    /// * `FitError::DimensionMismatch` if `data` or `err` does not match the axis
    /// * `FitError::SolverFailure` if the solver reports a failure status;
    ///   the records then keep their pre-solve state
    pub fn fit(
        &mut self,
        xax: &SpectralAxis,
        data: &Array1<f64>,
        err: Option<&Array1<f64>>,
        options: &FitOptions,
    ) -> Result<FitResult> {
        if let Some(npeaks) = options.npeaks {
            self.npeaks = npeaks;
        }

        if let Some(params) = &options.params {
            if !self.parinfo.set_values(params) {
                log::debug!(
                    "Ignoring {} initial guesses for {} parameters",
                    params.len(),
                    self.npars
                );
            }
        }

        self.parinfo.apply_overrides(&options.overrides)?;

        let xax: Cow<'_, SpectralAxis> = match (&self.fitunits, xax.units()) {
            (Some(fitunits), Some(_)) => {
                let mut converted = xax.clone();
                converted.convert_to_unit(fitunits, options.quiet)?;
                Cow::Owned(converted)
            }
            _ => Cow::Borrowed(xax),
        };

        let (data, err) = residual::sanitize(xax.len(), data, err)?;
        let residual = WeightedResidual::new(
            self.model.as_ref(),
            &xax.values,
            &data,
            &err,
            &self.model_options,
        );

        let config = options.solver_config(&self.solver_config);
        let output = self
            .solver
            .solve(&residual, self.parinfo.as_slice(), &config)?;

        if is_failure(output.status) {
            let message = if output.errmsg.is_empty() {
                status_message(output.status).to_string()
            } else {
                output.errmsg
            };
            log::debug!("Fit failed with status {}: {}", output.status, message);
            return Err(FitError::SolverFailure(message));
        }

        if output.params.len() != self.npars {
            return Err(FitError::DimensionMismatch(format!(
                "solver returned {} parameters, expected {}",
                output.params.len(),
                self.npars
            )));
        }

        let perror = output
            .perror
            .unwrap_or_else(|| vec![0.0; output.params.len()]);
        let model = self
            .model
            .evaluate(&xax.values, &output.params, &self.model_options)?;

        self.parinfo.store_fit(&output.params, &perror);

        let result = FitResult {
            params: output.params,
            perror,
            parnames: self.parinfo.names(),
            model,
            chi2: output.fnorm,
            status: output.status,
            errmsg: output.errmsg,
            niter: output.niter,
            nfev: output.nfev,
            npoints: data.len(),
            covariance: output.covariance,
        };

        if options.verbose() {
            report::log_report(&result, options.veryverbose);
        } else {
            log::debug!(
                "Fit converged with status {} after {} iterations: chi2 = {:.6e}",
                result.status,
                result.niter,
                result.chi2
            );
        }

        self.last = Some(result.clone());
        Ok(result)
    }

    /// Plot labels for the last successful fit.
    ///
    /// Uses the configured display symbols unless `shortvarnames` is given.
    /// Returns `symbols × npeaks` labels, symbol-major.
    ///
    /// # Errors
    ///
    /// * `FitError::State` before any successful fit, or when a symbol/peak
    ///   index falls outside the fitted vector
    pub fn annotations(&self, shortvarnames: Option<&[&str]>) -> Result<Vec<String>> {
        let result = self.last.as_ref().ok_or_else(|| {
            FitError::State("annotations require a successful fit".to_string())
        })?;

        match shortvarnames {
            Some(symbols) => annotations::labels(
                symbols,
                self.npeaks,
                self.npars,
                &result.params,
                &result.perror,
            ),
            None => annotations::labels(
                self.shortvarnames.as_slice(),
                self.npeaks,
                self.npars,
                &result.params,
                &result.perror,
            ),
        }
    }

    pub fn npars(&self) -> usize {
        self.npars
    }

    pub fn npeaks(&self) -> usize {
        self.npeaks
    }

    pub fn fitunits(&self) -> Option<&str> {
        self.fitunits.as_deref()
    }

    pub fn shortvarnames(&self) -> &[String] {
        &self.shortvarnames
    }

    pub fn parinfo(&self) -> &ParInfo {
        &self.parinfo
    }

    /// Mutable access to the records, e.g. to set new starting values.
    pub fn parinfo_mut(&mut self) -> &mut ParInfo {
        &mut self.parinfo
    }

    pub fn model_options(&self) -> &ModelOptions {
        &self.model_options
    }

    pub fn solver_config(&self) -> &SolverConfig {
        &self.solver_config
    }

    /// The last successful fit, if any.
    pub fn last_result(&self) -> Option<&FitResult> {
        self.last.as_ref()
    }

    /// Model curve of the last successful fit.
    pub fn model_curve(&self) -> Option<&Array1<f64>> {
        self.last.as_ref().map(|result| &result.model)
    }
}

impl fmt::Debug for ModelFitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelFitter")
            .field("npars", &self.npars)
            .field("npeaks", &self.npeaks)
            .field("fitunits", &self.fitunits)
            .field("shortvarnames", &self.shortvarnames)
            .field("parinfo", &self.parinfo)
            .field("model_options", &self.model_options)
            .field("solver_config", &self.solver_config)
            .field("fitted", &self.last.is_some())
            .finish()
    }
}
