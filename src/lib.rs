//! # specfit-rs
//!
//! `specfit-rs` fits parametric models, such as Gaussian or Voigt line
//! profiles, to one-dimensional spectra with a bounded Levenberg-Marquardt
//! solver.
//!
//! The library provides:
//! - [`ModelFitter`], which holds a model function and one constraint record
//!   per parameter (starting value, step, limits, fixed flag, name, tie
//!   expression, uncertainty)
//! - Per-fit overrides of limits, fixed flags and ties, and masking of
//!   NaN/infinite data points
//! - A replaceable solver behind the [`LeastSquaresSolver`] trait
//! - Multi-peak Gaussian, Lorentzian and pseudo-Voigt models
//! - Plot annotations of the fitted values
//!
//! ## Basic Usage
//!
//! ```
//! use ndarray::Array1;
//! use specfit_rs::models::n_gaussian;
//! use specfit_rs::parinfo::ParInfoArrays;
//! use specfit_rs::{FitOptions, ModelFitter, SpectralAxis};
//!
//! let x = Array1::linspace(-3.0, 3.0, 61);
//! let data = x.mapv(|xi: f64| (-xi * xi / 2.0).exp());
//!
//! let arrays = ParInfoArrays::new()
//!     .with_names(["AMPLITUDE", "SHIFT", "WIDTH"])
//!     .with_values(vec![0.5, 0.2, 2.0]);
//! let mut fitter = ModelFitter::new(n_gaussian, 3, &arrays).unwrap();
//!
//! let result = fitter
//!     .fit(&SpectralAxis::new(x), &data, None, &FitOptions::default())
//!     .unwrap();
//! assert!(result.chi2 < 1e-12);
//! assert!((fitter.parinfo()[2].value - 1.0).abs() < 1e-6);
//! ```

// Public modules
pub mod error;

// Parameter records and tie expressions
pub mod parinfo;

pub mod axis;
pub mod fitter;
pub mod model;
pub mod models;
pub mod solver;
pub mod utils;

// Re-exports for convenience
pub use axis::SpectralAxis;
pub use error::{FitError, Result};
pub use fitter::{FitOptions, FitResult, ModelFitter};
pub use model::{ModelFunction, ModelOptions};
pub use parinfo::{ParInfo, ParInfoArrays, ParameterRecord};
pub use solver::{LeastSquaresSolver, LevenbergMarquardt, SolverConfig, SolverOutput};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
