//! Per-call fit options.

use crate::parinfo::ParInfoOverrides;
use crate::solver::SolverConfig;

/// Options for one [`ModelFitter::fit`](super::ModelFitter::fit) call.
///
/// Solver settings left as `None` fall back to the fitter's
/// [`SolverConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct FitOptions {
    /// Initial guesses, applied only when one value per parameter is given
    pub params: Option<Vec<f64>>,

    /// Suppress solver iteration logging. Default: true
    pub quiet: bool,

    /// Suppress the post-fit report. Default: true
    pub shh: bool,

    /// Force the post-fit report and add the correlation matrix. Default: false
    pub veryverbose: bool,

    /// New peak count, stored on the fitter
    pub npeaks: Option<usize>,

    /// Constraint overrides written into the records before fitting
    pub overrides: ParInfoOverrides,

    pub max_iterations: Option<usize>,
    pub ftol: Option<f64>,
    pub xtol: Option<f64>,
    pub gtol: Option<f64>,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            params: None,
            quiet: true,
            shh: true,
            veryverbose: false,
            npeaks: None,
            overrides: ParInfoOverrides::default(),
            max_iterations: None,
            ftol: None,
            xtol: None,
            gtol: None,
        }
    }
}

impl FitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(mut self, params: impl Into<Vec<f64>>) -> Self {
        self.params = Some(params.into());
        self
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn with_shh(mut self, shh: bool) -> Self {
        self.shh = shh;
        self
    }

    pub fn with_veryverbose(mut self, veryverbose: bool) -> Self {
        self.veryverbose = veryverbose;
        self
    }

    pub fn with_npeaks(mut self, npeaks: usize) -> Self {
        self.npeaks = Some(npeaks);
        self
    }

    pub fn with_limits(mut self, limits: impl Into<Vec<[f64; 2]>>) -> Self {
        self.overrides.limits = Some(limits.into());
        self
    }

    pub fn with_limited(mut self, limited: impl Into<Vec<[bool; 2]>>) -> Self {
        self.overrides.limited = Some(limited.into());
        self
    }

    pub fn with_fixed(mut self, fixed: impl Into<Vec<bool>>) -> Self {
        self.overrides.fixed = Some(fixed.into());
        self
    }

    pub fn with_tied<I, S>(mut self, tied: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.overrides.tied = Some(tied.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    pub fn with_ftol(mut self, ftol: f64) -> Self {
        self.ftol = Some(ftol);
        self
    }

    pub fn with_xtol(mut self, xtol: f64) -> Self {
        self.xtol = Some(xtol);
        self
    }

    pub fn with_gtol(mut self, gtol: f64) -> Self {
        self.gtol = Some(gtol);
        self
    }

    /// Whether the post-fit report is emitted.
    pub fn verbose(&self) -> bool {
        !self.shh || self.veryverbose
    }

    /// The fitter's solver configuration with this call's settings applied.
    pub fn solver_config(&self, base: &SolverConfig) -> SolverConfig {
        let mut config = base.clone().with_quiet(self.quiet);
        if let Some(max_iterations) = self.max_iterations {
            config.max_iterations = max_iterations;
        }
        if let Some(ftol) = self.ftol {
            config.ftol = ftol;
        }
        if let Some(xtol) = self.xtol {
            config.xtol = xtol;
        }
        if let Some(gtol) = self.gtol {
            config.gtol = gtol;
        }
        config
    }
}
