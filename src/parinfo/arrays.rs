//! Per-parameter input arrays
//!
//! `ParInfoArrays` carries the optional construction-time arrays, one entry
//! per parameter; `ParInfoOverrides` carries the subset of constraint
//! fields a caller may replace right before a fit.

use crate::error::{FitError, Result};

/// Optional per-parameter arrays used to build a parameter list
///
/// Any array left as `None` is filled with the "no constraint" default for
/// its field. Every array that is given must have exactly one entry per
/// parameter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParInfoArrays {
    pub parnames: Option<Vec<String>>,
    pub parvalues: Option<Vec<f64>>,
    pub parsteps: Option<Vec<f64>>,
    pub parlimits: Option<Vec<[f64; 2]>>,
    pub parlimited: Option<Vec<[bool; 2]>>,
    pub parfixed: Option<Vec<bool>>,
    pub parerror: Option<Vec<f64>>,
    pub partied: Option<Vec<String>>,
}

impl ParInfoArrays {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parnames = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_values(mut self, values: impl Into<Vec<f64>>) -> Self {
        self.parvalues = Some(values.into());
        self
    }

    pub fn with_steps(mut self, steps: impl Into<Vec<f64>>) -> Self {
        self.parsteps = Some(steps.into());
        self
    }

    pub fn with_limits(mut self, limits: impl Into<Vec<[f64; 2]>>) -> Self {
        self.parlimits = Some(limits.into());
        self
    }

    pub fn with_limited(mut self, limited: impl Into<Vec<[bool; 2]>>) -> Self {
        self.parlimited = Some(limited.into());
        self
    }

    pub fn with_fixed(mut self, fixed: impl Into<Vec<bool>>) -> Self {
        self.parfixed = Some(fixed.into());
        self
    }

    pub fn with_errors(mut self, errors: impl Into<Vec<f64>>) -> Self {
        self.parerror = Some(errors.into());
        self
    }

    pub fn with_tied<I, S>(mut self, tied: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.partied = Some(tied.into_iter().map(Into::into).collect());
        self
    }

    /// Check every supplied array against the parameter count.
    pub fn validate(&self, npars: usize) -> Result<()> {
        check_len("parnames", self.parnames.as_deref(), npars)?;
        check_len("parvalues", self.parvalues.as_deref(), npars)?;
        check_len("parsteps", self.parsteps.as_deref(), npars)?;
        check_len("parlimits", self.parlimits.as_deref(), npars)?;
        check_len("parlimited", self.parlimited.as_deref(), npars)?;
        check_len("parfixed", self.parfixed.as_deref(), npars)?;
        check_len("parerror", self.parerror.as_deref(), npars)?;
        check_len("partied", self.partied.as_deref(), npars)
    }
}

/// Constraint fields a caller may replace immediately before a fit
///
/// Each present array overwrites the matching field on every record,
/// indexed by the record's position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParInfoOverrides {
    pub limits: Option<Vec<[f64; 2]>>,
    pub limited: Option<Vec<[bool; 2]>>,
    pub fixed: Option<Vec<bool>>,
    pub tied: Option<Vec<String>>,
}

impl ParInfoOverrides {
    /// Whether no override is present.
    pub fn is_empty(&self) -> bool {
        self.limits.is_none() && self.limited.is_none() && self.fixed.is_none() && self.tied.is_none()
    }

    pub fn validate(&self, npars: usize) -> Result<()> {
        check_len("limits", self.limits.as_deref(), npars)?;
        check_len("limited", self.limited.as_deref(), npars)?;
        check_len("fixed", self.fixed.as_deref(), npars)?;
        check_len("tied", self.tied.as_deref(), npars)
    }
}

pub(crate) fn check_len<T>(field: &str, values: Option<&[T]>, npars: usize) -> Result<()> {
    match values {
        Some(values) if values.len() != npars => Err(FitError::Configuration(format!(
            "{} has {} entries, expected {}",
            field,
            values.len(),
            npars
        ))),
        _ => Ok(()),
    }
}
