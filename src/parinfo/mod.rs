//! # Parameter Information
//!
//! This module holds the per-parameter constraint bookkeeping consumed by the
//! solver: one [`ParameterRecord`] per entry of the flattened parameter
//! vector, each carrying its starting value, step size, limits, fixed flag,
//! name, tie expression and post-fit uncertainty.
//!
//! ## Core Components
//!
//! - [`ParameterRecord`]: one parameter's constraints and metadata
//! - [`ParInfo`]: the ordered list of records, with `n` equal to list position
//! - [`ParInfoArrays`] / [`ParInfoOverrides`]: construction and per-fit input arrays
//! - [`Limits`]: active bounds derived from `limits`/`limited`
//! - [`Expression`] / [`Ties`]: tie expressions such as `"2 * p[0]"`
//!
//! ## Example Usage
//!
//! ```rust
//! use specfit_rs::parinfo::{ParInfo, ParInfoArrays};
//!
//! let arrays = ParInfoArrays::new()
//!     .with_names(["AMPLITUDE", "SHIFT", "WIDTH"])
//!     .with_values(vec![1.0, 0.0, 1.0])
//!     .with_limited(vec![[false, false], [false, false], [true, false]]);
//!
//! let parinfo = ParInfo::from_arrays(3, &arrays).unwrap();
//! assert_eq!(parinfo.len(), 3);
//! assert_eq!(parinfo[2].parname, "WIDTH");
//! assert_eq!(parinfo[2].limited, [true, false]);
//! ```

pub mod arrays;
pub mod limits;
pub mod record;
pub mod tied;


use std::fs::File;
use std::io::Read;
use std::ops::Index;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FitError, Result};

// Re-export key types
pub use arrays::{ParInfoArrays, ParInfoOverrides};
pub use limits::{Limits, LimitsError};
pub use record::ParameterRecord;
pub use tied::{EvaluationContext, Expression, ExpressionError, Ties};

/// Ordered list of parameter records
///
/// The list always satisfies `self[i].n() == i`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParInfo {
    records: Vec<ParameterRecord>,
}

impl ParInfo {
    /// Build `npars` records from the supplied arrays.
    ///
    /// Arrays that are not supplied default per index: `0` for numeric
    /// fields, `false` for flags, `""` for names and ties.
    ///
    /// # Errors
    ///
    /// * `FitError::Configuration` if any supplied array does not have
    ///   exactly `npars` entries
    pub fn from_arrays(npars: usize, arrays: &ParInfoArrays) -> Result<Self> {
        arrays.validate(npars)?;

        let records = (0..npars)
            .map(|i| {
                let mut record = ParameterRecord::new(i);
                if let Some(values) = &arrays.parvalues {
                    record.value = values[i];
                }
                if let Some(steps) = &arrays.parsteps {
                    record.step = steps[i];
                }
                if let Some(limits) = &arrays.parlimits {
                    record.limits = limits[i];
                }
                if let Some(limited) = &arrays.parlimited {
                    record.limited = limited[i];
                }
                if let Some(fixed) = &arrays.parfixed {
                    record.fixed = fixed[i];
                }
                if let Some(names) = &arrays.parnames {
                    record.parname = names[i].clone();
                }
                if let Some(errors) = &arrays.parerror {
                    record.error = errors[i];
                }
                if let Some(tied) = &arrays.partied {
                    record.tied = tied[i].clone();
                }
                record
            })
            .collect();

        Ok(Self { records })
    }

    /// Records with every field at its default.
    pub fn with_defaults(npars: usize) -> Self {
        Self {
            records: (0..npars).map(ParameterRecord::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, n: usize) -> Option<&ParameterRecord> {
        self.records.get(n)
    }

    pub fn get_mut(&mut self, n: usize) -> Option<&mut ParameterRecord> {
        self.records.get_mut(n)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParameterRecord> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, ParameterRecord> {
        self.records.iter_mut()
    }

    pub fn as_slice(&self) -> &[ParameterRecord] {
        &self.records
    }

    /// Current values, in index order.
    pub fn values(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.value).collect()
    }

    /// Current uncertainties, in index order.
    pub fn errors(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.error).collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.records.iter().map(|r| r.parname.clone()).collect()
    }

    /// Number of records the solver may vary.
    pub fn free_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_free()).count()
    }

    /// Overwrite every record's value positionally.
    ///
    /// Returns `false` and leaves the records untouched when `values` does
    /// not have one entry per record.
    pub fn set_values(&mut self, values: &[f64]) -> bool {
        if values.len() != self.records.len() {
            return false;
        }
        for (record, &value) in self.records.iter_mut().zip(values) {
            record.value = value;
        }
        true
    }

    /// Store a fit outcome: best-fit values and their uncertainties.
    pub(crate) fn store_fit(&mut self, values: &[f64], errors: &[f64]) {
        for (record, (&value, &error)) in self.records.iter_mut().zip(values.iter().zip(errors)) {
            record.value = value;
            record.error = error;
        }
    }

    /// Apply per-fit constraint overrides, indexed by each record's `n`.
    ///
    /// All override lengths are checked before any record is touched.
    pub fn apply_overrides(&mut self, overrides: &ParInfoOverrides) -> Result<()> {
        overrides.validate(self.records.len())?;

        for record in self.records.iter_mut() {
            let n = record.n();
            if let Some(limits) = &overrides.limits {
                record.limits = limits[n];
            }
            if let Some(limited) = &overrides.limited {
                record.limited = limited[n];
            }
            if let Some(fixed) = &overrides.fixed {
                record.fixed = fixed[n];
            }
            if let Some(tied) = &overrides.tied {
                record.tied = tied[n].clone();
            }
        }
        Ok(())
    }

    /// Serialize the records to a pretty-printed JSON array.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse records from JSON, checking that indices match positions.
    pub fn from_json(json: &str) -> Result<Self> {
        let parinfo: ParInfo = serde_json::from_str(json)?;
        parinfo.check_order()?;
        Ok(parinfo)
    }

    /// Write the records to a JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Read records from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut contents = String::new();
        File::open(path)?.read_to_string(&mut contents)?;
        Self::from_json(&contents)
    }

    fn check_order(&self) -> Result<()> {
        match self.records.iter().enumerate().find(|(i, r)| r.n() != *i) {
            Some((i, record)) => Err(FitError::Configuration(format!(
                "record at position {} has index n = {}",
                i,
                record.n()
            ))),
            None => Ok(()),
        }
    }
}

impl Index<usize> for ParInfo {
    type Output = ParameterRecord;

    fn index(&self, n: usize) -> &ParameterRecord {
        &self.records[n]
    }
}

impl<'a> IntoIterator for &'a ParInfo {
    type Item = &'a ParameterRecord;
    type IntoIter = std::slice::Iter<'a, ParameterRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
