//! Per-parameter constraint record
//!
//! A `ParameterRecord` is the unit the solver consumes: one record per entry
//! of the flattened parameter vector, carrying the starting value, the
//! constraint flags and, after a fit, the uncertainty.

use crate::parinfo::limits::Limits;
use serde::{Deserialize, Serialize};

/// Constraint and metadata record for one fit parameter
///
/// Every field has a "no constraint" default: `0` for numbers, `false` for
/// flags and the empty string for `tied`. The index `n` is assigned when the
/// record is created and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRecord {
    /// Position in the flattened parameter vector
    n: usize,

    /// Current value (initial guess before a fit, best-fit value after)
    pub value: f64,

    /// Step size for numerical differentiation; `0` selects it automatically
    #[serde(default)]
    pub step: f64,

    /// Lower and upper bound values
    #[serde(default)]
    pub limits: [f64; 2],

    /// Whether the lower and upper bounds are active
    #[serde(default)]
    pub limited: [bool; 2],

    /// Whether the parameter is held at `value` during the fit
    #[serde(default)]
    pub fixed: bool,

    /// Display name
    #[serde(default)]
    pub parname: String,

    /// Uncertainty from the most recent successful fit
    #[serde(default)]
    pub error: f64,

    /// Expression deriving this parameter from others, empty when untied
    #[serde(default)]
    pub tied: String,
}

impl ParameterRecord {
    /// Create a record at index `n` with every field at its default.
    ///
    /// # Examples
    ///
    /// ```
    /// use specfit_rs::parinfo::ParameterRecord;
    ///
    /// let record = ParameterRecord::new(2);
    /// assert_eq!(record.n(), 2);
    /// assert_eq!(record.value, 0.0);
    /// assert!(!record.fixed);
    /// assert!(record.tied.is_empty());
    /// ```
    pub fn new(n: usize) -> Self {
        Self {
            n,
            value: 0.0,
            step: 0.0,
            limits: [0.0, 0.0],
            limited: [false, false],
            fixed: false,
            parname: String::new(),
            error: 0.0,
            tied: String::new(),
        }
    }

    /// Index of this record in the flattened parameter vector.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Whether the record carries a tie expression.
    pub fn is_tied(&self) -> bool {
        !self.tied.trim().is_empty()
    }

    /// Whether the solver is free to vary this parameter.
    ///
    /// Fixed and tied parameters are both excluded from the optimization.
    pub fn is_free(&self) -> bool {
        !self.fixed && !self.is_tied()
    }

    /// The active bounds of this record.
    pub fn bounds(&self) -> Limits {
        Limits::from_record(self)
    }

    /// Name used in reports, falling back to `p[n]` when none was given.
    pub fn display_name(&self) -> String {
        display_name(&self.parname, self.n)
    }
}

/// Report name of parameter `n`: its `parname`, or `p[n]` when that is empty.
pub fn display_name(parname: &str, n: usize) -> String {
    if parname.is_empty() {
        format!("p[{}]", n)
    } else {
        parname.to_string()
    }
}
