//! Parameter limit handling
//!
//! Limits are stored on each record as a value pair plus a pair of activity
//! flags. This module turns that representation into optional lower/upper
//! bounds, validates them, and projects trial values back inside them.

use crate::parinfo::record::ParameterRecord;
use thiserror::Error;

/// Errors raised while checking a record's limits
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LimitsError {
    #[error("Parameter limits are not consistent for p[{n}]: lower ({lower}) must be below upper ({upper})")]
    Inconsistent { n: usize, lower: f64, upper: f64 },

    #[error("Parameter p[{n}] = {value} is not within its limits [{lower}, {upper}]")]
    OutsideLimits {
        n: usize,
        value: f64,
        lower: f64,
        upper: f64,
    },
}

/// The active bounds of one parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    n: usize,
    lower: Option<f64>,
    upper: Option<f64>,
}

impl Limits {
    /// Build the bounds of a record, keeping only the sides flagged active.
    pub fn from_record(record: &ParameterRecord) -> Self {
        Self {
            n: record.n(),
            lower: record.limited[0].then_some(record.limits[0]),
            upper: record.limited[1].then_some(record.limits[1]),
        }
    }

    /// Bounds with no active side.
    pub fn unbounded(n: usize) -> Self {
        Self {
            n,
            lower: None,
            upper: None,
        }
    }

    pub fn lower(&self) -> Option<f64> {
        self.lower
    }

    pub fn upper(&self) -> Option<f64> {
        self.upper
    }

    /// Check that a doubly-bounded parameter has `lower < upper`.
    pub fn validate(&self) -> Result<(), LimitsError> {
        match (self.lower, self.upper) {
            (Some(lower), Some(upper)) if lower >= upper => Err(LimitsError::Inconsistent {
                n: self.n,
                lower,
                upper,
            }),
            _ => Ok(()),
        }
    }

    /// Whether `value` satisfies every active bound.
    pub fn contains(&self, value: f64) -> bool {
        self.lower.map_or(true, |lower| value >= lower)
            && self.upper.map_or(true, |upper| value <= upper)
    }

    /// Check a starting value against the active bounds.
    pub fn check(&self, value: f64) -> Result<(), LimitsError> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(LimitsError::OutsideLimits {
                n: self.n,
                value,
                lower: self.lower.unwrap_or(f64::NEG_INFINITY),
                upper: self.upper.unwrap_or(f64::INFINITY),
            })
        }
    }

    /// Project `value` onto the feasible interval.
    pub fn project(&self, value: f64) -> f64 {
        let value = match self.lower {
            Some(lower) if value < lower => lower,
            _ => value,
        };
        match self.upper {
            Some(upper) if value > upper => upper,
            _ => value,
        }
    }

    /// Whether a forward step of size `h` from `value` would leave the
    /// feasible interval through the upper bound.
    pub fn forward_step_blocked(&self, value: f64, h: f64) -> bool {
        self.upper.map_or(false, |upper| value + h > upper)
    }

    /// Signed finite-difference step of at most `h` that keeps `value + step`
    /// inside the interval.
    ///
    /// Steps forward when there is room, backward when only the upper bound
    /// is in the way, and otherwise as far as the wider side allows.
    pub fn difference_step(&self, value: f64, h: f64) -> f64 {
        if !self.forward_step_blocked(value, h) {
            return h;
        }
        let room_below = self.lower.map_or(f64::INFINITY, |lower| value - lower);
        if room_below >= h {
            return -h;
        }
        let room_above = self.upper.map_or(f64::INFINITY, |upper| upper - value);
        if room_above >= room_below {
            room_above
        } else {
            -room_below
        }
    }
}
