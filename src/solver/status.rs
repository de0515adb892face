//! Solver termination statuses.
//!
//! Codes follow the MINPACK/MPFIT numbering: positive codes are successful
//! terminations, zero and negative codes are failures.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why the solver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverStatus {
    /// Improper input parameters.
    ImproperInput,
    /// Relative reduction of the sum of squares is at most `ftol`.
    FtolConverged,
    /// Relative change of the parameters is at most `xtol`.
    XtolConverged,
    /// Both the `ftol` and `xtol` conditions hold.
    BothConverged,
    /// The residual vector is orthogonal to the Jacobian columns within `gtol`.
    GtolConverged,
    /// The iteration limit was reached.
    MaxIterations,
    /// No further reduction in the sum of squares is possible.
    FtolTooSmall,
    /// No further improvement of the parameters is possible.
    XtolTooSmall,
    /// The residual vector is orthogonal to the Jacobian to machine precision.
    GtolTooSmall,
    /// The residual function returned NaN or infinite values.
    NonFinite,
}

/// Messages per status code
static STATUS_MESSAGES: [(i32, &str); 10] = [
    (0, "Improper input parameters."),
    (
        1,
        "Both actual and predicted relative reductions in the sum of squares are at most ftol.",
    ),
    (2, "Relative error between two consecutive iterates is at most xtol."),
    (3, "Conditions for status = 1 and status = 2 both hold."),
    (
        4,
        "The cosine of the angle between fvec and any column of the jacobian is at most gtol in absolute value.",
    ),
    (5, "The maximum number of iterations has been reached."),
    (
        6,
        "ftol is too small. No further reduction in the sum of squares is possible.",
    ),
    (
        7,
        "xtol is too small. No further improvement in the approximate solution x is possible.",
    ),
    (
        8,
        "gtol is too small. fvec is orthogonal to the columns of the jacobian to machine precision.",
    ),
    (-16, "The residual function produced non-finite values."),
];

impl SolverStatus {
    /// Numeric status code.
    pub fn code(self) -> i32 {
        match self {
            SolverStatus::ImproperInput => 0,
            SolverStatus::FtolConverged => 1,
            SolverStatus::XtolConverged => 2,
            SolverStatus::BothConverged => 3,
            SolverStatus::GtolConverged => 4,
            SolverStatus::MaxIterations => 5,
            SolverStatus::FtolTooSmall => 6,
            SolverStatus::XtolTooSmall => 7,
            SolverStatus::GtolTooSmall => 8,
            SolverStatus::NonFinite => -16,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(SolverStatus::ImproperInput),
            1 => Some(SolverStatus::FtolConverged),
            2 => Some(SolverStatus::XtolConverged),
            3 => Some(SolverStatus::BothConverged),
            4 => Some(SolverStatus::GtolConverged),
            5 => Some(SolverStatus::MaxIterations),
            6 => Some(SolverStatus::FtolTooSmall),
            7 => Some(SolverStatus::XtolTooSmall),
            8 => Some(SolverStatus::GtolTooSmall),
            -16 => Some(SolverStatus::NonFinite),
            _ => None,
        }
    }

    pub fn message(self) -> &'static str {
        status_message(self.code())
    }

    pub fn is_success(self) -> bool {
        !is_failure(self.code())
    }
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status {}: {}", self.code(), self.message())
    }
}

/// Look up the human-readable message of a status code.
pub fn status_message(code: i32) -> &'static str {
    STATUS_MESSAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, message)| *message)
        .unwrap_or("Unknown solver status.")
}

/// Status codes at or below zero are failures.
pub fn is_failure(code: i32) -> bool {
    code <= 0
}
