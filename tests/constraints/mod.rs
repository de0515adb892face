//! Integration tests for parameter constraints
//!
//! These tests run the default solver through the fitter with limited, fixed
//! and tied parameters, and check how overrides and records persist.

// Limits, fixed flags and tie expressions
mod limits_and_ties;

// Per-fit overrides and their persistence across calls
mod overrides;

// Parameter records saved to and loaded from JSON
mod persistence;
