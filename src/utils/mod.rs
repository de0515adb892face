//! Utility functions and helpers for the specfit-rs library.

pub mod finite_difference;
pub mod format;
pub mod matrix_convert;

// Re-export commonly used utilities
pub use finite_difference::jacobian;
pub use format::format_g;
pub use matrix_convert::{
    nalgebra_to_ndarray, nalgebra_vec_to_ndarray, ndarray_to_nalgebra, ndarray_vec_to_nalgebra,
};
