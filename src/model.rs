//! Model function interface.
//!
//! A model function maps the independent axis and a flattened parameter
//! vector to predicted data values. The fitter treats it as opaque: it is
//! called, never inspected. Extra keyword options configured on the fitter
//! are handed to every evaluation through [`ModelOptions`].

use crate::error::Result;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A parametric model evaluated on a one-dimensional axis.
///
/// Any closure with the matching signature is a `ModelFunction`:
///
/// ```
/// use ndarray::{array, Array1};
/// use specfit_rs::model::{ModelFunction, ModelOptions};
///
/// let line = |x: &Array1<f64>, p: &[f64], _: &ModelOptions| -> specfit_rs::Result<Array1<f64>> {
///     Ok(x.mapv(|xi| p[0] * xi + p[1]))
/// };
///
/// let y = line.evaluate(&array![0.0, 1.0], &[2.0, 1.0], &ModelOptions::new()).unwrap();
/// assert_eq!(y, array![1.0, 3.0]);
/// ```
pub trait ModelFunction {
    /// Evaluate the model at each axis value.
    ///
    /// # Arguments
    ///
    /// * `x` - The independent axis values
    /// * `params` - The flattened parameter vector
    /// * `options` - Keyword options configured on the fitter
    ///
    /// # Returns
    ///
    /// * The predicted values, one per axis value
    fn evaluate(&self, x: &Array1<f64>, params: &[f64], options: &ModelOptions)
        -> Result<Array1<f64>>;
}

impl<F> ModelFunction for F
where
    F: Fn(&Array1<f64>, &[f64], &ModelOptions) -> Result<Array1<f64>>,
{
    fn evaluate(
        &self,
        x: &Array1<f64>,
        params: &[f64],
        options: &ModelOptions,
    ) -> Result<Array1<f64>> {
        self(x, params, options)
    }
}

/// Keyword options forwarded to the model function on every evaluation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelOptions {
    values: BTreeMap<String, Value>,
}

impl ModelOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an option, replacing any previous value under the same key.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.to_string(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
