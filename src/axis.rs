//! Spectral axis with optional unit metadata.
//!
//! Axis values may carry a unit string. When a fitter is configured with a
//! fit unit, a copy of the axis is rescaled into that unit before fitting.
//! Only linear rescaling between units of the same kind is supported.

use crate::error::{FitError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// The physical quantity a unit measures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Frequency,
    Wavelength,
    Velocity,
}

/// (name, kind, size of the unit in the kind's base unit)
static UNITS: &[(&str, UnitKind, f64)] = &[
    ("hz", UnitKind::Frequency, 1.0),
    ("khz", UnitKind::Frequency, 1e3),
    ("mhz", UnitKind::Frequency, 1e6),
    ("ghz", UnitKind::Frequency, 1e9),
    ("thz", UnitKind::Frequency, 1e12),
    ("m", UnitKind::Wavelength, 1.0),
    ("cm", UnitKind::Wavelength, 1e-2),
    ("mm", UnitKind::Wavelength, 1e-3),
    ("um", UnitKind::Wavelength, 1e-6),
    ("micron", UnitKind::Wavelength, 1e-6),
    ("microns", UnitKind::Wavelength, 1e-6),
    ("nm", UnitKind::Wavelength, 1e-9),
    ("angstrom", UnitKind::Wavelength, 1e-10),
    ("angstroms", UnitKind::Wavelength, 1e-10),
    ("a", UnitKind::Wavelength, 1e-10),
    ("m/s", UnitKind::Velocity, 1.0),
    ("cm/s", UnitKind::Velocity, 1e-2),
    ("km/s", UnitKind::Velocity, 1e3),
];

/// Look up a unit by name, ignoring case and surrounding whitespace.
pub fn unit_scale(unit: &str) -> Option<(UnitKind, f64)> {
    let key = unit.trim().to_ascii_lowercase();
    UNITS
        .iter()
        .find(|(name, _, _)| *name == key)
        .map(|&(_, kind, scale)| (kind, scale))
}

/// Independent-axis values of a spectrum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralAxis {
    pub values: Array1<f64>,
    #[serde(default)]
    pub units: Option<String>,
}

impl SpectralAxis {
    /// An axis without units.
    pub fn new(values: Array1<f64>) -> Self {
        Self {
            values,
            units: None,
        }
    }

    pub fn with_units(values: Array1<f64>, units: &str) -> Self {
        Self {
            values,
            units: Some(units.to_string()),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn units(&self) -> Option<&str> {
        self.units.as_deref()
    }

    /// Rescale the values into `unit` and record it as the axis unit.
    ///
    /// An axis without units is left unchanged.
    ///
    /// # Errors
    ///
    /// * `FitError::UnitConversion` if either unit is unknown or the units
    ///   measure different quantities
    pub fn convert_to_unit(&mut self, unit: &str, quiet: bool) -> Result<()> {
        let current = match &self.units {
            Some(current) => current.clone(),
            None => return Ok(()),
        };

        let (from_kind, from_scale) = unit_scale(&current)
            .ok_or_else(|| FitError::UnitConversion(format!("Unknown unit '{}'", current)))?;
        let (to_kind, to_scale) = unit_scale(unit)
            .ok_or_else(|| FitError::UnitConversion(format!("Unknown unit '{}'", unit)))?;

        if from_kind != to_kind {
            return Err(FitError::UnitConversion(format!(
                "Cannot convert {:?} unit '{}' to {:?} unit '{}'",
                from_kind, current, to_kind, unit
            )));
        }

        if !quiet {
            log::info!("Converting spectral axis from {} to {}", current, unit);
        }

        let factor = from_scale / to_scale;
        if factor != 1.0 {
            self.values.mapv_inplace(|v| v * factor);
        }
        self.units = Some(unit.to_string());
        Ok(())
    }
}

impl From<Array1<f64>> for SpectralAxis {
    fn from(values: Array1<f64>) -> Self {
        Self::new(values)
    }
}

impl From<Vec<f64>> for SpectralAxis {
    fn from(values: Vec<f64>) -> Self {
        Self::new(Array1::from(values))
    }
}
