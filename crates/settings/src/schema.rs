//! The settings file format
//!
//! Calibrations are accepted in two shapes. Explicit rows:
//!
//! ```json
//! [
//!   {"kind": "static", "name": "FluoroScope 5x", "pixels_per_unit": 0.9058, "unit": "um"},
//!   {"kind": "provider", "provider": "jeol_sem"}
//! ]
//! ```
//!
//! or four parallel lists, where a provider row repeats the same handle
//! in every list:
//!
//! ```json
//! {
//!   "names": ["FluoroScope 5x", {"provider": "jeol_sem"}],
//!   "cals": [0.9058, {"provider": "jeol_sem"}],
//!   "units": ["um", {"provider": "jeol_sem"}],
//!   "aspect_ratio": [1, {"provider": "jeol_sem"}]
//! }
//! ```

use crate::ConfigError;
use mscope_core::{AnnotationStyle, CalibrationRegistry, CalibrationSource, JeolSemCalibration};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Calibration providers that can be named in the settings file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    JeolSem,
}

impl ProviderKind {
    fn source(self) -> CalibrationSource {
        match self {
            ProviderKind::JeolSem => CalibrationSource::provider(JeolSemCalibration::new()),
        }
    }
}

fn unit_aspect() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CalibrationRow {
    Static {
        name: String,
        pixels_per_unit: f64,
        unit: String,
        #[serde(default = "unit_aspect")]
        aspect_ratio: f64,
    },
    Provider {
        provider: ProviderKind,
    },
}

impl CalibrationRow {
    pub fn fixed(name: &str, pixels_per_unit: f64, unit: &str) -> Self {
        CalibrationRow::Static {
            name: name.to_owned(),
            pixels_per_unit,
            unit: unit.to_owned(),
            aspect_ratio: 1.0,
        }
    }

    fn source(&self) -> CalibrationSource {
        match self {
            CalibrationRow::Static { name, pixels_per_unit, unit, aspect_ratio } => {
                CalibrationSource::fixed(name.clone(), *pixels_per_unit, unit.clone(), *aspect_ratio)
            }
            CalibrationRow::Provider { provider } => provider.source(),
        }
    }
}

/// One slot of a parallel list: a value or a provider handle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListSlot<T> {
    Provider { provider: ProviderKind },
    Value(T),
}

/// Parallel-lists layout; `null` marks a missing value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationLists {
    pub names: Vec<Option<ListSlot<String>>>,
    pub cals: Vec<Option<ListSlot<f64>>>,
    pub units: Vec<Option<ListSlot<String>>>,
    pub aspect_ratio: Vec<Option<ListSlot<f64>>>,
}

impl CalibrationLists {
    /// Check the lists against each other and convert them to rows
    pub fn to_rows(&self) -> Result<Vec<CalibrationRow>, ConfigError> {
        let len = self.names.len();
        if [self.cals.len(), self.units.len(), self.aspect_ratio.len()].iter().any(|&n| n != len) {
            return Err(ConfigError::LengthMismatch {
                names: self.names.len(),
                cals: self.cals.len(),
                units: self.units.len(),
                aspect_ratio: self.aspect_ratio.len(),
            });
        }

        (0..len).map(|index| self.row(index)).collect()
    }

    fn row(&self, index: usize) -> Result<CalibrationRow, ConfigError> {
        let name = &self.names[index];
        let cal = &self.cals[index];
        let unit = &self.units[index];
        let aspect = &self.aspect_ratio[index];

        let providers =
            [provider_of(name), provider_of(cal), provider_of(unit), provider_of(aspect)];
        if let Some(first) = providers.iter().flatten().next() {
            return if providers.iter().all(|p| p.as_ref() == Some(first)) {
                Ok(CalibrationRow::Provider { provider: *first })
            } else {
                Err(ConfigError::InconsistentProvider { index })
            };
        }

        Ok(CalibrationRow::Static {
            name: value_of(name, index, "names")?.clone(),
            pixels_per_unit: *value_of(cal, index, "cals")?,
            unit: value_of(unit, index, "units")?.clone(),
            aspect_ratio: *value_of(aspect, index, "aspect_ratio")?,
        })
    }
}

fn provider_of<T>(slot: &Option<ListSlot<T>>) -> Option<ProviderKind> {
    match slot {
        Some(ListSlot::Provider { provider }) => Some(*provider),
        _ => None,
    }
}

fn value_of<'a, T>(
    slot: &'a Option<ListSlot<T>>,
    index: usize,
    field: &'static str,
) -> Result<&'a T, ConfigError> {
    match slot {
        Some(ListSlot::Value(value)) => Ok(value),
        _ => Err(ConfigError::MissingValue { index, field }),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CalibrationTable {
    Rows(Vec<CalibrationRow>),
    Lists(CalibrationLists),
}

// Picked by JSON shape so that a bad row reports its own field error.
impl<'de> Deserialize<'de> for CalibrationTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| {
                    serde_json::from_value(item)
                        .map_err(|err| D::Error::custom(format!("calibration {index}: {err}")))
                })
                .collect::<Result<_, _>>()
                .map(CalibrationTable::Rows),
            value @ Value::Object(_) => {
                serde_json::from_value(value).map(CalibrationTable::Lists).map_err(D::Error::custom)
            }
            _ => Err(D::Error::custom(
                "calibrations must be a list of rows or an object of parallel lists",
            )),
        }
    }
}

impl CalibrationTable {
    pub fn to_rows(&self) -> Result<Vec<CalibrationRow>, ConfigError> {
        match self {
            CalibrationTable::Rows(rows) => Ok(rows.clone()),
            CalibrationTable::Lists(lists) => lists.to_rows(),
        }
    }
}

impl Default for CalibrationTable {
    fn default() -> Self {
        CalibrationTable::Rows(vec![
            CalibrationRow::fixed("FluoroScope 5x", 0.9058, "um"),
            CalibrationRow::fixed("FluoroScope 20x", 1.81, "um"),
            CalibrationRow::fixed("FluoroScope 50x", 4.525, "um"),
            CalibrationRow::fixed("FluoroScope 100x", 9.0667, "um"),
            CalibrationRow::fixed("FluoroScope 150x", 13.5333, "um"),
            CalibrationRow::fixed("Olympus DUV 100x", 54.6875, "um"),
        ])
    }
}

/// Everything read from the settings file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub calibrations: CalibrationTable,
    pub style: AnnotationStyle,
}

impl Settings {
    /// Validate the calibrations and build the registry shown to the user
    pub fn registry(&self) -> Result<CalibrationRegistry, ConfigError> {
        let sources = self.calibrations.to_rows()?.iter().map(CalibrationRow::source).collect();
        CalibrationRegistry::new(sources).ok_or(ConfigError::EmptyRegistry)
    }
}
