use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{ProcessingError, Result};
use crate::models::Frequency;

/// Values of one parameter, aligned with a time axis. `None` is a missing sample.
pub type Values = Vec<Option<f64>>;

/// A time axis plus named parameter arrays of the same length.
///
/// Serialises flat, as `{ "time": [...], "<param>": [...], ... }`, which is both the
/// shape of the archive API's `hourly` block and the `data` block of every output file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasurementSeries {
    pub time: Vec<String>,

    #[serde(flatten)]
    pub parameters: BTreeMap<String, Values>,
}

impl MeasurementSeries {
    pub fn new(time: Vec<String>) -> Self {
        Self {
            time,
            parameters: BTreeMap::new(),
        }
    }

    pub fn with_parameter(mut self, name: &str, values: Values) -> Self {
        self.parameters.insert(name.to_string(), values);
        self
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.parameters.keys().map(String::as_str)
    }

    pub fn get(&self, parameter: &str) -> Option<&Values> {
        self.parameters.get(parameter)
    }

    /// Every parameter array must be exactly as long as the time axis.
    pub fn validate_lengths(&self) -> Result<()> {
        let expected = self.time.len();
        for (name, values) in &self.parameters {
            if values.len() != expected {
                return Err(ProcessingError::SeriesLength {
                    parameter: name.clone(),
                    expected,
                    found: values.len(),
                });
            }
        }
        Ok(())
    }
}

/// The three averaged views of one entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrequencySeries {
    pub daily: MeasurementSeries,
    pub monthly: MeasurementSeries,
    pub yearly: MeasurementSeries,
}

impl FrequencySeries {
    pub fn get(&self, frequency: Frequency) -> &MeasurementSeries {
        match frequency {
            Frequency::Daily => &self.daily,
            Frequency::Monthly => &self.monthly,
            Frequency::Yearly => &self.yearly,
        }
    }

    pub fn set(&mut self, frequency: Frequency, series: MeasurementSeries) {
        match frequency {
            Frequency::Daily => self.daily = series,
            Frequency::Monthly => self.monthly = series,
            Frequency::Yearly => self.yearly = series,
        }
    }
}
