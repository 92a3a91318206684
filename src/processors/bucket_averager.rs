use tracing::warn;

use crate::error::Result;
use crate::models::{Frequency, FrequencySeries, MeasurementSeries};
use crate::processors::time_grouper::{GroupedSeries, TimeGrouper};

pub struct BucketAverager;

impl BucketAverager {
    pub fn new() -> Self {
        Self
    }

    /// One arithmetic mean per bucket and parameter, paired with the bucket labels.
    pub fn average(&self, grouped: &GroupedSeries) -> MeasurementSeries {
        let mut output = MeasurementSeries::new(grouped.labels());

        for parameter in &grouped.parameters {
            let means = grouped
                .buckets
                .iter()
                .map(|bucket| {
                    let samples = bucket.values.get(parameter).map_or(&[][..], Vec::as_slice);
                    let average = mean(samples);
                    if average.is_none() {
                        warn!(
                            parameter = %parameter,
                            frequency = %grouped.frequency,
                            bucket = %bucket.key,
                            nulls = samples.iter().filter(|v| v.is_none()).count(),
                            samples = samples.len(),
                            "Bucket average is null"
                        );
                    }
                    average
                })
                .collect();
            output.parameters.insert(parameter.clone(), means);
        }

        output
    }

    /// Group and average a raw hourly series at every frequency.
    pub fn summarise(&self, hourly: &MeasurementSeries) -> Result<FrequencySeries> {
        let grouper = TimeGrouper::new();
        let mut summary = FrequencySeries::default();

        for frequency in Frequency::ALL {
            let grouped = grouper.group(hourly, frequency)?;
            summary.set(frequency, self.average(&grouped));
        }

        Ok(summary)
    }
}

impl Default for BucketAverager {
    fn default() -> Self {
        Self::new()
    }
}

/// Mean of a bucket's samples. A missing sample makes the whole bucket missing; nulls are
/// only ever resolved at province aggregation.
fn mean(samples: &[Option<f64>]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }

    let mut sum = 0.0;
    for sample in samples {
        sum += (*sample)?;
    }
    Some(sum / samples.len() as f64)
}
