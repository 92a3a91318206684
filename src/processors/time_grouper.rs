use crate::error::Result;
use crate::models::{BucketKey, Frequency, MeasurementSeries, Values};
use std::collections::{BTreeMap, HashMap};

/// Raw samples that share one bucket key, in original order.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeBucket {
    pub key: BucketKey,
    pub time: Vec<String>,
    pub values: BTreeMap<String, Values>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupedSeries {
    pub frequency: Frequency,
    pub parameters: Vec<String>,
    pub buckets: Vec<TimeBucket>,
}

impl GroupedSeries {
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Bucket keys rendered as they appear in output files
    pub fn labels(&self) -> Vec<String> {
        self.buckets.iter().map(|b| b.key.to_string()).collect()
    }
}

pub struct TimeGrouper;

impl TimeGrouper {
    pub fn new() -> Self {
        Self
    }

    /// Partition a series into buckets of the given frequency.
    ///
    /// Buckets are created lazily on their first sample and keep first-seen order. A
    /// parameter array that does not match the time axis, or a timestamp that cannot be
    /// read, rejects the whole series.
    pub fn group(&self, series: &MeasurementSeries, frequency: Frequency) -> Result<GroupedSeries> {
        series.validate_lengths()?;

        let parameters: Vec<String> = series.parameter_names().map(str::to_string).collect();
        let mut buckets: Vec<TimeBucket> = Vec::new();
        let mut index: HashMap<BucketKey, usize> = HashMap::new();

        for (i, timestamp) in series.time.iter().enumerate() {
            let key = frequency.bucket_key(timestamp)?;

            let slot = *index.entry(key).or_insert_with(|| {
                buckets.push(TimeBucket {
                    key,
                    time: Vec::new(),
                    values: parameters
                        .iter()
                        .map(|name| (name.clone(), Vec::new()))
                        .collect(),
                });
                buckets.len() - 1
            });

            let bucket = &mut buckets[slot];
            bucket.time.push(timestamp.clone());
            for (name, values) in &series.parameters {
                if let Some(samples) = bucket.values.get_mut(name) {
                    samples.push(values[i]);
                }
            }
        }

        Ok(GroupedSeries {
            frequency,
            parameters,
            buckets,
        })
    }
}

impl Default for TimeGrouper {
    fn default() -> Self {
        Self::new()
    }
}
