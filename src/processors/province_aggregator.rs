use clap::ValueEnum;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{error, info};

use crate::error::{ProcessingError, Result};
use crate::models::{Frequency, FrequencySeries, MeasurementSeries};
use crate::readers::SeriesReader;
use crate::utils::progress::ProgressReporter;
use crate::writers::SeriesWriter;

/// What to do when a child's buckets do not line up with the first child's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentPolicy {
    /// Reject the parent when any child differs in time keys or parameters
    #[default]
    Strict,
    /// Join by index against the first child; anything missing counts as null
    Positional,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParentOutcome {
    pub parent_name: String,
    pub children: Vec<String>,
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Default)]
pub struct AggregationReport {
    pub succeeded: Vec<ParentOutcome>,
    /// Parents whose aggregate already matches their current children
    pub skipped: Vec<String>,
    pub failed: Vec<(String, ProcessingError)>,
}

impl AggregationReport {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.skipped.len() + self.failed.len()
    }

    pub fn generate_summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("=== Aggregation Report ===\n");
        summary.push_str(&format!("Parents processed: {}\n", self.total()));
        summary.push_str(&format!("Aggregated: {}\n", self.succeeded.len()));
        summary.push_str(&format!("Already complete: {}\n", self.skipped.len()));
        summary.push_str(&format!("Failed: {}\n", self.failed.len()));

        for (parent, e) in &self.failed {
            summary.push_str(&format!("  ✗ {}: {}\n", parent, e));
        }
        summary
    }
}

/// Average a parent's children into one series for a single frequency.
///
/// Time keys and parameters come from the first child. At each index, null or absent
/// child values add nothing to the sum, yet the sum is always divided by the total
/// number of children.
pub fn aggregate_series(
    parent_name: &str,
    frequency: Frequency,
    children: &[(String, MeasurementSeries)],
    alignment: AlignmentPolicy,
) -> Result<MeasurementSeries> {
    let Some((_, first)) = children.first() else {
        return Err(ProcessingError::NoChildren(parent_name.to_string()));
    };

    if alignment == AlignmentPolicy::Strict {
        for (child_name, series) in children {
            check_alignment(first, series).map_err(|details| {
                ProcessingError::MisalignedBuckets {
                    parent: parent_name.to_string(),
                    child: child_name.clone(),
                    frequency: frequency.to_string(),
                    details,
                }
            })?;
        }
    }

    let bucket_count = first.time.len();
    let divisor = children.len() as f64;
    let mut output = MeasurementSeries::new(first.time.clone());

    for parameter in first.parameters.keys() {
        let mut sums = vec![0.0; bucket_count];

        for (_, series) in children {
            let Some(values) = series.get(parameter) else {
                continue;
            };
            for (sum, value) in sums.iter_mut().zip(values.iter()) {
                if let Some(v) = value {
                    *sum += v;
                }
            }
        }

        output.parameters.insert(
            parameter.clone(),
            sums.into_iter().map(|sum| Some(sum / divisor)).collect(),
        );
    }

    Ok(output)
}

fn check_alignment(
    first: &MeasurementSeries,
    series: &MeasurementSeries,
) -> std::result::Result<(), String> {
    if series.time.len() != first.time.len() {
        return Err(format!(
            "expected {} buckets, found {}",
            first.time.len(),
            series.time.len()
        ));
    }

    if let Some(i) = first
        .time
        .iter()
        .zip(series.time.iter())
        .position(|(a, b)| a != b)
    {
        return Err(format!(
            "bucket {} is '{}', expected '{}'",
            i, series.time[i], first.time[i]
        ));
    }

    let expected: BTreeSet<&str> = first.parameter_names().collect();
    let found: BTreeSet<&str> = series.parameter_names().collect();
    if expected != found {
        return Err(format!(
            "parameters {:?} differ from {:?}",
            found, expected
        ));
    }

    series.validate_lengths().map_err(|e| e.to_string())
}

/// Builds parent-level files from the child files already on disk.
pub struct ProvinceAggregator {
    reader: SeriesReader,
    writer: SeriesWriter,
    alignment: AlignmentPolicy,
    max_workers: usize,
    force: bool,
}

impl ProvinceAggregator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            reader: SeriesReader::new(root.clone()),
            writer: SeriesWriter::new(root),
            alignment: AlignmentPolicy::default(),
            max_workers: 1,
            force: false,
        }
    }

    pub fn with_alignment(mut self, alignment: AlignmentPolicy) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    /// Rebuild parents even when their manifest matches the current children
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    fn is_up_to_date(&self, parent_name: &str) -> bool {
        match self.reader.list_children(parent_name) {
            Ok(children) => {
                !children.is_empty() && self.reader.is_parent_complete(parent_name, &children)
            }
            Err(_) => false,
        }
    }

    /// Aggregate one parent. Every child file is read before anything is written, so a
    /// missing or malformed child leaves no partial aggregate behind.
    pub fn aggregate_parent(&self, parent_name: &str) -> Result<ParentOutcome> {
        let children = self.reader.list_children(parent_name)?;
        if children.is_empty() {
            return Err(ProcessingError::NoChildren(parent_name.to_string()));
        }

        let mut aggregate = FrequencySeries::default();
        for frequency in Frequency::ALL {
            let mut child_series = Vec::with_capacity(children.len());
            for child in &children {
                let record = self.reader.read_entity(parent_name, child, frequency)?;
                child_series.push((child.clone(), record.data));
            }

            let series = aggregate_series(parent_name, frequency, &child_series, self.alignment)?;
            aggregate.set(frequency, series);
        }

        let files = self.writer.write_aggregate(parent_name, &children, &aggregate)?;
        info!(parent = %parent_name, children = children.len(), "Aggregated parent");

        Ok(ParentOutcome {
            parent_name: parent_name.to_string(),
            children,
            files,
        })
    }

    /// Aggregate every parent directory under the root (or just `only`).
    ///
    /// A failure is fatal for its parent only; the others still run.
    pub fn aggregate_all(
        &self,
        only: Option<&str>,
        progress: Option<&ProgressReporter>,
    ) -> Result<AggregationReport> {
        let parents = match only {
            Some(name) => vec![name.to_string()],
            None => self.reader.list_parents()?,
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ProcessingError::Config(e.to_string()))?;

        let results: Vec<(String, Result<Option<ParentOutcome>>)> = pool.install(|| {
            parents
                .par_iter()
                .map(|parent| {
                    let result = if !self.force && self.is_up_to_date(parent) {
                        info!(parent = %parent, "Already aggregated, skipping");
                        Ok(None)
                    } else {
                        self.aggregate_parent(parent).map(Some)
                    };
                    if let Some(p) = progress {
                        p.advance(parent);
                    }
                    (parent.clone(), result)
                })
                .collect()
        });

        let mut report = AggregationReport::default();
        for (parent, result) in results {
            match result {
                Ok(Some(outcome)) => report.succeeded.push(outcome),
                Ok(None) => report.skipped.push(parent),
                Err(e) => {
                    error!(parent = %parent, error = %e, "Aggregation failed");
                    report.failed.push((parent, e));
                }
            }
        }

        Ok(report)
    }

    pub fn parent_names(&self) -> Result<Vec<String>> {
        self.reader.list_parents()
    }
}
