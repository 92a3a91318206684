use std::path::Path;

use crate::error::{ProcessingError, Result};
use crate::models::{MeasurementSeries, SeriesFile};
use crate::readers::series_reader::read_json;

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStatistics {
    pub name: String,
    pub kind: FileKind,
    pub bucket_count: usize,
    pub time_range: Option<(String, String)>,
    pub parameters: Vec<ParameterStats>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Entity,
    Aggregate { num_children: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterStats {
    pub name: String,
    pub count: usize,
    pub nulls: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
}

impl ParameterStats {
    pub fn null_percentage(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        (self.nulls as f64 / self.count as f64) * 100.0
    }
}

pub struct SeriesAnalyzer;

impl SeriesAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze_file(&self, path: &Path) -> Result<SeriesStatistics> {
        let file: SeriesFile = read_json(path)?;
        self.analyze(&file)
    }

    pub fn analyze(&self, file: &SeriesFile) -> Result<SeriesStatistics> {
        let data = file.data();
        data.validate_lengths()?;

        if data.is_empty() {
            return Err(ProcessingError::InvalidFormat(format!(
                "{} contains no time buckets",
                file.name()
            )));
        }

        let kind = match file {
            SeriesFile::Entity(_) => FileKind::Entity,
            SeriesFile::Aggregate(r) => FileKind::Aggregate {
                num_children: r.num_children,
            },
        };

        let time_range = match (data.time.first(), data.time.last()) {
            (Some(first), Some(last)) => Some((first.clone(), last.clone())),
            _ => None,
        };

        Ok(SeriesStatistics {
            name: file.name().to_string(),
            kind,
            bucket_count: data.len(),
            time_range,
            parameters: parameter_stats(data),
        })
    }
}

fn parameter_stats(data: &MeasurementSeries) -> Vec<ParameterStats> {
    data.parameters
        .iter()
        .map(|(name, values)| {
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            let mut sum = 0.0;
            let mut present = 0usize;

            for v in values.iter().flatten() {
                min = min.min(*v);
                max = max.max(*v);
                sum += v;
                present += 1;
            }

            let (min, max, mean) = if present > 0 {
                (Some(min), Some(max), Some(sum / present as f64))
            } else {
                (None, None, None)
            };

            ParameterStats {
                name: name.clone(),
                count: values.len(),
                nulls: values.len() - present,
                min,
                max,
                mean,
            }
        })
        .collect()
}

fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "no values".to_string(),
    }
}

impl SeriesStatistics {
    pub fn summary(&self) -> String {
        let kind = match self.kind {
            FileKind::Entity => "entity".to_string(),
            FileKind::Aggregate { num_children } => {
                format!("aggregate of {} children", num_children)
            }
        };
        let range = match &self.time_range {
            Some((first, last)) => format!("{} to {}", first, last),
            None => "empty".to_string(),
        };

        format!(
            "Series: {} ({})\n\
            Buckets: {}\n\
            Time Range: {}\n\
            Parameters: {}",
            self.name,
            kind,
            self.bucket_count,
            range,
            self.parameters.len()
        )
    }

    pub fn detailed_summary(&self) -> String {
        let mut out = self.summary();
        out.push_str("\n\nPer-parameter statistics:");

        for p in &self.parameters {
            out.push_str(&format!(
                "\n- {}: min={}, mean={}, max={}, nulls={}/{} ({:.1}%)",
                p.name,
                format_value(p.min),
                format_value(p.mean),
                format_value(p.max),
                p.nulls,
                p.count,
                p.null_percentage()
            ));
        }
        out
    }
}

impl Default for SeriesAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
