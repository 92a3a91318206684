use chrono::NaiveDate;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::error::{ProcessingError, Result};
use crate::fetch::{ArchiveRequest, HourlySource, RetryPolicy};
use crate::models::EntityMetadata;
use crate::processors::BucketAverager;
use crate::readers::{RegionCatalog, SeriesReader};
use crate::utils::progress::ProgressReporter;
use crate::writers::SeriesWriter;

/// Date range and hourly parameters requested for every entity.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub parameters: Vec<String>,
}

impl ArchiveWindow {
    fn request_for(&self, metadata: &EntityMetadata) -> ArchiveRequest {
        ArchiveRequest {
            latitude: metadata.latitude,
            longitude: metadata.longitude,
            start_date: self.start_date,
            end_date: self.end_date,
            parameters: self.parameters.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub struct IngestSummary {
    pub written: Vec<String>,
    pub already_complete: Vec<String>,
    pub unresolved: Vec<String>,
    pub failed: Vec<(String, ProcessingError)>,
}

impl IngestSummary {
    pub fn generate_summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("=== Ingest Report ===\n");
        summary.push_str(&format!("Written: {}\n", self.written.len()));
        summary.push_str(&format!("Already complete: {}\n", self.already_complete.len()));
        summary.push_str(&format!("Missing coordinates: {}\n", self.unresolved.len()));
        summary.push_str(&format!("Failed: {}\n", self.failed.len()));

        for (entity, e) in &self.failed {
            summary.push_str(&format!("  ✗ {}: {}\n", entity, e));
        }
        summary
    }
}

/// Sequential fetch → group → average → write driver over a region catalog.
pub struct IngestPipeline<S: HourlySource> {
    source: S,
    window: ArchiveWindow,
    reader: SeriesReader,
    writer: SeriesWriter,
    averager: BucketAverager,
    retry: RetryPolicy,
    request_delay: Duration,
    force: bool,
}

impl<S: HourlySource> IngestPipeline<S> {
    pub fn new(source: S, window: ArchiveWindow, root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            source,
            window,
            reader: SeriesReader::new(root.clone()),
            writer: SeriesWriter::new(root),
            averager: BucketAverager::new(),
            retry: RetryPolicy::default(),
            request_delay: Duration::ZERO,
            force: false,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_request_delay(mut self, request_delay: Duration) -> Self {
        self.request_delay = request_delay;
        self
    }

    /// Reprocess entities even when their manifest says they are complete
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Fetch, average and write one entity.
    pub async fn ingest_entity(&self, metadata: &EntityMetadata) -> Result<Vec<PathBuf>> {
        let request = self.window.request_for(metadata);
        let label = format!("{}/{}", metadata.parent_name, metadata.entity_name);

        let hourly = self
            .retry
            .run(&label, |_| self.source.fetch_hourly(&request))
            .await?;

        let summary = self.averager.summarise(&hourly)?;
        self.writer.write_entity(metadata, &summary)
    }

    /// Process every entity of the catalog (or of one parent), one at a time.
    pub async fn run(
        &self,
        catalog: &RegionCatalog,
        only_parent: Option<&str>,
        progress: Option<&ProgressReporter>,
    ) -> Result<IngestSummary> {
        let parents: Vec<_> = match only_parent {
            Some(name) => vec![catalog.parent(name).ok_or_else(|| {
                ProcessingError::Config(format!("Parent '{}' is not in the catalog", name))
            })?],
            None => catalog.parents().iter().collect(),
        };

        let mut summary = IngestSummary::default();
        let mut fetched_any = false;

        for parent in parents {
            info!(parent = %parent.name, entities = parent.children.len(), "Processing parent");

            for entity in &parent.children {
                let label = format!("{}/{}", parent.name, entity.name);
                if let Some(p) = progress {
                    p.advance(&entity.name);
                }

                let Some(metadata) = entity.metadata() else {
                    warn!(entity = %label, "Skipping entity without resolved coordinates");
                    summary.unresolved.push(label);
                    continue;
                };

                if !self.force && self.reader.is_entity_complete(&parent.name, &entity.name) {
                    info!(entity = %label, "Already complete, skipping");
                    summary.already_complete.push(label);
                    continue;
                }

                if fetched_any && !self.request_delay.is_zero() {
                    tokio::time::sleep(self.request_delay).await;
                }
                fetched_any = true;

                match self.ingest_entity(&metadata).await {
                    Ok(_) => {
                        info!(entity = %label, "Data saved");
                        summary.written.push(label);
                    }
                    Err(e) => {
                        error!(entity = %label, error = %e, "Entity failed");
                        summary.failed.push((label, e));
                    }
                }
            }
        }

        Ok(summary)
    }
}
