pub mod bucket_averager;
pub mod ingest_pipeline;
pub mod province_aggregator;
pub mod time_grouper;

pub use bucket_averager::BucketAverager;
pub use ingest_pipeline::{ArchiveWindow, IngestPipeline, IngestSummary};
pub use province_aggregator::{
    aggregate_series, AggregationReport, AlignmentPolicy, ParentOutcome, ProvinceAggregator,
};
pub use time_grouper::{GroupedSeries, TimeBucket, TimeGrouper};
