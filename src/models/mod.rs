pub mod entity;
pub mod frequency;
pub mod manifest;
pub mod series;

pub use entity::{EntityMetadata, EntityRecord, ParentAggregateRecord, SeriesFile};
pub use frequency::{parse_timestamp_date, BucketKey, Frequency};
pub use manifest::{Manifest, ManifestKind};
pub use series::{FrequencySeries, MeasurementSeries, Values};
