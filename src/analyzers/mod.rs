pub mod series_analyzer;

pub use series_analyzer::{FileKind, ParameterStats, SeriesAnalyzer, SeriesStatistics};
