pub mod client;
pub mod error;
pub mod retry;

pub use client::{parse_archive_response, ArchiveRequest, HourlySource, OpenMeteoClient};
pub use error::FetchError;
pub use retry::RetryPolicy;
