use thiserror::Error;

/// Failures talking to the weather archive. All of them are treated as transient.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("Invalid archive URL '{0}'")]
    InvalidUrl(String),

    #[error("Network request failed for {0}")]
    Request(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Undecodable archive response from {0}")]
    Decode(String, #[source] serde_json::Error),

    #[error("Archive response from {url} has no hourly data ({})", .reason.as_deref().unwrap_or("no reason given"))]
    MissingHourly { url: String, reason: Option<String> },

    #[error("Gave up after {attempts} attempts")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },
}
