use chrono::NaiveDate;
use reqwest::Url;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

use crate::fetch::FetchError;
use crate::models::MeasurementSeries;

/// One archive query: a point, an inclusive date range and the hourly parameters wanted.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub parameters: Vec<String>,
}

impl ArchiveRequest {
    pub fn url(&self, base_url: &str) -> Result<Url, FetchError> {
        let mut url =
            Url::parse(base_url).map_err(|_| FetchError::InvalidUrl(base_url.to_string()))?;
        url.query_pairs_mut()
            .append_pair("latitude", &self.latitude.to_string())
            .append_pair("longitude", &self.longitude.to_string())
            .append_pair("start_date", &self.start_date.format("%Y-%m-%d").to_string())
            .append_pair("end_date", &self.end_date.format("%Y-%m-%d").to_string())
            .append_pair("hourly", &self.parameters.join(","));
        Ok(url)
    }
}

/// Anything that can produce an hourly series for a point.
pub trait HourlySource {
    fn fetch_hourly(
        &self,
        request: &ArchiveRequest,
    ) -> impl Future<Output = Result<MeasurementSeries, FetchError>> + Send;
}

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    #[serde(default)]
    hourly: Option<MeasurementSeries>,

    #[serde(default)]
    reason: Option<String>,
}

/// Extract the `hourly` block of an archive response body.
pub fn parse_archive_response(url: &str, body: &str) -> Result<MeasurementSeries, FetchError> {
    let response: ArchiveResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(url.to_string(), e))?;

    response.hourly.ok_or_else(|| FetchError::MissingHourly {
        url: url.to_string(),
        reason: response.reason,
    })
}

/// Client for the Open-Meteo historical weather archive.
pub struct OpenMeteoClient {
    client: reqwest::Client,
    base_url: String,
}

impl OpenMeteoClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }
}

impl HourlySource for OpenMeteoClient {
    async fn fetch_hourly(
        &self,
        request: &ArchiveRequest,
    ) -> Result<MeasurementSeries, FetchError> {
        let url = request.url(&self.base_url)?;
        let url_text = url.to_string();
        debug!(url = %url_text, "Requesting archive data");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Request(url_text.clone(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url_text,
                status,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Request(url_text.clone(), e))?;
        parse_archive_response(&url_text, &body)
    }
}
