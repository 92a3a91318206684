//! Layered pipeline configuration: built-in defaults, then an optional TOML file, then
//! `IRRADIANCE__SECTION__KEY` environment variables.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::fetch::RetryPolicy;
use crate::processors::{AlignmentPolicy, ArchiveWindow};
use crate::utils::constants::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PipelineConfig {
    /// Root of the `{parent}/{entity}` hierarchy
    pub data_root: PathBuf,

    #[validate(nested)]
    pub catalog: CatalogConfig,

    #[validate(nested)]
    pub fetch: FetchConfig,

    #[validate(nested)]
    pub retry: RetryConfig,

    #[validate(nested)]
    pub aggregation: AggregationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CatalogConfig {
    pub provinces_path: PathBuf,
    pub districts_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct FetchConfig {
    #[validate(url)]
    pub base_url: String,

    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    #[validate(length(min = 1))]
    pub parameters: Vec<String>,

    #[validate(range(min = 1))]
    pub timeout_secs: u64,

    pub request_delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RetryConfig {
    #[validate(range(min = 1))]
    pub max_attempts: u32,

    /// Ignore `max_attempts` and retry forever
    pub unbounded: bool,

    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,

    #[validate(range(min = 1.0))]
    pub multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AggregationConfig {
    pub alignment: AlignmentPolicy,

    #[validate(range(min = 1))]
    pub max_workers: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from(DEFAULT_DATA_ROOT),
            catalog: CatalogConfig {
                provinces_path: PathBuf::from(DEFAULT_PROVINCES_PATH),
                districts_path: PathBuf::from(DEFAULT_DISTRICTS_PATH),
            },
            fetch: FetchConfig {
                base_url: DEFAULT_ARCHIVE_URL.to_string(),
                start_date: parse_default_date(DEFAULT_START_DATE),
                end_date: parse_default_date(DEFAULT_END_DATE),
                parameters: DEFAULT_PARAMETERS.iter().map(|p| p.to_string()).collect(),
                timeout_secs: DEFAULT_TIMEOUT_SECS,
                request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
            },
            retry: RetryConfig {
                max_attempts: DEFAULT_MAX_ATTEMPTS,
                unbounded: false,
                initial_delay_ms: DEFAULT_RETRY_DELAY_MS,
                max_delay_ms: DEFAULT_MAX_RETRY_DELAY_MS,
                multiplier: DEFAULT_RETRY_MULTIPLIER,
            },
            aggregation: AggregationConfig {
                alignment: AlignmentPolicy::default(),
                max_workers: num_cpus::get(),
            },
        }
    }
}

fn parse_default_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap_or_default()
}

impl PipelineConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Like [`PipelineConfig::load`], with an explicit environment map in place of the
    /// process environment when `env` is given.
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<::config::Map<String, String>>,
    ) -> Result<Self> {
        let defaults = ::config::Config::try_from(&PipelineConfig::default()).map_err(config_error)?;
        let mut builder = ::config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(true));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("fetch.parameters")
                .try_parsing(true)
                .source(env),
        );

        let config: PipelineConfig = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(config_error)?;

        config.check()?;
        Ok(config)
    }

    pub fn check(&self) -> Result<()> {
        self.validate()?;

        if self.fetch.start_date > self.fetch.end_date {
            return Err(ProcessingError::Config(format!(
                "fetch.start_date {} is after fetch.end_date {}",
                self.fetch.start_date, self.fetch.end_date
            )));
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let initial = Duration::from_millis(self.retry.initial_delay_ms);
        let max = Duration::from_millis(self.retry.max_delay_ms);

        let policy = if self.retry.unbounded {
            RetryPolicy::unbounded(initial)
        } else {
            RetryPolicy::bounded(self.retry.max_attempts, initial)
        };
        policy.with_backoff(self.retry.multiplier, max)
    }

    pub fn archive_window(&self) -> ArchiveWindow {
        ArchiveWindow {
            start_date: self.fetch.start_date,
            end_date: self.fetch.end_date,
            parameters: self.fetch.parameters.clone(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.fetch.request_delay_ms)
    }
}

fn config_error(e: ::config::ConfigError) -> ProcessingError {
    ProcessingError::Config(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn no_env() -> Option<::config::Map<String, String>> {
        Some(::config::Map::new())
    }

    #[test]
    fn test_defaults_load() {
        let config = PipelineConfig::load_with_env(None, no_env()).unwrap();

        assert_eq!(config.data_root, PathBuf::from("Provinsi"));
        assert_eq!(config.fetch.start_date.to_string(), "2018-01-02");
        assert_eq!(config.fetch.end_date.to_string(), "2024-11-05");
        assert_eq!(
            config.fetch.parameters,
            vec![
                "shortwave_radiation",
                "diffuse_radiation",
                "direct_normal_irradiance"
            ]
        );
        assert_eq!(config.aggregation.alignment, AlignmentPolicy::Strict);
        assert_eq!(config.retry_policy().max_attempts, Some(5));
    }

    #[test]
    fn test_file_overlay() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
data_root = "out"

[fetch]
start_date = "2023-01-01"
end_date = "2023-12-31"
parameters = ["shortwave_radiation"]

[retry]
unbounded = true

[aggregation]
alignment = "positional"
"#
        )
        .unwrap();

        let config = PipelineConfig::load_with_env(Some(file.path()), no_env()).unwrap();

        assert_eq!(config.data_root, PathBuf::from("out"));
        assert_eq!(config.fetch.parameters, vec!["shortwave_radiation"]);
        assert_eq!(config.fetch.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.retry_policy().max_attempts, None);
        assert_eq!(config.aggregation.alignment, AlignmentPolicy::Positional);
    }

    #[test]
    fn test_environment_overlay() {
        let mut env = ::config::Map::new();
        env.insert("IRRADIANCE__DATA_ROOT".to_string(), "/srv/irradiance".to_string());
        env.insert("IRRADIANCE__RETRY__MAX_ATTEMPTS".to_string(), "9".to_string());
        env.insert(
            "IRRADIANCE__FETCH__PARAMETERS".to_string(),
            "shortwave_radiation,diffuse_radiation".to_string(),
        );

        let config = PipelineConfig::load_with_env(None, Some(env)).unwrap();

        assert_eq!(config.data_root, PathBuf::from("/srv/irradiance"));
        assert_eq!(config.retry.max_attempts, 9);
        assert_eq!(
            config.fetch.parameters,
            vec!["shortwave_radiation", "diffuse_radiation"]
        );
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = PipelineConfig::default();
        config.fetch.start_date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert!(matches!(config.check(), Err(ProcessingError::Config(_))));

        let mut config = PipelineConfig::default();
        config.fetch.parameters.clear();
        assert!(matches!(config.check(), Err(ProcessingError::Validation(_))));

        let mut config = PipelineConfig::default();
        config.retry.multiplier = 0.5;
        assert!(config.check().is_err());
    }

    #[test]
    fn test_retry_policy_from_config() {
        let config = PipelineConfig::default();
        let policy = config.retry_policy();

        assert_eq!(policy.delay_for(1), Duration::from_secs(5));
        assert_eq!(policy.delay_for(2), Duration::from_secs(10));
        assert_eq!(policy.delay_for(10), Duration::from_secs(60));
    }
}
