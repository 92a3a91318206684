/// Output file names
pub const MANIFEST_FILE: &str = "_manifest.json";
pub const JSON_EXTENSION: &str = "json";

/// Archive API defaults
pub const DEFAULT_ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";
pub const DEFAULT_START_DATE: &str = "2018-01-02";
pub const DEFAULT_END_DATE: &str = "2024-11-05";
pub const DEFAULT_PARAMETERS: [&str; 3] = [
    "shortwave_radiation",
    "diffuse_radiation",
    "direct_normal_irradiance",
];
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 1000;

/// Retry defaults
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 5000;
pub const DEFAULT_MAX_RETRY_DELAY_MS: u64 = 60_000;
pub const DEFAULT_RETRY_MULTIPLIER: f64 = 2.0;

/// Layout defaults
pub const DEFAULT_DATA_ROOT: &str = "Provinsi";
pub const DEFAULT_PROVINCES_PATH: &str = "geojson/prov-37-simplified.geojson";
pub const DEFAULT_DISTRICTS_PATH: &str = "geojson/kab-37.geojson";

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "IRRADIANCE";
