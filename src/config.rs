use std::time::Duration;

use config::{builder::DefaultState, Config as ConfigLoader, ConfigBuilder, Environment, File};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::utils::time::TimeUnit;

pub const DEFAULT_ENDPOINT: &str = "https://ismp.crpt.ru/api/v3/lk/documents/create";

const CONFIG_FILE: &str = "crpt";
const ENV_PREFIX: &str = "CRPT";

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpSettings {
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub pool_idle_timeout_secs: u64,
    pub https_only: bool,
}

impl HttpSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn pool_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.pool_idle_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // General
    pub log_level: String,
    pub log_format: LogFormat,

    // Throttling: at most `request_limit` requests per one `time_unit`
    pub time_unit: TimeUnit,
    pub request_limit: usize,

    // API
    pub endpoint: String,
    pub signature: String,

    pub http: HttpSettings,
}

impl Config {
    /// Loads configuration from defaults, optional `crpt.toml` and `CRPT_*` environment variables.
    ///
    /// Nested keys use a double underscore, e.g. `CRPT_HTTP__HTTPS_ONLY=false`.
    pub fn load() -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        Self::from_builder(
            ConfigLoader::builder()
                .add_source(File::with_name(CONFIG_FILE).required(false))
                .add_source(
                    Environment::with_prefix(ENV_PREFIX)
                        .prefix_separator("_")
                        .separator("__")
                        .try_parsing(true),
                ),
        )
    }

    /// Builds configuration on top of the defaults from any set of sources.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let config: Self = builder
            .set_default("log_level", "info")?
            .set_default("log_format", "pretty")?
            .set_default("time_unit", "minutes")?
            .set_default("request_limit", 5)?
            .set_default("endpoint", DEFAULT_ENDPOINT)?
            .set_default("signature", "exampleSignature")?
            .set_default("http.connect_timeout_ms", 2_000)?
            .set_default("http.request_timeout_ms", 10_000)?
            .set_default("http.pool_idle_timeout_secs", 90)?
            .set_default("http.https_only", true)?
            .build()?
            .try_deserialize()?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.request_limit == 0 {
            return Err(AppError::Init("request_limit must be greater than zero".into()));
        }

        if self.endpoint.trim().is_empty() {
            return Err(AppError::Init("endpoint must not be empty".into()));
        }

        Ok(())
    }

    /// Length of the throttling window.
    pub fn period(&self) -> Duration {
        self.time_unit.as_duration()
    }
}
