use config as config_rs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "http://localhost:5328";

/// What a failed batch run does to results from an earlier completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedRunPolicy {
    #[default]
    KeepPrevious,
    ClearPrevious,
}

/// Cosmetic upload progress settings, in percentage points and milliseconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    pub step: u8,
    pub cap: u8,
    pub interval_ms: u64,
    pub reset_delay_ms: u64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self { step: 10, cap: 90, interval_ms: 200, reset_delay_ms: 1000 }
    }
}

impl ProgressConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn reset_delay(&self) -> Duration {
        Duration::from_millis(self.reset_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub progress: ProgressConfig,
    pub failed_run_policy: FailedRunPolicy,
    pub export_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: 30,
            progress: ProgressConfig::default(),
            failed_run_policy: FailedRunPolicy::default(),
            export_dir: PathBuf::from("."),
        }
    }
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    Missing(PathBuf),
    #[error("config error: {0}")]
    Config(#[from] config_rs::ConfigError),
    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Loads settings from defaults, an optional file, `SENTIMENT_*` environment
/// variables and finally the `--api-url` flag.
pub fn load_config(path: Option<&Path>, api_url: &Option<String>) -> Result<AppConfig, ConfigError> {
    let mut builder = config_rs::Config::builder();

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::Missing(path.to_path_buf()));
        }
        builder = builder.add_source(config_rs::File::from(path));
    }

    builder = builder.add_source(
        config_rs::Environment::with_prefix("SENTIMENT")
            .prefix_separator("_")
            .separator("__"),
    );

    // CLI flags take precedence
    if let Some(url) = api_url {
        builder = builder.set_override("api_base_url", url.clone())?;
    }

    let cfg: AppConfig = builder.build()?.try_deserialize()?;
    validate(&cfg)?;
    Ok(cfg)
}

fn validate(cfg: &AppConfig) -> Result<(), ConfigError> {
    if cfg.api_base_url.trim().is_empty() {
        return Err(ConfigError::Invalid("api_base_url must not be empty".into()));
    }
    let p = &cfg.progress;
    if p.step == 0 || p.cap > 100 || p.interval_ms == 0 {
        return Err(ConfigError::Invalid(format!(
            "progress step must be positive, cap at most 100 and interval non-zero (got step={}, cap={}, interval_ms={})",
            p.step, p.cap, p.interval_ms
        )));
    }
    Ok(())
}
