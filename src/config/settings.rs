use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::scoring::ScoringPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub app: AppSettings,
    pub provider: ProviderSettings,
    pub pipeline: PipelineSettings,
    pub scoring: ScoringPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub version: String,
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub etherscan_api_url: String,
    /// Sourced from configuration or the RISK_SCORE_PROVIDER__ETHERSCAN_API_KEY
    /// environment variable; never embedded in code.
    pub etherscan_api_key: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Pause between wallets, to respect provider rate limits.
    pub delay_ms: u64,
    /// Results are checkpointed every this many wallets.
    pub checkpoint_interval: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app: AppSettings {
                name: "Wallet Risk Scorer".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                log_level: "info".to_string(),
            },
            provider: ProviderSettings {
                etherscan_api_url: "https://api.etherscan.io/api".to_string(),
                etherscan_api_key: String::new(),
                timeout_seconds: 30,
                max_retries: 3,
                retry_backoff_ms: 1_000,
            },
            pipeline: PipelineSettings {
                delay_ms: 500,
                checkpoint_interval: 10,
            },
            scoring: ScoringPolicy::default(),
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("RISK_SCORE").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::from(path.as_ref()))
            .build()?;

        s.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        self.scoring.validate()?;

        if self.pipeline.checkpoint_interval == 0 {
            return Err("Checkpoint interval must be at least 1".to_string());
        }
        if self.provider.etherscan_api_url.is_empty() {
            return Err("Provider API URL must not be empty".to_string());
        }

        Ok(())
    }
}
