use thiserror::Error;

#[derive(Error, Debug)]
pub enum RiskScoreError {
    #[error("Provider error during {stage}: {message}")]
    Provider { stage: String, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Preflight check failed: {0}")]
    Preflight(String),

    #[error("Risk computation failed for {wallet}: {message}")]
    Computation { wallet: String, message: String },
}

pub type Result<T> = std::result::Result<T, RiskScoreError>;
