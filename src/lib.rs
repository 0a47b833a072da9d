pub mod chains;
pub mod config;
pub mod models;
pub mod pipeline;
pub mod scoring;

pub use config::Settings;
pub use models::{
    BalanceSnapshot, ProtocolUsage, Result, RiskAssessment, RiskCategory, RiskScoreError,
    TransactionMetrics,
};
pub use pipeline::{BatchPipeline, PipelineOptions, RunSummary};
pub use scoring::{RiskEngine, ScoringPolicy};
