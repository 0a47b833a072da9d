pub mod engine;
pub mod normalizer;
pub mod policy;

pub use engine::RiskEngine;
pub use normalizer::analyze_transactions;
pub use policy::{BucketRule, FactorPolicy, RatioAdjustment, ScoringPolicy, Step};
