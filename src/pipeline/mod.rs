pub mod runner;
pub mod store;
pub mod summary;

pub use runner::{BatchPipeline, PipelineOptions, WalletStage};
pub use store::{read_wallets, write_results, ResultRow};
pub use summary::RunSummary;
