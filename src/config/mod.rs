pub mod settings;

pub use settings::{AppSettings, PipelineSettings, ProviderSettings, Settings};
