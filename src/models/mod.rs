pub mod assessment;
pub mod error;
pub mod metrics;

pub use assessment::*;
pub use error::*;
pub use metrics::*;
