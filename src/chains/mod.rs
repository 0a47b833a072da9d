pub mod etherscan;
pub mod provider;
pub mod simulated;

pub use etherscan::EtherscanProvider;
pub use provider::ChainDataProvider;
pub use simulated::SimulatedProvider;
