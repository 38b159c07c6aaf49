pub mod aggregator;
pub mod analyzer;

pub use aggregator::ActivityAggregator;
pub use analyzer::{AnalyzerSettings, WalletAnalyzer};
