/// Error taxonomy for the wallet analysis pipeline

use thiserror::Error;

/// Errors surfaced by configuration, the ledger client, and the analysis
/// facade.
///
/// Only `InvalidAddress` and `Configuration` are fatal to a caller of
/// `analyze`; `RemoteQuery` is caught at the facade boundary and degraded
/// into a null/empty report field.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid wallet address: {0}")]
    InvalidAddress(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("RPC query '{method}' failed after {attempts} attempts: {message}")]
    RemoteQuery {
        method: &'static str,
        attempts: u32,
        message: String,
    },
}
