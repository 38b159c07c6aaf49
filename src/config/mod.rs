/// Runtime configuration loaded from the environment
///
/// The RPC endpoint is the only required setting; everything else has a
/// validated default. An invalid or missing endpoint is fatal at
/// construction, before any remote call is attempted.

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::core::AnalysisError;

/// Which ledger transport the client is built on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Solana SDK nonblocking RPC client
    Sdk,
    /// Raw JSON-RPC over HTTP
    Http,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP(S) endpoint of the ledger RPC service
    pub rpc_url: String,
    pub transport: TransportKind,
    /// How many recent transactions one analysis inspects
    pub signature_window: usize,
    /// Frequent-transfer threshold (strictly-greater-than)
    pub transfer_threshold: u32,
    /// Per-call transport timeout in seconds
    pub rpc_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for everything except `SOLANA_RPC_URL`.
    pub fn from_env() -> Result<Self, AnalysisError> {
        let rpc_url = std::env::var("SOLANA_RPC_URL").map_err(|_| {
            AnalysisError::Configuration(
                "SOLANA_RPC_URL is not set. Point it at a Solana RPC endpoint.".to_string(),
            )
        })?;

        let transport = match std::env::var("WALLETSCOPE_TRANSPORT").ok().as_deref() {
            None | Some("sdk") => TransportKind::Sdk,
            Some("http") => TransportKind::Http,
            Some(other) => {
                return Err(AnalysisError::Configuration(format!(
                    "Unknown transport '{}', expected 'sdk' or 'http'",
                    other
                )))
            }
        };

        let config = Self {
            rpc_url,
            transport,
            signature_window: env_or_default("WALLETSCOPE_WINDOW", 100)?,
            transfer_threshold: env_or_default("WALLETSCOPE_TRANSFER_THRESHOLD", 3)?,
            rpc_timeout_secs: env_or_default("WALLETSCOPE_RPC_TIMEOUT_SECS", 30)?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.rpc_url.trim().is_empty() {
            return Err(AnalysisError::Configuration(
                "RPC endpoint URL is empty".to_string(),
            ));
        }

        let parsed = Url::parse(&self.rpc_url).map_err(|e| {
            AnalysisError::Configuration(format!(
                "Invalid RPC endpoint URL '{}': {}",
                self.rpc_url, e
            ))
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(AnalysisError::Configuration(format!(
                "RPC endpoint must be an http(s) URL, got scheme '{}'",
                parsed.scheme()
            )));
        }

        if self.signature_window == 0 {
            return Err(AnalysisError::Configuration(
                "Signature window must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }
}

fn env_or_default<V>(name: &str, default: V) -> Result<V, AnalysisError>
where
    V: FromStr,
    V::Err: Display,
{
    match std::env::var(name) {
        Ok(raw) => raw.parse().map_err(|e| {
            AnalysisError::Configuration(format!("Invalid value for {}: {}", name, e))
        }),
        Err(_) => Ok(default),
    }
}
