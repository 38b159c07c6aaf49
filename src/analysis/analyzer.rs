/// Wallet analysis facade
///
/// Validates the address, then runs the balance lookup and the activity
/// aggregation with per-sub-analysis failure isolation: once validation
/// passes, `analyze` always returns a report, populated to whatever extent
/// remote data was obtainable. A null balance or empty list marks a failed
/// query, not a failed analysis.

use tracing::{info, warn};

use super::aggregator::{frequent_transfers, token_purchases, ActivityAggregator};
use crate::client::{LedgerClient, LedgerTransport};
use crate::core::{is_valid_address, AnalysisError, WalletAnalysisReport};

/// Tunable knobs for one analysis run
#[derive(Debug, Clone)]
pub struct AnalyzerSettings {
    /// How many recent transactions to inspect
    pub window_size: usize,
    /// A destination is "frequent" above this many received transfers
    pub transfer_threshold: u32,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            window_size: 100,
            transfer_threshold: 3,
        }
    }
}

pub struct WalletAnalyzer<T> {
    client: LedgerClient<T>,
    settings: AnalyzerSettings,
}

impl<T: LedgerTransport> WalletAnalyzer<T> {
    pub fn new(client: LedgerClient<T>) -> Self {
        Self::with_settings(client, AnalyzerSettings::default())
    }

    pub fn with_settings(client: LedgerClient<T>, settings: AnalyzerSettings) -> Self {
        Self { client, settings }
    }

    /// Analyze one wallet address.
    ///
    /// Fails only on an invalid address, before any remote call. The
    /// activity window is fetched once and shared by both reducers, so a
    /// single run never pulls the same transactions twice.
    pub async fn analyze(&self, address: &str) -> Result<WalletAnalysisReport, AnalysisError> {
        if !is_valid_address(address) {
            return Err(AnalysisError::InvalidAddress(address.to_string()));
        }

        info!("🔍 Analyzing wallet {}", address);

        let sol_balance = match self.client.get_balance(address).await {
            Ok(balance) => Some(balance),
            Err(e) => {
                warn!("⚠️ Balance lookup failed for {}: {}", address, e);
                None
            }
        };

        let aggregator = ActivityAggregator::new(&self.client);
        let window = match aggregator
            .fetch_activity_window(address, self.settings.window_size)
            .await
        {
            Ok(window) => window,
            Err(e) => {
                warn!("⚠️ Activity window fetch failed for {}: {}", address, e);
                Vec::new()
            }
        };

        let token_purchases = token_purchases(&window);
        let frequent_transfers = frequent_transfers(&window, self.settings.transfer_threshold);
        let last_token_purchase = token_purchases.first().and_then(|record| record.date);

        info!(
            "✅ Analysis complete for {}: {} transactions inspected, {} purchases, {} frequent transfer targets",
            address,
            window.len(),
            token_purchases.len(),
            frequent_transfers.len()
        );

        Ok(WalletAnalysisReport {
            wallet: address.to_string(),
            sol_balance,
            last_token_purchase,
            token_purchases,
            frequent_transfers,
        })
    }
}
