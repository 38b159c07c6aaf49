/// Activity aggregation over a wallet's recent transaction window
///
/// Both analyses (token purchases and frequent transfers) share the same
/// signature-window-then-detail-fetch shape, so the fetch-and-parse step is
/// implemented once and consumed by two independent reducers. Detail-fetch
/// failures are local: one bad transaction never erases the rest of the
/// window.

use chrono::DateTime;
use futures_util::stream::{self, StreamExt};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

use crate::client::{LedgerClient, LedgerTransport};
use crate::core::{AnalysisError, TokenPurchaseRecord, TransactionDetail};

/// Upper bound on in-flight transaction detail fetches
pub const DETAIL_FETCH_CONCURRENCY: usize = 4;

pub struct ActivityAggregator<'a, T> {
    client: &'a LedgerClient<T>,
}

impl<'a, T: LedgerTransport> ActivityAggregator<'a, T> {
    pub fn new(client: &'a LedgerClient<T>) -> Self {
        Self { client }
    }

    /// Fetch and parse details for the address's most recent transactions,
    /// up to `window_size`.
    ///
    /// Detail fetches run through an ordered buffered stream, so the output
    /// follows signature order (newest first) even though up to
    /// `DETAIL_FETCH_CONCURRENCY` fetches are in flight. Failed or missing
    /// transactions are logged and skipped.
    pub async fn fetch_activity_window(
        &self,
        address: &str,
        window_size: usize,
    ) -> Result<Vec<TransactionDetail>, AnalysisError> {
        let signatures = self.client.list_signatures(address, window_size).await?;
        debug!(
            "🔍 Retrieved {} signatures for {}, fetching details",
            signatures.len(),
            address
        );

        let mut details = Vec::with_capacity(signatures.len());
        let mut fetches = stream::iter(signatures.iter().map(|record| async move {
            let result = self.client.get_transaction_detail(&record.signature).await;
            (record, result)
        }))
        .buffered(DETAIL_FETCH_CONCURRENCY);

        while let Some((record, result)) = fetches.next().await {
            match result {
                Ok(Some(detail)) => details.push(detail),
                Ok(None) => {
                    debug!(
                        "Transaction {} not available yet, skipping",
                        record.signature
                    );
                }
                Err(e) => {
                    warn!(
                        "⚠️ Skipping transaction {} in window for {}: {}",
                        record.signature, address, e
                    );
                }
            }
        }

        Ok(details)
    }

    /// Fetch a window and reduce it to token purchase records.
    pub async fn collect_token_purchases(
        &self,
        address: &str,
        window_size: usize,
    ) -> Result<Vec<TokenPurchaseRecord>, AnalysisError> {
        let window = self.fetch_activity_window(address, window_size).await?;
        Ok(token_purchases(&window))
    }

    /// Fetch a window and reduce it to the frequent-transfer destination set.
    pub async fn collect_frequent_transfers(
        &self,
        address: &str,
        window_size: usize,
        threshold: u32,
    ) -> Result<BTreeSet<String>, AnalysisError> {
        let window = self.fetch_activity_window(address, window_size).await?;
        Ok(frequent_transfers(&window, threshold))
    }
}

/// One purchase record per pre-transaction token balance snapshot entry,
/// keeping the window's newest-first order.
pub fn token_purchases(window: &[TransactionDetail]) -> Vec<TokenPurchaseRecord> {
    let mut purchases = Vec::new();

    for detail in window {
        let date = detail
            .block_time
            .and_then(|timestamp| DateTime::from_timestamp(timestamp, 0));

        for snapshot in &detail.token_balances {
            purchases.push(TokenPurchaseRecord {
                token: snapshot.mint.clone(),
                amount: snapshot.ui_amount,
                date,
            });
        }
    }

    purchases
}

/// Destinations that received transfers from the wallet strictly more than
/// `threshold` times across the window. Both SPL token transfers and native
/// SOL transfers count.
pub fn frequent_transfers(window: &[TransactionDetail], threshold: u32) -> BTreeSet<String> {
    let mut tally: HashMap<&str, u32> = HashMap::new();

    for detail in window {
        for transfer in &detail.transfers {
            *tally.entry(transfer.destination.as_str()).or_insert(0) += 1;
        }
    }

    tally
        .into_iter()
        .filter(|(_, count)| *count > threshold)
        .map(|(destination, _)| destination.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::{MockTransaction, MockTransport};
    use crate::client::RetryPolicy;
    use crate::core::{TokenBalanceSnapshot, TransferInstruction, TransferProgram};

    const ADDRESS: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";

    fn fast_client(transport: MockTransport) -> LedgerClient<MockTransport> {
        LedgerClient::with_retry_policy(
            transport,
            RetryPolicy {
                max_attempts: 3,
                base_delay: std::time::Duration::from_millis(1),
            },
        )
    }

    fn detail(signature: &str, block_time: i64) -> TransactionDetail {
        TransactionDetail {
            signature: signature.to_string(),
            block_time: Some(block_time),
            transfers: Vec::new(),
            token_balances: Vec::new(),
        }
    }

    fn purchase_detail(signature: &str, block_time: i64, mint: &str) -> TransactionDetail {
        let mut detail = detail(signature, block_time);
        detail.token_balances.push(TokenBalanceSnapshot {
            mint: mint.to_string(),
            ui_amount: Some(10.0),
        });
        detail
    }

    fn transfer_detail(signature: &str, destinations: &[&str]) -> TransactionDetail {
        let mut detail = detail(signature, 1_706_000_000);
        for destination in destinations {
            detail.transfers.push(TransferInstruction {
                program: TransferProgram::Token,
                mint: None,
                ui_amount: Some(1.0),
                destination: destination.to_string(),
            });
        }
        detail
    }

    #[tokio::test]
    async fn test_failed_detail_fetch_skips_only_that_transaction() {
        let transport = MockTransport::default();
        let names = ["s1", "s2", "s3", "s4", "s5"];
        transport.push_signature_page(Ok(MockTransport::signatures(&names)));

        for (index, name) in names.iter().enumerate() {
            if *name == "s3" {
                transport.insert_transaction(name, MockTransaction::Error("timeout".to_string()));
            } else {
                transport.insert_transaction(
                    name,
                    MockTransaction::Detail(purchase_detail(
                        name,
                        1_706_000_000 - index as i64,
                        "MintAAA1111111111111111111111111111111111111",
                    )),
                );
            }
        }

        let client = fast_client(transport);
        let aggregator = ActivityAggregator::new(&client);
        let purchases = aggregator.collect_token_purchases(ADDRESS, 5).await.unwrap();

        assert_eq!(purchases.len(), 4);
    }

    #[tokio::test]
    async fn test_missing_transaction_is_skipped_not_fatal() {
        let transport = MockTransport::default();
        transport.push_signature_page(Ok(MockTransport::signatures(&["s1", "s2"])));
        transport.insert_transaction(
            "s1",
            MockTransaction::Detail(purchase_detail(
                "s1",
                1_706_000_000,
                "MintAAA1111111111111111111111111111111111111",
            )),
        );
        transport.insert_transaction("s2", MockTransaction::Missing);

        let client = fast_client(transport);
        let aggregator = ActivityAggregator::new(&client);
        let window = aggregator.fetch_activity_window(ADDRESS, 2).await.unwrap();

        assert_eq!(window.len(), 1);
        assert_eq!(window[0].signature, "s1");
    }

    #[tokio::test]
    async fn test_window_order_follows_signature_order() {
        let transport = MockTransport::default();
        let names = ["newest", "middle", "oldest"];
        transport.push_signature_page(Ok(MockTransport::signatures(&names)));
        for (index, name) in names.iter().enumerate() {
            transport.insert_transaction(
                name,
                MockTransaction::Detail(detail(name, 1_706_000_000 - index as i64)),
            );
        }

        let client = fast_client(transport);
        let aggregator = ActivityAggregator::new(&client);
        let window = aggregator.fetch_activity_window(ADDRESS, 3).await.unwrap();

        let order: Vec<&str> = window
            .iter()
            .map(|detail| detail.signature.as_str())
            .collect();
        assert_eq!(order, vec!["newest", "middle", "oldest"]);
    }

    #[test]
    fn test_purchase_dates_converted_to_utc() {
        let window = vec![purchase_detail(
            "s1",
            1_706_000_000,
            "MintAAA1111111111111111111111111111111111111",
        )];

        let purchases = token_purchases(&window);
        assert_eq!(purchases.len(), 1);
        let date = purchases[0].date.unwrap();
        assert_eq!(date.timestamp(), 1_706_000_000);
    }

    #[test]
    fn test_purchase_without_block_time_keeps_null_date() {
        let mut entry = purchase_detail("s1", 0, "MintAAA1111111111111111111111111111111111111");
        entry.block_time = None;

        let purchases = token_purchases(&[entry]);
        assert_eq!(purchases[0].date, None);
    }

    #[test]
    fn test_threshold_is_strictly_greater_than() {
        // D receives 4 transfers, E receives 3
        let window = vec![
            transfer_detail("s1", &["D", "E"]),
            transfer_detail("s2", &["D", "E"]),
            transfer_detail("s3", &["D", "E"]),
            transfer_detail("s4", &["D"]),
        ];

        let frequent = frequent_transfers(&window, 3);
        assert_eq!(frequent.len(), 1);
        assert!(frequent.contains("D"));
        assert!(!frequent.contains("E"));
    }

    #[test]
    fn test_native_transfers_count_toward_tally() {
        let mut entry = detail("s1", 1_706_000_000);
        for _ in 0..4 {
            entry.transfers.push(TransferInstruction {
                program: TransferProgram::Native,
                mint: None,
                ui_amount: Some(0.5),
                destination: "NativeDst1111111111111111111111111111111111".to_string(),
            });
        }

        let frequent = frequent_transfers(&[entry], 3);
        assert!(frequent.contains("NativeDst1111111111111111111111111111111111"));
    }
}
