/// Ledger client: retry-wrapped remote queries with cursor pagination
///
/// Owns no business logic. The aggregator and facade consume this surface
/// and never see transport or retry details.

pub mod http;
pub mod retry;
pub mod sdk;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use http::HttpTransport;
pub use retry::{with_retry, RetryPolicy};
pub use sdk::SdkTransport;
pub use transport::LedgerTransport;

use tracing::debug;

use crate::core::{AnalysisError, SignatureRecord, TransactionDetail};

/// Largest signature page requested from the ledger in one call
pub const SIGNATURE_PAGE_LIMIT: usize = 100;

pub struct LedgerClient<T> {
    pub(crate) transport: T,
    retry: RetryPolicy,
}

impl<T: LedgerTransport> LedgerClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(transport: T, retry: RetryPolicy) -> Self {
        Self { transport, retry }
    }

    /// SOL balance of the account, converted from lamports.
    pub async fn get_balance(&self, address: &str) -> Result<f64, AnalysisError> {
        let lamports = with_retry(&self.retry, "getBalance", || {
            self.transport.fetch_balance(address)
        })
        .await?;

        Ok(lamports as f64 / 1_000_000_000.0)
    }

    /// Most recent transaction signatures for the address, newest first, up
    /// to `window_size` entries.
    ///
    /// Pages are requested with the last-seen signature as the `before`
    /// cursor. An empty page is a hard stop regardless of remaining quota,
    /// so exhausted history never loops.
    pub async fn list_signatures(
        &self,
        address: &str,
        window_size: usize,
    ) -> Result<Vec<SignatureRecord>, AnalysisError> {
        let mut collected: Vec<SignatureRecord> = Vec::new();

        while collected.len() < window_size {
            let remaining = window_size - collected.len();
            let limit = remaining.min(SIGNATURE_PAGE_LIMIT);
            let before = collected.last().map(|record| record.signature.clone());

            let page = with_retry(&self.retry, "getSignaturesForAddress", || {
                self.transport
                    .fetch_signature_page(address, limit, before.as_deref())
            })
            .await?;

            if page.is_empty() {
                debug!(
                    "Signature history for {} exhausted after {} entries",
                    address,
                    collected.len()
                );
                break;
            }

            collected.extend(page);
        }

        collected.truncate(window_size);
        Ok(collected)
    }

    /// Detail for a single transaction. `Ok(None)` means not found or not
    /// yet finalized: skip, don't abort.
    pub async fn get_transaction_detail(
        &self,
        signature: &str,
    ) -> Result<Option<TransactionDetail>, AnalysisError> {
        with_retry(&self.retry, "getTransaction", || {
            self.transport.fetch_transaction(signature)
        })
        .await
    }
}
