/// Scripted in-memory transport for exercising retry, pagination, and
/// degradation behavior without a live RPC endpoint.

use anyhow::{anyhow, Result};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use super::transport::LedgerTransport;
use crate::core::{SignatureRecord, TransactionDetail};

/// Scripted response for one signature in the mock transaction store
pub(crate) enum MockTransaction {
    Detail(TransactionDetail),
    Missing,
    Error(String),
}

#[derive(Default)]
pub(crate) struct MockTransport {
    balances: Mutex<VecDeque<Result<u64, String>>>,
    signature_pages: Mutex<VecDeque<Result<Vec<SignatureRecord>, String>>>,
    transactions: Mutex<HashMap<String, MockTransaction>>,
    balance_calls: AtomicU32,
    signature_page_calls: AtomicU32,
    transaction_calls: AtomicU32,
    cursors: Mutex<Vec<Option<String>>>,
}

impl MockTransport {
    pub fn push_balance(&self, response: Result<u64, &str>) {
        self.balances
            .lock()
            .unwrap()
            .push_back(response.map_err(str::to_string));
    }

    pub fn push_signature_page(&self, response: Result<Vec<SignatureRecord>, &str>) {
        self.signature_pages
            .lock()
            .unwrap()
            .push_back(response.map_err(str::to_string));
    }

    pub fn insert_transaction(&self, signature: &str, response: MockTransaction) {
        self.transactions
            .lock()
            .unwrap()
            .insert(signature.to_string(), response);
    }

    /// Build newest-first signature records from bare names.
    pub fn signatures(names: &[&str]) -> Vec<SignatureRecord> {
        names
            .iter()
            .enumerate()
            .map(|(index, name)| SignatureRecord {
                signature: name.to_string(),
                slot: 1_000 - index as u64,
                block_time: Some(1_706_000_000 - index as i64),
            })
            .collect()
    }

    pub fn balance_calls(&self) -> u32 {
        self.balance_calls.load(Ordering::SeqCst)
    }

    pub fn signature_page_calls(&self) -> u32 {
        self.signature_page_calls.load(Ordering::SeqCst)
    }

    pub fn transaction_calls(&self) -> u32 {
        self.transaction_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> u32 {
        self.balance_calls() + self.signature_page_calls() + self.transaction_calls()
    }

    /// `before` cursors observed by `fetch_signature_page`, in call order.
    pub fn seen_cursors(&self) -> Vec<Option<String>> {
        self.cursors.lock().unwrap().clone()
    }
}

impl LedgerTransport for MockTransport {
    async fn fetch_balance(&self, _address: &str) -> Result<u64> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        match self.balances.lock().unwrap().pop_front() {
            Some(Ok(lamports)) => Ok(lamports),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("unscripted getBalance call")),
        }
    }

    async fn fetch_signature_page(
        &self,
        _address: &str,
        _limit: usize,
        before: Option<&str>,
    ) -> Result<Vec<SignatureRecord>> {
        self.signature_page_calls.fetch_add(1, Ordering::SeqCst);
        self.cursors
            .lock()
            .unwrap()
            .push(before.map(str::to_string));

        match self.signature_pages.lock().unwrap().pop_front() {
            Some(Ok(page)) => Ok(page),
            Some(Err(message)) => Err(anyhow!(message)),
            // Unscripted pages read as exhausted history
            None => Ok(Vec::new()),
        }
    }

    async fn fetch_transaction(&self, signature: &str) -> Result<Option<TransactionDetail>> {
        self.transaction_calls.fetch_add(1, Ordering::SeqCst);
        match self.transactions.lock().unwrap().get(signature) {
            Some(MockTransaction::Detail(detail)) => Ok(Some(detail.clone())),
            Some(MockTransaction::Missing) | None => Ok(None),
            Some(MockTransaction::Error(message)) => Err(anyhow!(message.clone())),
        }
    }
}
