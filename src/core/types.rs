/// Core data model for wallet activity analysis
///
/// These types flow upward from the ledger client through the aggregator
/// into the final analysis report. Everything here is plain data; the
/// remote-query and reduction logic lives in `client` and `analysis`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Expected length of a base-58 encoded Solana wallet address
pub const SOLANA_ADDRESS_LEN: usize = 44;

/// Pure shape check for a wallet address: fixed base-58 length decoding
/// to a 32-byte public key. No remote calls are made here.
pub fn is_valid_address(address: &str) -> bool {
    if address.len() != SOLANA_ADDRESS_LEN {
        return false;
    }

    match bs58::decode(address).into_vec() {
        Ok(bytes) => bytes.len() == 32,
        Err(_) => false,
    }
}

/// One entry from the signature-listing query.
///
/// Ephemeral: drives detail fetches and pagination (the last signature of a
/// page becomes the `before` cursor of the next) and is not retained in the
/// analysis report.
#[derive(Debug, Clone)]
pub struct SignatureRecord {
    /// The transaction signature, base-58 encoded
    pub signature: String,
    /// Slot the transaction was confirmed in
    pub slot: u64,
    /// Block time as Unix timestamp, if the ledger recorded one
    pub block_time: Option<i64>,
}

/// Which program a transfer instruction belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferProgram {
    /// SPL token program transfer
    Token,
    /// Native system-program SOL transfer
    Native,
}

/// A parsed transfer instruction extracted from a transaction
#[derive(Debug, Clone)]
pub struct TransferInstruction {
    pub program: TransferProgram,
    /// Mint of the transferred token; absent for native transfers and for
    /// token instructions that do not carry mint metadata
    pub mint: Option<String>,
    /// UI-formatted amount (decimals applied), if the payload carried one
    pub ui_amount: Option<f64>,
    /// Receiving account address
    pub destination: String,
}

/// One entry of a transaction's pre-execution token balance snapshot
#[derive(Debug, Clone)]
pub struct TokenBalanceSnapshot {
    pub mint: String,
    pub ui_amount: Option<f64>,
}

/// Parsed result of a transaction detail fetch
#[derive(Debug, Clone)]
pub struct TransactionDetail {
    pub signature: String,
    /// Block time as Unix timestamp; None while the ledger has not
    /// recorded one yet
    pub block_time: Option<i64>,
    /// Transfer instructions observed in the transaction message
    pub transfers: Vec<TransferInstruction>,
    /// Token balances before the transaction executed
    pub token_balances: Vec<TokenBalanceSnapshot>,
}

/// A single token acquisition observed in the analyzed window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPurchaseRecord {
    /// Token mint identifier
    pub token: String,
    /// UI amount; the ledger reports null for zero-balance snapshots
    pub amount: Option<f64>,
    /// Transaction block time, when the ledger recorded one
    pub date: Option<DateTime<Utc>>,
}

/// Final report produced by one `analyze` invocation.
///
/// A populated report is always returned once the address validates; a null
/// balance or empty list means the corresponding remote query failed, not
/// that the analysis itself did.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAnalysisReport {
    /// The analyzed wallet address
    pub wallet: String,
    /// SOL balance; None when the balance lookup failed
    pub sol_balance: Option<f64>,
    /// Date of the most recent token purchase in the window
    pub last_token_purchase: Option<DateTime<Utc>>,
    /// Token purchases, chronological newest-first following signature order
    pub token_purchases: Vec<TokenPurchaseRecord>,
    /// Destinations receiving transfers more often than the threshold
    pub frequent_transfers: BTreeSet<String>,
}
