/// Raw JSON-RPC transport over HTTP
///
/// Speaks the ledger's JSON-RPC 2.0 wire format directly with `reqwest`,
/// without going through the Solana SDK client. Responses arrive in a
/// `{result, error}` envelope; a populated `error` field is a failed call
/// for retry purposes, while a null `result` on getTransaction means the
/// transaction is unknown and must be skipped.

use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use super::transport::{classify_parsed_instruction, LedgerTransport};
use crate::core::{
    AnalysisError, SignatureRecord, TokenBalanceSnapshot, TransactionDetail,
};

pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, AnalysisError> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            AnalysisError::Configuration(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    /// Issue one JSON-RPC call and unwrap its envelope. `Ok(None)` means the
    /// service answered with a null `result`.
    async fn rpc_call<R: DeserializeOwned>(&self, method: &str, params: Value) -> Result<Option<R>> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        debug!("→ JSON-RPC {} against {}", method, self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("{} request failed", method))?;

        if !response.status().is_success() {
            bail!("{} returned HTTP {}", method, response.status());
        }

        let envelope: RpcEnvelope<R> = response
            .json()
            .await
            .with_context(|| format!("{} response is not valid JSON", method))?;

        decode_envelope(method, envelope)
    }
}

impl LedgerTransport for HttpTransport {
    async fn fetch_balance(&self, address: &str) -> Result<u64> {
        let value: RpcContextValue<u64> = self
            .rpc_call("getBalance", json!([address]))
            .await?
            .context("getBalance returned an empty result")?;
        Ok(value.value)
    }

    async fn fetch_signature_page(
        &self,
        address: &str,
        limit: usize,
        before: Option<&str>,
    ) -> Result<Vec<SignatureRecord>> {
        let mut options = json!({ "limit": limit });
        if let Some(cursor) = before {
            options["before"] = json!(cursor);
        }

        let entries: Vec<SignatureEntry> = self
            .rpc_call("getSignaturesForAddress", json!([address, options]))
            .await?
            .context("getSignaturesForAddress returned an empty result")?;

        Ok(entries
            .into_iter()
            .map(|entry| SignatureRecord {
                signature: entry.signature,
                slot: entry.slot,
                block_time: entry.block_time,
            })
            .collect())
    }

    async fn fetch_transaction(&self, signature: &str) -> Result<Option<TransactionDetail>> {
        let options = json!({
            "encoding": "jsonParsed",
            "maxSupportedTransactionVersion": 0,
        });

        let response: Option<TransactionResponse> = self
            .rpc_call("getTransaction", json!([signature, options]))
            .await?;

        Ok(response.map(|body| build_detail(signature, body)))
    }
}

fn decode_envelope<R>(method: &str, envelope: RpcEnvelope<R>) -> Result<Option<R>> {
    if let Some(error) = envelope.error {
        bail!("{} RPC error {}: {}", method, error.code, error.message);
    }
    Ok(envelope.result)
}

fn build_detail(signature: &str, response: TransactionResponse) -> TransactionDetail {
    let token_balances = response
        .meta
        .and_then(|meta| meta.pre_token_balances)
        .unwrap_or_default()
        .into_iter()
        .map(|entry| TokenBalanceSnapshot {
            mint: entry.mint,
            ui_amount: entry.ui_token_amount.ui_amount,
        })
        .collect();

    let transfers = response
        .transaction
        .map(|body| body.message.instructions)
        .unwrap_or_default()
        .iter()
        .filter_map(|instruction| {
            let program_id = instruction.program_id.as_deref()?;
            let parsed = instruction.parsed.as_ref()?;
            classify_parsed_instruction(program_id, parsed)
        })
        .collect();

    TransactionDetail {
        signature: signature.to_string(),
        block_time: response.block_time,
        transfers,
        token_balances,
    }
}

// ---- wire format -----------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RpcEnvelope<R> {
    result: Option<R>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcContextValue<V> {
    value: V,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignatureEntry {
    signature: String,
    slot: u64,
    block_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionResponse {
    block_time: Option<i64>,
    meta: Option<TransactionMeta>,
    transaction: Option<TransactionBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionMeta {
    pre_token_balances: Option<Vec<TokenBalanceEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenBalanceEntry {
    mint: String,
    ui_token_amount: UiAmountEntry,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UiAmountEntry {
    ui_amount: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TransactionBody {
    message: MessageBody,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    #[serde(default)]
    instructions: Vec<InstructionEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstructionEntry {
    program_id: Option<String>,
    parsed: Option<Value>,
}
