/// Transport abstraction over the ledger RPC service
///
/// The two historical query paths (native SDK client vs raw JSON-RPC over
/// HTTP) sit behind one trait so the client, aggregator, and facade never
/// care which wire format is in use. Transports own no retry logic; the
/// `LedgerClient` wraps every call in the shared retry helper.

use anyhow::Result;
use serde_json::Value;
use std::future::Future;

use crate::core::{SignatureRecord, TransactionDetail, TransferInstruction, TransferProgram};

/// Raw remote operations against the ledger service.
///
/// `fetch_transaction` returns `Ok(None)` for a transaction that is not
/// found or not yet finalized; callers treat that as "skip", not "abort".
pub trait LedgerTransport: Send + Sync {
    fn fetch_balance(&self, address: &str) -> impl Future<Output = Result<u64>> + Send;

    fn fetch_signature_page(
        &self,
        address: &str,
        limit: usize,
        before: Option<&str>,
    ) -> impl Future<Output = Result<Vec<SignatureRecord>>> + Send;

    fn fetch_transaction(
        &self,
        signature: &str,
    ) -> impl Future<Output = Result<Option<TransactionDetail>>> + Send;
}

/// Extract a transfer from one jsonParsed instruction, shared by both
/// transports.
///
/// Token-program instructions count whenever their payload names a
/// destination (plain `transfer` carries no mint; `transferChecked` does).
/// System-program instructions count only for `transfer`, with the lamport
/// amount converted to SOL.
pub(crate) fn classify_parsed_instruction(
    program_id: &str,
    parsed: &Value,
) -> Option<TransferInstruction> {
    let info = parsed.get("info")?;

    if program_id == spl_token::id().to_string() {
        let destination = info.get("destination")?.as_str()?.to_string();
        let mint = info
            .get("mint")
            .and_then(Value::as_str)
            .map(str::to_string);
        let ui_amount = info
            .get("tokenAmount")
            .and_then(|amount| amount.get("uiAmount"))
            .and_then(Value::as_f64);

        return Some(TransferInstruction {
            program: TransferProgram::Token,
            mint,
            ui_amount,
            destination,
        });
    }

    if program_id == solana_sdk::system_program::id().to_string() {
        if parsed.get("type").and_then(Value::as_str) != Some("transfer") {
            return None;
        }
        let destination = info.get("destination")?.as_str()?.to_string();
        let ui_amount = info
            .get("lamports")
            .and_then(Value::as_u64)
            .map(|lamports| lamports as f64 / 1_000_000_000.0);

        return Some(TransferInstruction {
            program: TransferProgram::Native,
            mint: None,
            ui_amount,
            destination,
        });
    }

    None
}
