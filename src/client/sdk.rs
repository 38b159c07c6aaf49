/// Native-library transport backed by the Solana SDK RPC client

use anyhow::{Context, Result};
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_client::GetConfirmedSignaturesForAddress2Config;
use solana_client::rpc_config::RpcTransactionConfig;
use solana_client::rpc_request::RpcError;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_transaction_status::option_serializer::OptionSerializer;
use solana_transaction_status::{
    EncodedConfirmedTransactionWithStatusMeta, EncodedTransaction, UiInstruction, UiMessage,
    UiParsedInstruction, UiTransactionEncoding,
};
use std::str::FromStr;
use std::time::Duration;

use super::transport::{classify_parsed_instruction, LedgerTransport};
use crate::core::{SignatureRecord, TokenBalanceSnapshot, TransactionDetail};

/// Ledger transport that speaks through `solana_client`'s nonblocking RPC
/// client with confirmed commitment.
pub struct SdkTransport {
    client: RpcClient,
}

impl SdkTransport {
    pub fn new(endpoint: &str, timeout: Duration) -> Self {
        let client = RpcClient::new_with_timeout_and_commitment(
            endpoint.to_string(),
            timeout,
            CommitmentConfig::confirmed(),
        );
        Self { client }
    }
}

impl LedgerTransport for SdkTransport {
    async fn fetch_balance(&self, address: &str) -> Result<u64> {
        let pubkey = parse_pubkey(address)?;
        self.client
            .get_balance(&pubkey)
            .await
            .context("getBalance RPC call failed")
    }

    async fn fetch_signature_page(
        &self,
        address: &str,
        limit: usize,
        before: Option<&str>,
    ) -> Result<Vec<SignatureRecord>> {
        let pubkey = parse_pubkey(address)?;
        let before = before
            .map(Signature::from_str)
            .transpose()
            .context("Invalid pagination cursor signature")?;

        let config = GetConfirmedSignaturesForAddress2Config {
            before,
            limit: Some(limit),
            ..Default::default()
        };

        let page = self
            .client
            .get_signatures_for_address_with_config(&pubkey, config)
            .await
            .context("getSignaturesForAddress RPC call failed")?;

        Ok(page
            .into_iter()
            .map(|status| SignatureRecord {
                signature: status.signature,
                slot: status.slot,
                block_time: status.block_time,
            })
            .collect())
    }

    async fn fetch_transaction(&self, signature: &str) -> Result<Option<TransactionDetail>> {
        let parsed_signature =
            Signature::from_str(signature).context("Invalid transaction signature")?;

        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::JsonParsed),
            commitment: Some(CommitmentConfig::confirmed()),
            max_supported_transaction_version: Some(0),
        };

        match self
            .client
            .get_transaction_with_config(&parsed_signature, config)
            .await
        {
            Ok(transaction) => Ok(Some(parse_confirmed_transaction(signature, transaction))),
            Err(error) if is_not_found(&error) => Ok(None),
            Err(error) => Err(error).context("getTransaction RPC call failed"),
        }
    }
}

fn parse_pubkey(address: &str) -> Result<Pubkey> {
    Pubkey::from_str(address).with_context(|| format!("Invalid wallet address: {}", address))
}

/// The RPC returns a null result for unknown or not-yet-finalized
/// signatures; the typed client surfaces that as a decode error, and some
/// providers answer with history-unavailable error codes instead.
fn is_not_found(error: &ClientError) -> bool {
    match error.kind() {
        ClientErrorKind::SerdeJson(_) => true,
        ClientErrorKind::RpcError(RpcError::RpcResponseError { code, .. }) => {
            matches!(*code, -32009 | -32011)
        }
        ClientErrorKind::RpcError(RpcError::ForUser(message)) => message.contains("not found"),
        _ => false,
    }
}

fn parse_confirmed_transaction(
    signature: &str,
    transaction: EncodedConfirmedTransactionWithStatusMeta,
) -> TransactionDetail {
    let mut detail = TransactionDetail {
        signature: signature.to_string(),
        block_time: transaction.block_time,
        transfers: Vec::new(),
        token_balances: Vec::new(),
    };

    if let Some(meta) = &transaction.transaction.meta {
        if let OptionSerializer::Some(balances) = &meta.pre_token_balances {
            for balance in balances {
                detail.token_balances.push(TokenBalanceSnapshot {
                    mint: balance.mint.clone(),
                    ui_amount: balance.ui_token_amount.ui_amount,
                });
            }
        }
    }

    if let EncodedTransaction::Json(ui_transaction) = &transaction.transaction.transaction {
        if let UiMessage::Parsed(message) = &ui_transaction.message {
            for instruction in &message.instructions {
                if let UiInstruction::Parsed(UiParsedInstruction::Parsed(parsed)) = instruction {
                    if let Some(transfer) =
                        classify_parsed_instruction(&parsed.program_id, &parsed.parsed)
                    {
                        detail.transfers.push(transfer);
                    }
                }
            }
        }
    }

    detail
}
