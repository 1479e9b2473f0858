//! JSON-RPC transaction verifier.
//!
//! Polls `eth_getTransactionReceipt` until the receipt appears, then reads
//! its status field. A receipt that never appears within the configured
//! deadline is a timeout.

use crate::verifier::{TxOutcome, TxVerifier};
use crate::ChainError;
use async_trait::async_trait;
use quickdraw_types::TxHash;
use serde::Deserialize;
use std::time::Duration;

/// Receipt fields we care about.
#[derive(Debug, Deserialize)]
struct Receipt {
    /// "0x1" for success, "0x0" for revert.
    status: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<Receipt>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    message: String,
}

/// A [`TxVerifier`] backed by an EVM JSON-RPC endpoint.
pub struct HttpTxVerifier {
    client: reqwest::Client,
    rpc_url: String,
    poll_interval: Duration,
    confirm_timeout: Duration,
}

impl HttpTxVerifier {
    pub fn new(rpc_url: impl Into<String>, poll_interval: Duration, confirm_timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            rpc_url: rpc_url.into(),
            poll_interval,
            confirm_timeout,
        }
    }

    async fn fetch_receipt(&self, hash: &TxHash) -> Result<Option<Receipt>, ChainError> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_getTransactionReceipt",
            "params": [hash.to_string()],
        });
        let response: RpcResponse = self
            .client
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await?
            .json()
            .await?;
        if let Some(err) = response.error {
            return Err(ChainError::Rpc(err.message));
        }
        Ok(response.result)
    }
}

#[async_trait]
impl TxVerifier for HttpTxVerifier {
    async fn await_confirmation(&self, hash: &TxHash) -> Result<TxOutcome, ChainError> {
        let deadline = tokio::time::Instant::now() + self.confirm_timeout;
        loop {
            match self.fetch_receipt(hash).await {
                Ok(Some(receipt)) => {
                    let outcome = if receipt.status == "0x1" {
                        TxOutcome::Success
                    } else {
                        TxOutcome::Reverted
                    };
                    tracing::debug!(tx = %hash, ?outcome, "transaction receipt observed");
                    return Ok(outcome);
                }
                Ok(None) => {
                    // Not mined yet; keep polling until the deadline.
                }
                Err(e) => {
                    // Transient RPC trouble is retried within the deadline.
                    tracing::warn!(tx = %hash, "receipt fetch failed: {e}");
                }
            }
            if tokio::time::Instant::now() + self.poll_interval > deadline {
                return Err(ChainError::Timeout(self.confirm_timeout.as_secs()));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
