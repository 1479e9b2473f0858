//! Outbound transfer port — USDC from the bot's custody to a player.

use crate::ChainError;
use async_trait::async_trait;
use quickdraw_types::{OnchainAddress, TxHash, UsdcAmount};
use serde::{Deserialize, Serialize};

/// Port for submitting an outbound USDC transfer.
///
/// Returns the submitted transaction hash. Submission alone proves nothing:
/// callers must confirm the hash through a [`crate::TxVerifier`] before
/// treating the funds as moved.
#[async_trait]
pub trait TransferClient: Send + Sync {
    async fn send_usdc(&self, to: &OnchainAddress, amount: UsdcAmount)
        -> Result<TxHash, ChainError>;
}

#[derive(Serialize)]
struct TransferBody<'a> {
    to: &'a OnchainAddress,
    amount: u64,
}

#[derive(Deserialize)]
struct TransferResponse {
    tx_hash: TxHash,
}

/// A [`TransferClient`] backed by the custodial treasury service.
pub struct HttpTreasuryClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTreasuryClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl TransferClient for HttpTreasuryClient {
    async fn send_usdc(
        &self,
        to: &OnchainAddress,
        amount: UsdcAmount,
    ) -> Result<TxHash, ChainError> {
        let url = format!("{}/transfers", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&TransferBody {
                to,
                amount: amount.raw(),
            })
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(ChainError::TransferRejected(format!("{status}: {detail}")));
        }
        let body: TransferResponse = response.json().await?;
        Ok(body.tx_hash)
    }
}
