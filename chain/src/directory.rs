//! Wallet directory port — resolves a player to a payout address.

use crate::ChainError;
use async_trait::async_trait;
use quickdraw_types::{OnchainAddress, PlayerId};
use serde::Deserialize;

/// Port for resolving a player identity to their on-chain address.
#[async_trait]
pub trait WalletDirectory: Send + Sync {
    /// Resolve a player's payout address. [`ChainError::Resolution`] if the
    /// platform has no verified address on file for them.
    async fn address_for(&self, player: PlayerId) -> Result<OnchainAddress, ChainError>;
}

#[derive(Debug, Deserialize)]
struct WalletResponse {
    address: Option<OnchainAddress>,
}

/// A [`WalletDirectory`] backed by the platform's wallet API.
pub struct HttpWalletDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpWalletDirectory {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl WalletDirectory for HttpWalletDirectory {
    async fn address_for(&self, player: PlayerId) -> Result<OnchainAddress, ChainError> {
        let url = format!("{}/wallets/{}", self.base_url, player);
        let response = self.client.get(&url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ChainError::Resolution(player.to_string()));
        }
        let body: WalletResponse = response.error_for_status()?.json().await?;
        body.address
            .ok_or_else(|| ChainError::Resolution(player.to_string()))
    }
}
