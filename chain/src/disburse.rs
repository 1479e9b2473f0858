//! Prize disbursement — the confirmed-or-failed payout primitive.

use crate::directory::WalletDirectory;
use crate::transfer::TransferClient;
use crate::verifier::{TxOutcome, TxVerifier};
use crate::ChainError;
use quickdraw_types::{PlayerId, TxHash, UsdcAmount};
use std::sync::Arc;

/// Composes resolution, transfer, and confirmation into one operation.
///
/// `disburse` returns a transaction hash only when the transfer is
/// confirmed successful on-chain. Every error — resolution, submission,
/// revert, or confirmation timeout — means "funds not guaranteed moved":
/// callers surface it as a recoverable-but-unresolved condition, never as
/// silent success. Resolution failures return before any transfer is
/// attempted, so there is no partial state.
pub struct Disburser {
    directory: Arc<dyn WalletDirectory>,
    transfer: Arc<dyn TransferClient>,
    verifier: Arc<dyn TxVerifier>,
}

impl Disburser {
    pub fn new(
        directory: Arc<dyn WalletDirectory>,
        transfer: Arc<dyn TransferClient>,
        verifier: Arc<dyn TxVerifier>,
    ) -> Self {
        Self {
            directory,
            transfer,
            verifier,
        }
    }

    pub async fn disburse(
        &self,
        player: PlayerId,
        amount: UsdcAmount,
    ) -> Result<TxHash, ChainError> {
        let address = self.directory.address_for(player).await?;

        let hash = self.transfer.send_usdc(&address, amount).await?;
        tracing::info!(%player, %amount, tx = %hash, "transfer submitted, awaiting confirmation");

        match self.verifier.await_confirmation(&hash).await? {
            TxOutcome::Success => {
                tracing::info!(%player, %amount, tx = %hash, "disbursement confirmed");
                Ok(hash)
            }
            TxOutcome::Reverted => {
                tracing::warn!(%player, %amount, tx = %hash, "disbursement reverted on-chain");
                Err(ChainError::Reverted(hash))
            }
        }
    }
}
