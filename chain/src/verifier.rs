//! Transaction verification port.

use crate::ChainError;
use async_trait::async_trait;
use quickdraw_types::TxHash;

/// Final on-chain status of a mined transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TxOutcome {
    /// Mined and executed successfully.
    Success,
    /// Mined but reverted; no funds moved.
    Reverted,
}

/// Port for confirming a transaction on-chain.
///
/// `await_confirmation` suspends until the transaction is mined and returns
/// its execution status. A hash that never appears within the
/// implementation's deadline is a [`ChainError::Timeout`] — never a silent
/// success. This is the only way a transaction hash becomes trusted.
#[async_trait]
pub trait TxVerifier: Send + Sync {
    async fn await_confirmation(&self, hash: &TxHash) -> Result<TxOutcome, ChainError>;
}
