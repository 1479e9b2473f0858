//! Chain boundary error types.

use quickdraw_types::TxHash;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("confirmation wait timed out after {0}s")]
    Timeout(u64),

    #[error("transaction reverted on-chain: {0}")]
    Reverted(TxHash),

    #[error("no on-chain address on file for player {0}")]
    Resolution(String),

    #[error("transfer rejected by treasury: {0}")]
    TransferRejected(String),

    #[error("chain RPC error: {0}")]
    Rpc(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
