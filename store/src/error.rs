//! Store error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("player not found: {0}")]
    PlayerNotFound(String),

    #[error("jackpot pool underflow: draining {requested}, pool holds {available}")]
    JackpotUnderflow { requested: u64, available: u64 },
}
