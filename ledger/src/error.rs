//! Ledger error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("duplicate payment id: {0}")]
    DuplicatePayment(String),

    #[error("payment not found: {0}")]
    NotFound(String),
}
