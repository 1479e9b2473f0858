//! The chain boundary.
//!
//! Everything on-chain is untrusted and asynchronous: a transaction hash
//! means nothing until the verifier has watched it confirm, and an outbound
//! transfer is only real once its own confirmation lands. The ports here
//! ([`TxVerifier`], [`WalletDirectory`], [`TransferClient`]) keep the rest
//! of the workspace free of HTTP details; the [`Disburser`] composes all
//! three into the confirmed-or-failed payout primitive the engine uses.

pub mod directory;
pub mod disburse;
pub mod error;
pub mod rpc;
pub mod transfer;
pub mod verifier;

pub use directory::{HttpWalletDirectory, WalletDirectory};
pub use disburse::Disburser;
pub use error::ChainError;
pub use rpc::HttpTxVerifier;
pub use transfer::{HttpTreasuryClient, TransferClient};
pub use verifier::{TxOutcome, TxVerifier};
