//! Fundamental types for the quickdraw wager service.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: player and entity identifiers, USDC amounts, transaction
//! hashes, on-chain addresses, timestamps, and game parameters.

pub mod address;
pub mod amount;
pub mod hash;
pub mod id;
pub mod params;
pub mod state;
pub mod time;

pub use address::{InvalidAddress, OnchainAddress};
pub use amount::UsdcAmount;
pub use hash::{InvalidTxHash, TxHash};
pub use id::{ChallengeId, ChannelId, PaymentId, PlayerId};
pub use params::GameParams;
pub use state::{PaymentPurpose, PaymentStatus};
pub use time::Timestamp;
