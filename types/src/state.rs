//! Shared state enums for payment legs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a payment leg was requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentPurpose {
    /// Entry fee for a solo game.
    SoloPlay,
    /// The challenger's leg of a wagered match.
    ChallengeInitiator,
    /// The accepting target's leg of a wagered match.
    ChallengeAcceptor,
}

impl fmt::Display for PaymentPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentPurpose::SoloPlay => "solo-play",
            PaymentPurpose::ChallengeInitiator => "challenge-initiator",
            PaymentPurpose::ChallengeAcceptor => "challenge-acceptor",
        };
        write!(f, "{s}")
    }
}

/// Status of a payment leg. Monotonic: once terminal it never reverts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Confirmed,
    Failed,
}

impl PaymentStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Confirmed => "confirmed",
            PaymentStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}
