//! Outbound notifications to the chat transport.
//!
//! The core never talks to the messaging platform directly; it emits
//! [`Outbound`] events through the [`Notifier`] port and moves on. Delivery
//! failures are logged by callers and never affect core state — the chat
//! layer is a collaborator, not a dependency of correctness.

pub mod webhook;

pub use webhook::WebhookNotifier;

use async_trait::async_trait;
use quickdraw_types::{
    ChallengeId, ChannelId, PaymentId, PaymentPurpose, PlayerId, UsdcAmount,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification delivery failed: {0}")]
    Delivery(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Why a refund is being issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefundReason {
    /// The target declined the challenge.
    Declined,
    /// The challenge expired before both legs confirmed.
    Abandoned,
    /// The match tied and both wagers are returned.
    Push,
}

/// Every notification the core can emit. Serialized with a `kind` tag so
/// the transport can route and render each one.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outbound {
    /// Ask a player to pay a leg. The interaction layer renders the pay
    /// button and reports the outcome through the payment callback.
    PaymentRequest {
        payment_id: PaymentId,
        player: PlayerId,
        amount: UsdcAmount,
        purpose: PaymentPurpose,
        channel: ChannelId,
    },
    /// Accept/decline prompt, addressed only to the target. Carries the
    /// challenge id so the response callback can find the challenge in O(1).
    ChallengePrompt {
        challenge_id: ChallengeId,
        target: PlayerId,
        challenger_name: String,
        wager: UsdcAmount,
        channel: ChannelId,
    },
    /// Both legs confirmed; tell both players the match may begin.
    MatchReady {
        challenge_id: ChallengeId,
        challenger: PlayerId,
        target: PlayerId,
        wager: UsdcAmount,
        channel: ChannelId,
    },
    /// Final result broadcast for a decided match.
    MatchResult {
        challenge_id: ChallengeId,
        winner: PlayerId,
        winner_name: String,
        loser: PlayerId,
        loser_name: String,
        winner_score: u32,
        loser_score: u32,
        prize: UsdcAmount,
        channel: ChannelId,
    },
    /// Tied match: both wagers returned.
    MatchPush {
        challenge_id: ChallengeId,
        score: u32,
        refund_each: UsdcAmount,
        channel: ChannelId,
    },
    /// A refund was issued (or at least attempted and confirmed).
    Refund {
        player: PlayerId,
        amount: UsdcAmount,
        reason: RefundReason,
        channel: ChannelId,
    },
    /// A payout or refund could not be confirmed. This is the manual-
    /// reconciliation surface: operators act on these.
    DisbursementFailed {
        player: PlayerId,
        amount: UsdcAmount,
        context: String,
        channel: ChannelId,
    },
    /// Solo entry fee confirmed; one game session is authorized.
    GameAuthorized {
        payment_id: PaymentId,
        player: PlayerId,
        channel: ChannelId,
    },
    /// A payment leg failed or was cancelled; the player must retry.
    PaymentFailed {
        payment_id: PaymentId,
        player: PlayerId,
        channel: ChannelId,
    },
    /// A solo game triggered the jackpot.
    JackpotWon {
        player: PlayerId,
        amount: UsdcAmount,
        channel: ChannelId,
    },
}

/// Port to the chat transport.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, message: &Outbound) -> Result<(), NotifyError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outbound_serializes_with_kind_tag() {
        let msg = Outbound::PaymentFailed {
            payment_id: PaymentId::new("pay-1"),
            player: PlayerId::new(7),
            channel: ChannelId::new("ch-1"),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["kind"], "payment_failed");
        assert_eq!(json["payment_id"], "pay-1");
        assert_eq!(json["player"], 7);
    }

    #[test]
    fn refund_reason_uses_kebab_case() {
        let json = serde_json::to_value(RefundReason::Declined).unwrap();
        assert_eq!(json, "declined");
    }
}
