//! The challenge entity and its transition guards.

use crate::ChallengeError;
use quickdraw_types::{ChallengeId, ChannelId, PlayerId, Timestamp, TxHash, UsdcAmount};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Live phases of a challenge. Terminal outcomes are removals from the
/// book, never stored phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChallengePhase {
    /// Challenger's payment leg is pending.
    Created,
    /// Challenger paid; target has not answered the prompt.
    AwaitingResponse,
    /// Target accepted; target's payment leg is pending.
    AwaitingAcceptorPayment,
    /// Both legs confirmed; the match may be played.
    Ready,
    /// At least one score submitted.
    Scoring,
}

impl fmt::Display for ChallengePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChallengePhase::Created => "created",
            ChallengePhase::AwaitingResponse => "awaiting-response",
            ChallengePhase::AwaitingAcceptorPayment => "awaiting-acceptor-payment",
            ChallengePhase::Ready => "ready",
            ChallengePhase::Scoring => "scoring",
        };
        write!(f, "{s}")
    }
}

/// Which side of the match a player is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Challenger,
    Target,
}

/// Progress after recording one score.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScoreProgress {
    /// First score in; waiting on the opponent.
    AwaitingOpponent,
    /// Both scores known; the match must settle now.
    Complete {
        challenger_score: u32,
        target_score: u32,
    },
}

/// One two-player wagered match.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Challenge {
    pub id: ChallengeId,
    pub challenger: PlayerId,
    pub challenger_name: String,
    pub target: PlayerId,
    pub target_name: String,
    /// Wager per leg, fixed at creation. The prize pool is 2x this.
    pub wager: UsdcAmount,
    pub phase: ChallengePhase,
    pub challenger_paid: bool,
    pub target_paid: bool,
    pub challenger_score: Option<u32>,
    pub target_score: Option<u32>,
    /// Audit hashes for the confirmed legs.
    pub challenger_tx: Option<TxHash>,
    pub target_tx: Option<TxHash>,
    pub created_at: Timestamp,
    pub channel: ChannelId,
}

impl Challenge {
    pub fn side_of(&self, player: PlayerId) -> Option<Side> {
        if player == self.challenger {
            Some(Side::Challenger)
        } else if player == self.target {
            Some(Side::Target)
        } else {
            None
        }
    }

    pub fn is_party(&self, player: PlayerId) -> bool {
        self.side_of(player).is_some()
    }

    /// The opponent of `player`, with their display name.
    pub fn opponent_of(&self, player: PlayerId) -> Option<(PlayerId, &str)> {
        match self.side_of(player)? {
            Side::Challenger => Some((self.target, self.target_name.as_str())),
            Side::Target => Some((self.challenger, self.challenger_name.as_str())),
        }
    }

    /// Confirmed legs as (payer, audit hash, wager) tuples — the refund
    /// obligations if this challenge is torn down before settlement.
    pub fn confirmed_legs(&self) -> Vec<(PlayerId, Option<TxHash>, UsdcAmount)> {
        let mut legs = Vec::new();
        if self.challenger_paid {
            legs.push((self.challenger, self.challenger_tx, self.wager));
        }
        if self.target_paid {
            legs.push((self.target, self.target_tx, self.wager));
        }
        legs
    }

    fn wrong_phase(&self, action: &'static str) -> ChallengeError {
        ChallengeError::WrongPhase {
            challenge: self.id.to_string(),
            phase: self.phase.to_string(),
            action,
        }
    }

    /// Challenger's leg confirmed: `Created -> AwaitingResponse`.
    pub fn confirm_initiator_leg(&mut self, tx: TxHash) -> Result<(), ChallengeError> {
        if self.phase != ChallengePhase::Created {
            return Err(self.wrong_phase("confirm the initiator leg"));
        }
        self.challenger_paid = true;
        self.challenger_tx = Some(tx);
        self.phase = ChallengePhase::AwaitingResponse;
        Ok(())
    }

    /// Target accepted: `AwaitingResponse -> AwaitingAcceptorPayment`.
    pub fn accept(&mut self, responder: PlayerId) -> Result<(), ChallengeError> {
        self.check_responder(responder)?;
        if self.phase != ChallengePhase::AwaitingResponse {
            return Err(self.wrong_phase("accept"));
        }
        self.phase = ChallengePhase::AwaitingAcceptorPayment;
        Ok(())
    }

    /// Validate a decline. The caller removes the challenge on `Ok`.
    pub fn check_decline(&self, responder: PlayerId) -> Result<(), ChallengeError> {
        self.check_responder(responder)?;
        if self.phase != ChallengePhase::AwaitingResponse {
            return Err(self.wrong_phase("decline"));
        }
        Ok(())
    }

    fn check_responder(&self, responder: PlayerId) -> Result<(), ChallengeError> {
        if responder != self.target {
            return Err(ChallengeError::NotTarget(self.id.to_string()));
        }
        Ok(())
    }

    /// Acceptor's leg confirmed: `AwaitingAcceptorPayment -> Ready`.
    pub fn confirm_acceptor_leg(&mut self, tx: TxHash) -> Result<(), ChallengeError> {
        if self.phase != ChallengePhase::AwaitingAcceptorPayment {
            return Err(self.wrong_phase("confirm the acceptor leg"));
        }
        self.target_paid = true;
        self.target_tx = Some(tx);
        self.phase = ChallengePhase::Ready;
        Ok(())
    }

    /// Record one score: `Ready|Scoring -> Scoring`, set-once per side.
    ///
    /// Scores are only accepted once both legs are paid, and a side that
    /// has already scored is rejected rather than overwritten.
    pub fn record_score(
        &mut self,
        player: PlayerId,
        score: u32,
    ) -> Result<ScoreProgress, ChallengeError> {
        let side = self
            .side_of(player)
            .ok_or_else(|| ChallengeError::NotParty {
                player: player.to_string(),
                challenge: self.id.to_string(),
            })?;
        if !matches!(self.phase, ChallengePhase::Ready | ChallengePhase::Scoring) {
            return Err(self.wrong_phase("record a score"));
        }
        debug_assert!(self.challenger_paid && self.target_paid);

        let slot = match side {
            Side::Challenger => &mut self.challenger_score,
            Side::Target => &mut self.target_score,
        };
        if slot.is_some() {
            return Err(ChallengeError::AlreadyScored(player.to_string()));
        }
        *slot = Some(score);
        self.phase = ChallengePhase::Scoring;

        match (self.challenger_score, self.target_score) {
            (Some(challenger_score), Some(target_score)) => Ok(ScoreProgress::Complete {
                challenger_score,
                target_score,
            }),
            _ => Ok(ScoreProgress::AwaitingOpponent),
        }
    }

    /// Whether this challenge is still collecting payments or a response.
    /// Only such challenges are eligible for the abandonment sweep.
    pub fn is_pre_ready(&self) -> bool {
        matches!(
            self.phase,
            ChallengePhase::Created
                | ChallengePhase::AwaitingResponse
                | ChallengePhase::AwaitingAcceptorPayment
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn challenge() -> Challenge {
        Challenge {
            id: ChallengeId::new("duel-000001"),
            challenger: PlayerId::new(1),
            challenger_name: "alice".into(),
            target: PlayerId::new(2),
            target_name: "bob".into(),
            wager: UsdcAmount::new(200_000),
            phase: ChallengePhase::Created,
            challenger_paid: false,
            target_paid: false,
            challenger_score: None,
            target_score: None,
            challenger_tx: None,
            target_tx: None,
            created_at: Timestamp::new(1000),
            channel: ChannelId::new("ch-1"),
        }
    }

    fn tx(byte: u8) -> TxHash {
        TxHash::new([byte; 32])
    }

    #[test]
    fn happy_path_walks_every_phase() {
        let mut c = challenge();
        c.confirm_initiator_leg(tx(0xA1)).unwrap();
        assert_eq!(c.phase, ChallengePhase::AwaitingResponse);

        c.accept(PlayerId::new(2)).unwrap();
        assert_eq!(c.phase, ChallengePhase::AwaitingAcceptorPayment);

        c.confirm_acceptor_leg(tx(0xB2)).unwrap();
        assert_eq!(c.phase, ChallengePhase::Ready);
        assert!(c.challenger_paid && c.target_paid);

        assert_eq!(
            c.record_score(PlayerId::new(1), 800).unwrap(),
            ScoreProgress::AwaitingOpponent
        );
        assert_eq!(c.phase, ChallengePhase::Scoring);
        assert_eq!(
            c.record_score(PlayerId::new(2), 650).unwrap(),
            ScoreProgress::Complete {
                challenger_score: 800,
                target_score: 650
            }
        );
    }

    #[test]
    fn scores_require_both_legs_paid() {
        let mut c = challenge();
        c.confirm_initiator_leg(tx(0xA1)).unwrap();
        let err = c.record_score(PlayerId::new(1), 500).unwrap_err();
        assert!(matches!(err, ChallengeError::WrongPhase { .. }));
        assert_eq!(c.challenger_score, None);
    }

    #[test]
    fn second_score_from_same_side_is_rejected_not_overwritten() {
        let mut c = challenge();
        c.confirm_initiator_leg(tx(0xA1)).unwrap();
        c.accept(PlayerId::new(2)).unwrap();
        c.confirm_acceptor_leg(tx(0xB2)).unwrap();

        c.record_score(PlayerId::new(1), 800).unwrap();
        let err = c.record_score(PlayerId::new(1), 999).unwrap_err();
        assert!(matches!(err, ChallengeError::AlreadyScored(_)));
        assert_eq!(c.challenger_score, Some(800));
    }

    #[test]
    fn only_the_target_may_respond() {
        let mut c = challenge();
        c.confirm_initiator_leg(tx(0xA1)).unwrap();

        assert!(matches!(
            c.accept(PlayerId::new(1)).unwrap_err(),
            ChallengeError::NotTarget(_)
        ));
        assert!(matches!(
            c.check_decline(PlayerId::new(99)).unwrap_err(),
            ChallengeError::NotTarget(_)
        ));
        assert!(c.check_decline(PlayerId::new(2)).is_ok());
    }

    #[test]
    fn responses_are_phase_guarded() {
        let mut c = challenge();
        // Target cannot answer before the challenger's leg is confirmed.
        assert!(matches!(
            c.accept(PlayerId::new(2)).unwrap_err(),
            ChallengeError::WrongPhase { .. }
        ));

        c.confirm_initiator_leg(tx(0xA1)).unwrap();
        c.accept(PlayerId::new(2)).unwrap();
        // A second answer after accepting is rejected.
        assert!(matches!(
            c.check_decline(PlayerId::new(2)).unwrap_err(),
            ChallengeError::WrongPhase { .. }
        ));
    }

    #[test]
    fn duplicate_leg_confirmation_is_rejected() {
        let mut c = challenge();
        c.confirm_initiator_leg(tx(0xA1)).unwrap();
        assert!(matches!(
            c.confirm_initiator_leg(tx(0xA2)).unwrap_err(),
            ChallengeError::WrongPhase { .. }
        ));
        assert_eq!(c.challenger_tx, Some(tx(0xA1)));
    }

    #[test]
    fn confirmed_legs_lists_refund_obligations() {
        let mut c = challenge();
        assert!(c.confirmed_legs().is_empty());
        c.confirm_initiator_leg(tx(0xA1)).unwrap();
        let legs = c.confirmed_legs();
        assert_eq!(legs.len(), 1);
        assert_eq!(legs[0].0, PlayerId::new(1));
        assert_eq!(legs[0].2, UsdcAmount::new(200_000));
    }
}
