//! Settlement computation — determines the winner and splits the pool.
//!
//! Everything in this crate is pure: no I/O, no clocks, no stores. The
//! engine feeds it scores and a wager and acts on the returned outcome.
//!
//! Conservation invariant: for a decided match, `fee + payout == 2 x wager`
//! exactly. The fee rounds down and the remainder stays with the winner, so
//! no raw unit is ever created or destroyed by settlement.

use quickdraw_types::{PlayerId, UsdcAmount};
use serde::{Deserialize, Serialize};

/// A decided match: who won, what they scored, and how the pool splits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub winner: PlayerId,
    pub loser: PlayerId,
    pub winner_score: u32,
    pub loser_score: u32,
    /// Total prize pool: 2x the wager.
    pub pool: UsdcAmount,
    /// Protocol fee, rounded down from `pool x fee_bps`.
    pub fee: UsdcAmount,
    /// Winner payout: `pool - fee`.
    pub payout: UsdcAmount,
}

/// Outcome of settling two scores against a wager.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    /// One player scored strictly higher.
    Decided(Settlement),
    /// Equal scores: the match is a push. Each side gets their wager back,
    /// no fee is taken, and neither record gains a win or a loss.
    Push { refund_each: UsdcAmount },
}

/// Settle a match from two (player, score) pairs.
///
/// The winner is the side with the strictly greater score; equal scores
/// are a push.
pub fn settle(
    a: (PlayerId, u32),
    b: (PlayerId, u32),
    wager: UsdcAmount,
    fee_bps: u32,
) -> MatchOutcome {
    let (a_id, a_score) = a;
    let (b_id, b_score) = b;

    if a_score == b_score {
        return MatchOutcome::Push { refund_each: wager };
    }

    let (winner, winner_score, loser, loser_score) = if a_score > b_score {
        (a_id, a_score, b_id, b_score)
    } else {
        (b_id, b_score, a_id, a_score)
    };

    let pool = wager.saturating_add(wager);
    let fee = pool.bps(fee_bps);
    let payout = pool - fee;

    MatchOutcome::Decided(Settlement {
        winner,
        loser,
        winner_score,
        loser_score,
        pool,
        fee,
        payout,
    })
}

/// The jackpot contribution of one solo entry fee.
pub fn jackpot_contribution(entry_fee: UsdcAmount, jackpot_bps: u32) -> UsdcAmount {
    entry_fee.bps(jackpot_bps)
}

/// Split of a triggered jackpot: the paid award plus the carryover that
/// seeds the next round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JackpotAward {
    pub payout: UsdcAmount,
    pub carryover: UsdcAmount,
}

/// Compute the jackpot award for the current pool.
pub fn jackpot_award(pool: UsdcAmount, payout_bps: u32) -> JackpotAward {
    let payout = pool.bps(payout_bps);
    JackpotAward {
        payout,
        carryover: pool - payout,
    }
}
