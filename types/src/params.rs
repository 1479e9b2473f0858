//! Game parameters — economic rules and lifecycle windows.
//!
//! All amounts are raw USDC units (6 decimals). Every field is operator-tunable
//! through the engine configuration.

use serde::{Deserialize, Serialize};

/// Economic and lifecycle parameters for the wager game.
///
/// Fields omitted from a config file fall back to [`GameParams::default`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GameParams {
    // ── Economics ────────────────────────────────────────────────────────
    /// Entry fee for a solo game, raw USDC. Default: 0.10 USDC.
    pub solo_entry_fee: u64,

    /// Wager per challenge leg when the command does not specify one.
    /// Default: 0.20 USDC. The prize pool is always 2x the wager.
    pub default_wager: u64,

    /// Smallest wager a challenge command may request.
    pub min_wager: u64,

    /// Largest wager a challenge command may request.
    pub max_wager: u64,

    /// Protocol fee on the prize pool, basis points. Default: 100 (1%).
    /// The fee rounds down; the remainder stays with the winner so that
    /// fee + payout always equals the pool exactly.
    pub protocol_fee_bps: u32,

    // ── Jackpot ──────────────────────────────────────────────────────────
    /// Fraction of each solo entry fee accrued into the jackpot pool,
    /// basis points. Default: 1000 (10%).
    pub jackpot_bps: u32,

    /// Fraction of the pool paid out when the jackpot triggers, basis
    /// points. The remainder seeds the next round. Default: 9000 (90%).
    pub jackpot_payout_bps: u32,

    /// Minimum pool size before the jackpot can trigger, raw USDC.
    pub jackpot_min_pool: u64,

    // ── Score intake ─────────────────────────────────────────────────────
    /// Largest accepted score. Scores above this are rejected outright.
    pub score_max: u32,

    /// Tolerated forward clock skew on client-reported timestamps, seconds.
    pub clock_skew_secs: u64,

    // ── Lifecycle windows ────────────────────────────────────────────────
    /// Retention of a failed payment entry after it turns terminal, seconds.
    pub failed_grace_secs: u64,

    /// Retention of a confirmed payment entry after it turns terminal, seconds.
    pub confirmed_grace_secs: u64,

    /// Age at which a challenge that has not reached ready is abandoned
    /// and its confirmed legs refunded, seconds.
    pub challenge_ttl_secs: u64,
}

impl GameParams {
    /// Production defaults for the duel game.
    pub fn duel_defaults() -> Self {
        Self {
            solo_entry_fee: 100_000,  // 0.10 USDC
            default_wager: 200_000,   // 0.20 USDC
            min_wager: 10_000,        // 0.01 USDC
            max_wager: 100_000_000,   // 100 USDC
            protocol_fee_bps: 100,    // 1%

            jackpot_bps: 1000,        // 10% of each solo entry fee
            jackpot_payout_bps: 9000, // 90% paid out, 10% seeds next round
            jackpot_min_pool: 1_000_000, // 1 USDC

            score_max: 100_000,
            clock_skew_secs: 60,

            failed_grace_secs: 30,
            confirmed_grace_secs: 300,
            challenge_ttl_secs: 24 * 3600,
        }
    }
}

impl Default for GameParams {
    fn default() -> Self {
        Self::duel_defaults()
    }
}
