//! Player record storage trait.

use crate::StoreError;
use quickdraw_types::{PlayerId, UsdcAmount};
use serde::{Deserialize, Serialize};

/// Lifetime statistics for one player identity.
///
/// Created on first score submission or first challenge involvement and
/// never deleted. Mutated only through the narrow [`PlayerStore`] operations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: PlayerId,
    /// Display name as last reported by the platform; last-seen wins.
    pub display_name: String,
    pub games_played: u64,
    /// Best score ever; monotonic non-decreasing.
    pub best_score: u32,
    pub total_score: u64,
    pub challenge_wins: u64,
    pub challenge_losses: u64,
    /// Cumulative prize earnings, raw USDC.
    pub total_earnings: UsdcAmount,
}

impl PlayerRecord {
    pub fn new(id: PlayerId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            games_played: 0,
            best_score: 0,
            total_score: 0,
            challenge_wins: 0,
            challenge_losses: 0,
            total_earnings: UsdcAmount::ZERO,
        }
    }
}

/// Result of recording a finished game for a player.
#[derive(Clone, Debug)]
pub struct GameTally {
    pub record: PlayerRecord,
    /// Whether this game raised the player's personal best.
    pub new_best: bool,
}

/// Trait for player-record storage.
///
/// Implementations serialize updates per identity internally; callers get
/// consistent read-modify-write semantics without holding any lock.
pub trait PlayerStore: Send + Sync {
    /// Ensure a record exists for this identity, refreshing the display
    /// name when one is supplied. Created records start at zero.
    fn touch(&self, id: PlayerId, display_name: Option<&str>);

    /// Record one finished game: games +1, total += score, best = max.
    fn record_game(&self, id: PlayerId, display_name: &str, score: u32) -> GameTally;

    /// Record a challenge win and the prize credited to the winner.
    fn record_win(&self, id: PlayerId, payout: UsdcAmount);

    /// Record a challenge loss.
    fn record_loss(&self, id: PlayerId);

    /// Look up a record.
    fn get(&self, id: PlayerId) -> Result<PlayerRecord, StoreError>;

    /// Top records ordered by best score descending.
    fn top_by_best(&self, limit: usize) -> Vec<PlayerRecord>;

    /// Total number of known players.
    fn player_count(&self) -> u64;
}
