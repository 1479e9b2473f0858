//! Process-wide aggregate storage trait.

use crate::StoreError;
use quickdraw_types::UsdcAmount;

/// Trait for the process-wide aggregates: total games played, the jackpot
/// pool, and the all-time best score that gates the jackpot trigger.
pub trait MetaStore: Send + Sync {
    /// Increment the monotonic games-played counter; returns the new total.
    fn increment_games(&self) -> u64;

    fn games_played(&self) -> u64;

    /// Add a solo-entry contribution to the jackpot pool.
    fn accrue_jackpot(&self, amount: UsdcAmount);

    fn jackpot_pool(&self) -> UsdcAmount;

    /// Remove a payout from the pool. Fails rather than going negative.
    fn drain_jackpot(&self, amount: UsdcAmount) -> Result<(), StoreError>;

    /// Raise the all-time best score if `score` beats it.
    /// Returns true exactly when a new record was set.
    fn try_raise_best(&self, score: u32) -> bool;

    fn all_time_best(&self) -> u32;
}
