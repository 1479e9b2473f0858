//! Memory-resident store — the production backing for a single-process bot.
//!
//! One mutex per logical table; updates hold the lock only for the in-memory
//! mutation, never across I/O.

use crate::meta::MetaStore;
use crate::player::{GameTally, PlayerRecord, PlayerStore};
use crate::StoreError;
use quickdraw_types::{PlayerId, UsdcAmount};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// In-memory player and aggregate store.
pub struct MemoryStore {
    players: Mutex<HashMap<PlayerId, PlayerRecord>>,
    games_played: AtomicU64,
    jackpot_pool: Mutex<UsdcAmount>,
    all_time_best: Mutex<u32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            players: Mutex::new(HashMap::new()),
            games_played: AtomicU64::new(0),
            jackpot_pool: Mutex::new(UsdcAmount::ZERO),
            all_time_best: Mutex::new(0),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayerStore for MemoryStore {
    fn touch(&self, id: PlayerId, display_name: Option<&str>) {
        let mut players = self.players.lock().unwrap();
        let record = players
            .entry(id)
            .or_insert_with(|| PlayerRecord::new(id, display_name.unwrap_or_default()));
        if let Some(name) = display_name {
            if !name.is_empty() {
                record.display_name = name.to_string();
            }
        }
    }

    fn record_game(&self, id: PlayerId, display_name: &str, score: u32) -> GameTally {
        let mut players = self.players.lock().unwrap();
        let record = players
            .entry(id)
            .or_insert_with(|| PlayerRecord::new(id, display_name));
        if !display_name.is_empty() {
            record.display_name = display_name.to_string();
        }
        record.games_played += 1;
        record.total_score += score as u64;
        let new_best = score > record.best_score;
        if new_best {
            record.best_score = score;
        }
        GameTally {
            record: record.clone(),
            new_best,
        }
    }

    fn record_win(&self, id: PlayerId, payout: UsdcAmount) {
        let mut players = self.players.lock().unwrap();
        let record = players
            .entry(id)
            .or_insert_with(|| PlayerRecord::new(id, ""));
        record.challenge_wins += 1;
        record.total_earnings = record.total_earnings.saturating_add(payout);
    }

    fn record_loss(&self, id: PlayerId) {
        let mut players = self.players.lock().unwrap();
        let record = players
            .entry(id)
            .or_insert_with(|| PlayerRecord::new(id, ""));
        record.challenge_losses += 1;
    }

    fn get(&self, id: PlayerId) -> Result<PlayerRecord, StoreError> {
        self.players
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::PlayerNotFound(id.to_string()))
    }

    fn top_by_best(&self, limit: usize) -> Vec<PlayerRecord> {
        let players = self.players.lock().unwrap();
        let mut records: Vec<PlayerRecord> = players.values().cloned().collect();
        records.sort_by(|a, b| b.best_score.cmp(&a.best_score));
        records.truncate(limit);
        records
    }

    fn player_count(&self) -> u64 {
        self.players.lock().unwrap().len() as u64
    }
}

impl MetaStore for MemoryStore {
    fn increment_games(&self) -> u64 {
        self.games_played.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn games_played(&self) -> u64 {
        self.games_played.load(Ordering::Relaxed)
    }

    fn accrue_jackpot(&self, amount: UsdcAmount) {
        let mut pool = self.jackpot_pool.lock().unwrap();
        *pool = pool.saturating_add(amount);
    }

    fn jackpot_pool(&self) -> UsdcAmount {
        *self.jackpot_pool.lock().unwrap()
    }

    fn drain_jackpot(&self, amount: UsdcAmount) -> Result<(), StoreError> {
        let mut pool = self.jackpot_pool.lock().unwrap();
        match pool.checked_sub(amount) {
            Some(remaining) => {
                *pool = remaining;
                Ok(())
            }
            None => Err(StoreError::JackpotUnderflow {
                requested: amount.raw(),
                available: pool.raw(),
            }),
        }
    }

    fn try_raise_best(&self, score: u32) -> bool {
        let mut best = self.all_time_best.lock().unwrap();
        if score > *best {
            *best = score;
            true
        } else {
            false
        }
    }

    fn all_time_best(&self) -> u32 {
        *self.all_time_best.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(n: u64) -> PlayerId {
        PlayerId::new(n)
    }

    #[test]
    fn record_game_accumulates_and_tracks_best() {
        let store = MemoryStore::new();
        let first = store.record_game(pid(1), "alice", 500);
        assert!(first.new_best);
        assert_eq!(first.record.games_played, 1);

        let second = store.record_game(pid(1), "alice", 300);
        assert!(!second.new_best);
        assert_eq!(second.record.best_score, 500);
        assert_eq!(second.record.total_score, 800);
        assert_eq!(second.record.games_played, 2);
    }

    #[test]
    fn display_name_last_seen_wins() {
        let store = MemoryStore::new();
        store.record_game(pid(1), "alice", 10);
        store.record_game(pid(1), "alicia", 20);
        assert_eq!(store.get(pid(1)).unwrap().display_name, "alicia");
    }

    #[test]
    fn touch_creates_without_game_stats() {
        let store = MemoryStore::new();
        store.touch(pid(2), Some("bob"));
        let record = store.get(pid(2)).unwrap();
        assert_eq!(record.games_played, 0);
        assert_eq!(record.display_name, "bob");
    }

    #[test]
    fn win_and_loss_counters() {
        let store = MemoryStore::new();
        store.record_win(pid(1), UsdcAmount::new(396_000));
        store.record_loss(pid(2));
        assert_eq!(store.get(pid(1)).unwrap().challenge_wins, 1);
        assert_eq!(
            store.get(pid(1)).unwrap().total_earnings,
            UsdcAmount::new(396_000)
        );
        assert_eq!(store.get(pid(2)).unwrap().challenge_losses, 1);
    }

    #[test]
    fn jackpot_drain_never_goes_negative() {
        let store = MemoryStore::new();
        store.accrue_jackpot(UsdcAmount::new(100));
        let err = store.drain_jackpot(UsdcAmount::new(200)).unwrap_err();
        assert!(matches!(err, StoreError::JackpotUnderflow { .. }));
        store.drain_jackpot(UsdcAmount::new(100)).unwrap();
        assert_eq!(store.jackpot_pool(), UsdcAmount::ZERO);
    }

    #[test]
    fn leaderboard_sorts_by_best_descending() {
        let store = MemoryStore::new();
        store.record_game(pid(1), "a", 100);
        store.record_game(pid(2), "b", 900);
        store.record_game(pid(3), "c", 500);
        let top = store.top_by_best(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].id, pid(2));
        assert_eq!(top[1].id, pid(3));
    }

    #[test]
    fn all_time_best_is_monotonic() {
        let store = MemoryStore::new();
        assert!(store.try_raise_best(400));
        assert!(!store.try_raise_best(400));
        assert!(!store.try_raise_best(250));
        assert!(store.try_raise_best(700));
        assert_eq!(store.all_time_best(), 700);
    }
}
