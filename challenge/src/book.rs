//! The challenge book — owner of the live challenge set.

use crate::state::{Challenge, ChallengePhase, ScoreProgress};
use crate::ChallengeError;
use quickdraw_types::{
    ChallengeId, ChannelId, GameParams, PlayerId, Timestamp, TxHash, UsdcAmount,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Owns every live challenge and serializes access to the set.
///
/// The book's lock covers only the map operation itself. Callers that need
/// a whole event handler serialized against other events on the same
/// challenge (confirmation waits suspend mid-handler) hold the engine's
/// per-challenge lock around their calls into the book.
pub struct ChallengeBook {
    live: Mutex<HashMap<ChallengeId, Challenge>>,
    next_seq: AtomicU64,
}

impl ChallengeBook {
    pub fn new() -> Self {
        Self {
            live: Mutex::new(HashMap::new()),
            next_seq: AtomicU64::new(1),
        }
    }

    /// Create a challenge in `Created` phase and return it.
    ///
    /// Guards: no self-challenges, wager within configured bounds, and at
    /// most one live challenge per player on either side.
    pub fn create(
        &self,
        challenger: PlayerId,
        challenger_name: impl Into<String>,
        target: PlayerId,
        target_name: impl Into<String>,
        wager: UsdcAmount,
        params: &GameParams,
        channel: ChannelId,
        now: Timestamp,
    ) -> Result<Challenge, ChallengeError> {
        if challenger == target {
            return Err(ChallengeError::SelfChallenge);
        }
        if wager.raw() < params.min_wager || wager.raw() > params.max_wager {
            return Err(ChallengeError::WagerOutOfRange(wager.raw()));
        }

        let mut live = self.live.lock().unwrap();
        for existing in live.values() {
            if existing.is_party(challenger) {
                return Err(ChallengeError::AlreadyActive(challenger.to_string()));
            }
            if existing.is_party(target) {
                return Err(ChallengeError::AlreadyActive(target.to_string()));
            }
        }

        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let id = ChallengeId::new(format!("duel-{seq:06}"));
        let challenge = Challenge {
            id: id.clone(),
            challenger,
            challenger_name: challenger_name.into(),
            target,
            target_name: target_name.into(),
            wager,
            phase: ChallengePhase::Created,
            challenger_paid: false,
            target_paid: false,
            challenger_score: None,
            target_score: None,
            challenger_tx: None,
            target_tx: None,
            created_at: now,
            channel,
        };
        live.insert(id, challenge.clone());
        Ok(challenge)
    }

    pub fn get(&self, id: &ChallengeId) -> Option<Challenge> {
        self.live.lock().unwrap().get(id).cloned()
    }

    /// The live challenge a player is party to, if any.
    pub fn find_for_player(&self, player: PlayerId) -> Option<Challenge> {
        self.live
            .lock()
            .unwrap()
            .values()
            .find(|c| c.is_party(player))
            .cloned()
    }

    fn with_challenge<T>(
        &self,
        id: &ChallengeId,
        apply: impl FnOnce(&mut Challenge) -> Result<T, ChallengeError>,
    ) -> Result<(Challenge, T), ChallengeError> {
        let mut live = self.live.lock().unwrap();
        let challenge = live
            .get_mut(id)
            .ok_or_else(|| ChallengeError::NotFound(id.to_string()))?;
        let out = apply(challenge)?;
        Ok((challenge.clone(), out))
    }

    /// Apply the initiator-leg confirmation; returns the updated challenge.
    pub fn confirm_initiator_leg(
        &self,
        id: &ChallengeId,
        tx: TxHash,
    ) -> Result<Challenge, ChallengeError> {
        let (challenge, ()) = self.with_challenge(id, |c| c.confirm_initiator_leg(tx))?;
        Ok(challenge)
    }

    /// Apply the acceptor-leg confirmation; returns the updated challenge.
    pub fn confirm_acceptor_leg(
        &self,
        id: &ChallengeId,
        tx: TxHash,
    ) -> Result<Challenge, ChallengeError> {
        let (challenge, ()) = self.with_challenge(id, |c| c.confirm_acceptor_leg(tx))?;
        Ok(challenge)
    }

    /// Apply an accept response; returns the updated challenge.
    pub fn accept(
        &self,
        id: &ChallengeId,
        responder: PlayerId,
    ) -> Result<Challenge, ChallengeError> {
        let (challenge, ()) = self.with_challenge(id, |c| c.accept(responder))?;
        Ok(challenge)
    }

    /// Apply a decline response: validates, then removes and returns the
    /// challenge. The caller owes the challenger a refund attempt.
    pub fn decline(
        &self,
        id: &ChallengeId,
        responder: PlayerId,
    ) -> Result<Challenge, ChallengeError> {
        let mut live = self.live.lock().unwrap();
        let challenge = live
            .get(id)
            .ok_or_else(|| ChallengeError::NotFound(id.to_string()))?;
        challenge.check_decline(responder)?;
        Ok(live.remove(id).expect("entry present under lock"))
    }

    /// Record a score; returns the updated challenge and the progress.
    pub fn record_score(
        &self,
        id: &ChallengeId,
        player: PlayerId,
        score: u32,
    ) -> Result<(Challenge, ScoreProgress), ChallengeError> {
        self.with_challenge(id, |c| c.record_score(player, score))
    }

    /// Remove a fully-scored challenge for settlement. The caller must have
    /// just observed `ScoreProgress::Complete` under the engine's
    /// per-challenge lock.
    pub fn retire(&self, id: &ChallengeId) -> Option<Challenge> {
        self.live.lock().unwrap().remove(id)
    }

    /// Remove the challenge if it has not reached ready. Used when a
    /// payment leg fails terminally: the match can never fill, so it is
    /// torn down instead of squatting on both players until the TTL sweep.
    pub fn remove_pre_ready(&self, id: &ChallengeId) -> Option<Challenge> {
        let mut live = self.live.lock().unwrap();
        if live.get(id)?.is_pre_ready() {
            live.remove(id)
        } else {
            None
        }
    }

    /// Ids of pre-ready challenges older than the TTL. The sweeper takes
    /// each challenge's lock and re-checks with [`remove_if_stale`] before
    /// acting, so this peek never needs to be authoritative.
    ///
    /// [`remove_if_stale`]: Self::remove_if_stale
    pub fn stale_ids(&self, params: &GameParams, now: Timestamp) -> Vec<ChallengeId> {
        self.live
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.is_pre_ready() && c.created_at.has_expired(params.challenge_ttl_secs, now))
            .map(|c| c.id.clone())
            .collect()
    }

    /// Remove and return the challenge if it is still stale. The caller
    /// owes each confirmed leg a refund attempt.
    pub fn remove_if_stale(
        &self,
        id: &ChallengeId,
        params: &GameParams,
        now: Timestamp,
    ) -> Option<Challenge> {
        let mut live = self.live.lock().unwrap();
        let challenge = live.get(id)?;
        if challenge.is_pre_ready()
            && challenge.created_at.has_expired(params.challenge_ttl_secs, now)
        {
            live.remove(id)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.live.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.lock().unwrap().is_empty()
    }
}

impl Default for ChallengeBook {
    fn default() -> Self {
        Self::new()
    }
}
