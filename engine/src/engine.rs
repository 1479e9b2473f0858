//! The game engine proper — every inbound event lands here.

use crate::config::{ConfirmPolicy, EngineConfig};
use crate::intake::{self, ScoreSubmission};
use crate::locks::KeyedMutex;
use crate::shutdown::ShutdownController;
use crate::EngineError;
use quickdraw_challenge::{Challenge, ChallengeBook, ChallengeError, ScoreProgress, Side};
use quickdraw_chain::{ChainError, Disburser, TransferClient, TxOutcome, TxVerifier, WalletDirectory};
use quickdraw_ledger::{MarkOutcome, PaymentLedger, PaymentRequest};
use quickdraw_messages::{Notifier, Outbound, RefundReason};
use quickdraw_settlement::{self as settlement, MatchOutcome};
use quickdraw_store::{MetaStore, PlayerRecord, PlayerStore};
use quickdraw_types::{
    ChallengeId, ChannelId, GameParams, PaymentId, PaymentPurpose, PaymentStatus, PlayerId,
    Timestamp, TxHash, UsdcAmount,
};
use quickdraw_utils::StatsCounter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Counter names reported through telemetry.
const COUNTERS: &[&str] = &[
    "challenge_games",
    "challenges_abandoned",
    "challenges_created",
    "challenges_pushed",
    "challenges_refunded",
    "challenges_settled",
    "disbursement_failures",
    "jackpots_won",
    "payments_confirmed",
    "payments_failed",
    "solo_games",
];

/// Result of creating a challenge: the id plus the initiator payment leg.
#[derive(Clone, Debug, Serialize)]
pub struct ChallengeCreated {
    pub challenge_id: ChallengeId,
    pub payment_id: PaymentId,
    pub amount: UsdcAmount,
}

/// Result of opening a solo-play leg.
#[derive(Clone, Debug, Serialize)]
pub struct SoloStarted {
    pub payment_id: PaymentId,
    pub amount: UsdcAmount,
}

/// The target's answer to a challenge prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseChoice {
    Accept,
    Decline,
}

/// Outcome of an accept/decline response.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResponseOutcome {
    Accepted {
        payment_id: PaymentId,
        amount: UsdcAmount,
    },
    Declined {
        /// Whether the challenger's refund was confirmed on-chain. A false
        /// here has already been surfaced for manual reconciliation.
        refunded: bool,
    },
}

/// Response to a score submission.
#[derive(Clone, Debug, Serialize)]
pub struct ScoreReport {
    pub success: bool,
    pub score: u32,
    /// Whether this raised the player's personal best.
    pub new_best: bool,
    pub challenge_complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_winner: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prize: Option<UsdcAmount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent: Option<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jackpot: Option<UsdcAmount>,
}

impl ScoreReport {
    fn solo(score: u32, new_best: bool, jackpot: Option<UsdcAmount>) -> Self {
        Self {
            success: true,
            score,
            new_best,
            challenge_complete: false,
            is_winner: None,
            prize: None,
            opponent: None,
            opponent_name: None,
            jackpot,
        }
    }
}

/// Answer to the per-player challenge status poll.
#[derive(Clone, Debug, Serialize)]
pub struct ChallengeStatusView {
    pub has_challenge: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge_id: Option<ChallengeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_paid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_played: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wager: Option<UsdcAmount>,
}

/// Aggregate snapshot for the telemetry endpoint.
#[derive(Clone, Debug, Serialize)]
pub struct Telemetry {
    pub games_played: u64,
    pub players: u64,
    pub live_challenges: usize,
    pub ledger_entries: usize,
    pub pending_payments: usize,
    pub jackpot_pool: UsdcAmount,
    pub all_time_best: u32,
    pub counters: BTreeMap<&'static str, u64>,
}

/// The engine: owns the stores, the ledger, the challenge book, and the
/// chain boundary, and serializes event handling per entity.
pub struct GameEngine {
    params: GameParams,
    confirm_policy: ConfirmPolicy,
    announce_channel: ChannelId,
    players: Arc<dyn PlayerStore>,
    meta: Arc<dyn MetaStore>,
    ledger: PaymentLedger,
    book: ChallengeBook,
    verifier: Arc<dyn TxVerifier>,
    disburser: Disburser,
    notifier: Arc<dyn Notifier>,
    stats: StatsCounter,
    challenge_locks: KeyedMutex<ChallengeId>,
    next_solo_payment: AtomicU64,
}

impl GameEngine {
    pub fn new(
        config: &EngineConfig,
        verifier: Arc<dyn TxVerifier>,
        directory: Arc<dyn WalletDirectory>,
        transfer: Arc<dyn TransferClient>,
        notifier: Arc<dyn Notifier>,
        players: Arc<dyn PlayerStore>,
        meta: Arc<dyn MetaStore>,
    ) -> Self {
        let disburser = Disburser::new(directory, transfer, Arc::clone(&verifier));
        Self {
            params: config.params.clone(),
            confirm_policy: config.confirm_policy,
            announce_channel: ChannelId::new(config.announce_channel.clone()),
            players,
            meta,
            ledger: PaymentLedger::new(),
            book: ChallengeBook::new(),
            verifier,
            disburser,
            notifier,
            stats: StatsCounter::new(COUNTERS),
            challenge_locks: KeyedMutex::new(),
            next_solo_payment: AtomicU64::new(1),
        }
    }

    fn now(&self) -> Timestamp {
        Timestamp::now()
    }

    /// Deliver an outbound notification. Delivery failures are logged and
    /// never affect core state.
    async fn notify(&self, message: Outbound) {
        if let Err(e) = self.notifier.deliver(&message).await {
            tracing::warn!("outbound notification failed: {e}");
        }
    }

    // ── Commands ─────────────────────────────────────────────────────────

    /// Create a challenge plus its initiator payment leg and prompt the
    /// challenger to pay.
    pub async fn create_challenge(
        &self,
        challenger: PlayerId,
        challenger_name: &str,
        target: PlayerId,
        target_name: &str,
        wager: Option<u64>,
        channel: ChannelId,
    ) -> Result<ChallengeCreated, EngineError> {
        let wager = UsdcAmount::new(wager.unwrap_or(self.params.default_wager));
        let now = self.now();
        let challenge = self.book.create(
            challenger,
            challenger_name,
            target,
            target_name,
            wager,
            &self.params,
            channel.clone(),
            now,
        )?;

        // Both parties exist from the moment the challenge does.
        self.players.touch(challenger, Some(challenger_name));
        self.players.touch(target, Some(target_name));

        let payment_id = PaymentId::new(format!("{}-initiator", challenge.id));
        self.ledger.open(
            payment_id.clone(),
            challenger,
            PaymentPurpose::ChallengeInitiator,
            wager,
            channel.clone(),
            Some(challenge.id.clone()),
            now,
        )?;
        self.stats.incr("challenges_created");
        tracing::info!(
            challenge = %challenge.id,
            %challenger,
            %target,
            %wager,
            "challenge created, awaiting initiator payment"
        );

        self.notify(Outbound::PaymentRequest {
            payment_id: payment_id.clone(),
            player: challenger,
            amount: wager,
            purpose: PaymentPurpose::ChallengeInitiator,
            channel,
        })
        .await;

        Ok(ChallengeCreated {
            challenge_id: challenge.id,
            payment_id,
            amount: wager,
        })
    }

    /// Open a solo-play entry-fee leg and prompt the player to pay.
    pub async fn start_solo(
        &self,
        player: PlayerId,
        channel: ChannelId,
    ) -> Result<SoloStarted, EngineError> {
        let seq = self.next_solo_payment.fetch_add(1, Ordering::Relaxed);
        let payment_id = PaymentId::new(format!("solo-{seq:08}"));
        let amount = UsdcAmount::new(self.params.solo_entry_fee);
        self.ledger.open(
            payment_id.clone(),
            player,
            PaymentPurpose::SoloPlay,
            amount,
            channel.clone(),
            None,
            self.now(),
        )?;
        self.notify(Outbound::PaymentRequest {
            payment_id: payment_id.clone(),
            player,
            amount,
            purpose: PaymentPurpose::SoloPlay,
            channel,
        })
        .await;
        Ok(SoloStarted { payment_id, amount })
    }

    // ── Payment confirmation ─────────────────────────────────────────────

    /// Handle the interaction layer's payment callback.
    ///
    /// An absent hash means the payer cancelled. A present hash is worth
    /// nothing until the verifier has watched it confirm — this handler
    /// suspends on that wait before touching any state. Idempotent: a
    /// callback for an already-terminal entry performs no side effects.
    pub async fn handle_payment_callback(
        &self,
        payment_id: &PaymentId,
        tx_hash: Option<TxHash>,
    ) -> Result<PaymentStatus, EngineError> {
        let entry = self
            .ledger
            .get(payment_id)
            .ok_or_else(|| quickdraw_ledger::LedgerError::NotFound(payment_id.to_string()))?;
        if entry.status.is_terminal() {
            tracing::debug!(%payment_id, status = %entry.status, "duplicate payment callback ignored");
            return Ok(entry.status);
        }

        let Some(hash) = tx_hash else {
            tracing::info!(%payment_id, "payment cancelled (no transaction hash)");
            self.fail_payment(&entry).await;
            self.teardown_failed_challenge(&entry).await;
            return Ok(PaymentStatus::Failed);
        };

        let confirmed = match self.verifier.await_confirmation(&hash).await {
            Ok(TxOutcome::Success) => true,
            Ok(TxOutcome::Reverted) => {
                tracing::warn!(%payment_id, tx = %hash, "payment transaction reverted");
                false
            }
            Err(ChainError::Timeout(secs)) => match self.confirm_policy {
                ConfirmPolicy::Fail => {
                    tracing::warn!(%payment_id, tx = %hash, timeout_secs = secs, "confirmation timed out, failing leg");
                    false
                }
                ConfirmPolicy::PresumeSuccess => {
                    tracing::warn!(
                        %payment_id,
                        tx = %hash,
                        timeout_secs = secs,
                        "confirmation timed out — presuming success per configured policy"
                    );
                    true
                }
            },
            Err(e) => {
                // Transport-level verification error: drop the entry so the
                // payer re-issues with a fresh payment.
                tracing::error!(%payment_id, tx = %hash, "payment verification error: {e}");
                self.ledger.remove(payment_id);
                self.notify(Outbound::PaymentFailed {
                    payment_id: payment_id.clone(),
                    player: entry.owner,
                    channel: entry.channel.clone(),
                })
                .await;
                self.teardown_failed_challenge(&entry).await;
                return Ok(PaymentStatus::Failed);
            }
        };

        if !confirmed {
            self.fail_payment(&entry).await;
            self.teardown_failed_challenge(&entry).await;
            return Ok(PaymentStatus::Failed);
        }

        let outcome = self.ledger.mark_confirmed(payment_id, hash, self.now())?;
        let MarkOutcome::Transitioned(entry) = outcome else {
            // A concurrent callback won the transition; its side effects stand.
            let status = self.ledger.get(payment_id).map(|e| e.status);
            return Ok(status.unwrap_or(PaymentStatus::Confirmed));
        };
        self.stats.incr("payments_confirmed");

        match entry.purpose {
            PaymentPurpose::SoloPlay => {
                tracing::info!(%payment_id, player = %entry.owner, "solo entry confirmed");
                self.notify(Outbound::GameAuthorized {
                    payment_id: entry.id.clone(),
                    player: entry.owner,
                    channel: entry.channel.clone(),
                })
                .await;
            }
            PaymentPurpose::ChallengeInitiator => self.advance_initiator(&entry, hash).await,
            PaymentPurpose::ChallengeAcceptor => self.advance_acceptor(&entry, hash).await,
        }
        Ok(PaymentStatus::Confirmed)
    }

    async fn fail_payment(&self, entry: &PaymentRequest) {
        let failed = self
            .ledger
            .mark_failed(&entry.id, self.now())
            .map(|o| o.transitioned())
            .unwrap_or(false);
        if failed {
            self.stats.incr("payments_failed");
            self.notify(Outbound::PaymentFailed {
                payment_id: entry.id.clone(),
                player: entry.owner,
                channel: entry.channel.clone(),
            })
            .await;
        }
    }

    /// A challenge leg failed terminally: the match can never fill. Tear
    /// the pre-ready challenge down and return any already-confirmed leg,
    /// instead of letting it squat on both players until the TTL sweep.
    async fn teardown_failed_challenge(&self, entry: &PaymentRequest) {
        let Some(challenge_id) = entry.challenge.clone() else {
            return;
        };
        let _guard = self.challenge_locks.acquire(&challenge_id).await;
        let Some(challenge) = self.book.remove_pre_ready(&challenge_id) else {
            return;
        };
        self.stats.incr("challenges_abandoned");
        tracing::info!(
            challenge = %challenge_id,
            phase = %challenge.phase,
            "retiring challenge after failed payment leg"
        );
        for (player, _tx, amount) in challenge.confirmed_legs() {
            self.refund(
                player,
                amount,
                RefundReason::Abandoned,
                challenge.channel.clone(),
                "payment leg failed",
            )
            .await;
        }
        self.challenge_locks.discard(&challenge_id);
    }

    async fn advance_initiator(&self, entry: &PaymentRequest, hash: TxHash) {
        let Some(challenge_id) = entry.challenge.clone() else {
            tracing::error!(payment = %entry.id, "initiator leg has no owning challenge");
            return;
        };
        let _guard = self.challenge_locks.acquire(&challenge_id).await;
        match self.book.confirm_initiator_leg(&challenge_id, hash) {
            Ok(challenge) => {
                tracing::info!(challenge = %challenge_id, "initiator leg confirmed, prompting target");
                self.notify(Outbound::ChallengePrompt {
                    challenge_id,
                    target: challenge.target,
                    challenger_name: challenge.challenger_name,
                    wager: challenge.wager,
                    channel: challenge.channel,
                })
                .await;
            }
            Err(e) => self.orphaned_leg(entry, &challenge_id, e).await,
        }
    }

    async fn advance_acceptor(&self, entry: &PaymentRequest, hash: TxHash) {
        let Some(challenge_id) = entry.challenge.clone() else {
            tracing::error!(payment = %entry.id, "acceptor leg has no owning challenge");
            return;
        };
        let _guard = self.challenge_locks.acquire(&challenge_id).await;
        match self.book.confirm_acceptor_leg(&challenge_id, hash) {
            Ok(challenge) => {
                tracing::info!(challenge = %challenge_id, "both legs confirmed, match ready");
                self.notify(Outbound::MatchReady {
                    challenge_id,
                    challenger: challenge.challenger,
                    target: challenge.target,
                    wager: challenge.wager,
                    channel: challenge.channel,
                })
                .await;
            }
            Err(e) => self.orphaned_leg(entry, &challenge_id, e).await,
        }
    }

    /// A leg confirmed for a challenge that can no longer take it — retired
    /// by a sweep or a concurrent decline. The money is real, so it goes
    /// straight back.
    async fn orphaned_leg(&self, entry: &PaymentRequest, challenge_id: &ChallengeId, e: ChallengeError) {
        tracing::warn!(
            payment = %entry.id,
            challenge = %challenge_id,
            "confirmed leg cannot advance its challenge ({e}), refunding payer"
        );
        self.refund(
            entry.owner,
            entry.amount,
            RefundReason::Abandoned,
            entry.channel.clone(),
            "late confirmation for a retired challenge",
        )
        .await;
    }

    // ── Accept / decline ─────────────────────────────────────────────────

    /// Handle the target's answer to the challenge prompt.
    pub async fn handle_challenge_response(
        &self,
        challenge_id: &ChallengeId,
        responder: PlayerId,
        choice: ResponseChoice,
    ) -> Result<ResponseOutcome, EngineError> {
        let _guard = self.challenge_locks.acquire(challenge_id).await;
        match choice {
            ResponseChoice::Accept => {
                let challenge = self.book.accept(challenge_id, responder)?;
                let payment_id = PaymentId::new(format!("{challenge_id}-acceptor"));
                self.ledger.open(
                    payment_id.clone(),
                    challenge.target,
                    PaymentPurpose::ChallengeAcceptor,
                    challenge.wager,
                    challenge.channel.clone(),
                    Some(challenge_id.clone()),
                    self.now(),
                )?;
                tracing::info!(challenge = %challenge_id, "target accepted, awaiting acceptor payment");
                self.notify(Outbound::PaymentRequest {
                    payment_id: payment_id.clone(),
                    player: challenge.target,
                    amount: challenge.wager,
                    purpose: PaymentPurpose::ChallengeAcceptor,
                    channel: challenge.channel,
                })
                .await;
                Ok(ResponseOutcome::Accepted {
                    payment_id,
                    amount: challenge.wager,
                })
            }
            ResponseChoice::Decline => {
                let challenge = self.book.decline(challenge_id, responder)?;
                self.stats.incr("challenges_refunded");
                tracing::info!(challenge = %challenge_id, "target declined, refunding challenger");
                // The challenge is already retired; the refund outcome
                // cannot resurrect it.
                let refunded = if challenge.challenger_paid {
                    self.refund(
                        challenge.challenger,
                        challenge.wager,
                        RefundReason::Declined,
                        challenge.channel.clone(),
                        "challenge declined",
                    )
                    .await
                } else {
                    false
                };
                self.challenge_locks.discard(challenge_id);
                Ok(ResponseOutcome::Declined { refunded })
            }
        }
    }

    // ── Score intake ─────────────────────────────────────────────────────

    /// Handle a score submission from the game client.
    ///
    /// Validation failures reject with no state mutation. A submission
    /// whose challenge id does not resolve to a live challenge the player
    /// is party to counts as solo play.
    pub async fn handle_score(&self, submission: ScoreSubmission) -> Result<ScoreReport, EngineError> {
        let now = self.now();
        let score = intake::validate(&submission, &self.params, now)?;

        if let Some(challenge_id) = submission.challenge_id.clone() {
            let belongs = self
                .book
                .get(&challenge_id)
                .is_some_and(|c| c.is_party(submission.identity));
            if belongs {
                return self.handle_challenge_score(&challenge_id, &submission, score).await;
            }
        }
        Ok(self.handle_solo_score(&submission, score).await)
    }

    async fn handle_challenge_score(
        &self,
        challenge_id: &ChallengeId,
        submission: &ScoreSubmission,
        score: u32,
    ) -> Result<ScoreReport, EngineError> {
        let _guard = self.challenge_locks.acquire(challenge_id).await;
        let (challenge, progress) =
            match self.book.record_score(challenge_id, submission.identity, score) {
                Ok(done) => done,
                Err(ChallengeError::NotFound(_)) => {
                    // Retired between the party check and the lock; solo it is.
                    return Ok(self.handle_solo_score(submission, score).await);
                }
                Err(e) => return Err(e.into()),
            };

        let tally = self
            .players
            .record_game(submission.identity, &submission.display_name, score);
        self.meta.increment_games();
        self.stats.incr("challenge_games");

        let (opponent, opponent_name) = challenge
            .opponent_of(submission.identity)
            .map(|(id, name)| (id, name.to_string()))
            .expect("submitter is a party");

        match progress {
            ScoreProgress::AwaitingOpponent => Ok(ScoreReport {
                success: true,
                score,
                new_best: tally.new_best,
                challenge_complete: false,
                is_winner: None,
                prize: None,
                opponent: Some(opponent),
                opponent_name: Some(opponent_name),
                jackpot: None,
            }),
            ScoreProgress::Complete {
                challenger_score,
                target_score,
            } => {
                let report = self
                    .settle_challenge(challenge, challenger_score, target_score, submission.identity)
                    .await;
                self.challenge_locks.discard(challenge_id);
                Ok(ScoreReport {
                    new_best: tally.new_best,
                    opponent: Some(opponent),
                    opponent_name: Some(opponent_name),
                    ..report
                })
            }
        }
    }

    /// Both scores known: settle, disburse, update records, broadcast,
    /// destroy. Runs synchronously within the second score submission.
    async fn settle_challenge(
        &self,
        challenge: Challenge,
        challenger_score: u32,
        target_score: u32,
        submitter: PlayerId,
    ) -> ScoreReport {
        let outcome = settlement::settle(
            (challenge.challenger, challenger_score),
            (challenge.target, target_score),
            challenge.wager,
            self.params.protocol_fee_bps,
        );

        let report = match outcome {
            MatchOutcome::Decided(s) => {
                // Records reflect entitlement even when the payout transfer
                // fails; the failure is surfaced for manual reconciliation.
                self.players.record_win(s.winner, s.payout);
                self.players.record_loss(s.loser);
                self.stats.incr("challenges_settled");

                let (winner_name, loser_name) = match challenge.side_of(s.winner) {
                    Some(Side::Challenger) => {
                        (challenge.challenger_name.clone(), challenge.target_name.clone())
                    }
                    _ => (challenge.target_name.clone(), challenge.challenger_name.clone()),
                };

                tracing::info!(
                    challenge = %challenge.id,
                    winner = %s.winner,
                    payout = %s.payout,
                    fee = %s.fee,
                    "match settled"
                );

                match self.disburser.disburse(s.winner, s.payout).await {
                    Ok(tx) => {
                        tracing::info!(challenge = %challenge.id, tx = %tx, "prize disbursed");
                    }
                    Err(e) => {
                        tracing::error!(challenge = %challenge.id, "prize disbursement failed: {e}");
                        self.stats.incr("disbursement_failures");
                        self.notify(Outbound::DisbursementFailed {
                            player: s.winner,
                            amount: s.payout,
                            context: format!("match payout for {}", challenge.id),
                            channel: challenge.channel.clone(),
                        })
                        .await;
                    }
                }

                self.notify(Outbound::MatchResult {
                    challenge_id: challenge.id.clone(),
                    winner: s.winner,
                    winner_name,
                    loser: s.loser,
                    loser_name,
                    winner_score: s.winner_score,
                    loser_score: s.loser_score,
                    prize: s.payout,
                    channel: challenge.channel.clone(),
                })
                .await;

                let is_winner = submitter == s.winner;
                ScoreReport {
                    success: true,
                    score: if submitter == challenge.challenger {
                        challenger_score
                    } else {
                        target_score
                    },
                    new_best: false, // overwritten by the caller
                    challenge_complete: true,
                    is_winner: Some(is_winner),
                    prize: is_winner.then_some(s.payout),
                    opponent: None,
                    opponent_name: None,
                    jackpot: None,
                }
            }
            MatchOutcome::Push { refund_each } => {
                self.stats.incr("challenges_pushed");
                tracing::info!(
                    challenge = %challenge.id,
                    score = challenger_score,
                    "match tied, refunding both wagers"
                );
                for player in [challenge.challenger, challenge.target] {
                    self.refund(
                        player,
                        refund_each,
                        RefundReason::Push,
                        challenge.channel.clone(),
                        "tied match",
                    )
                    .await;
                }
                self.notify(Outbound::MatchPush {
                    challenge_id: challenge.id.clone(),
                    score: challenger_score,
                    refund_each,
                    channel: challenge.channel.clone(),
                })
                .await;
                ScoreReport {
                    success: true,
                    score: challenger_score,
                    new_best: false,
                    challenge_complete: true,
                    is_winner: None,
                    prize: None,
                    opponent: None,
                    opponent_name: None,
                    jackpot: None,
                }
            }
        };

        self.book.retire(&challenge.id);
        report
    }

    async fn handle_solo_score(&self, submission: &ScoreSubmission, score: u32) -> ScoreReport {
        let tally = self
            .players
            .record_game(submission.identity, &submission.display_name, score);
        self.meta.increment_games();
        self.stats.incr("solo_games");

        let contribution =
            settlement::jackpot_contribution(UsdcAmount::new(self.params.solo_entry_fee), self.params.jackpot_bps);
        self.meta.accrue_jackpot(contribution);

        let jackpot = if self.meta.try_raise_best(score) {
            self.try_award_jackpot(submission.identity).await
        } else {
            None
        };

        ScoreReport::solo(score, tally.new_best, jackpot)
    }

    /// A new all-time best triggers the jackpot once the pool is deep
    /// enough: most of the pool pays out, the rest seeds the next round.
    async fn try_award_jackpot(&self, player: PlayerId) -> Option<UsdcAmount> {
        let pool = self.meta.jackpot_pool();
        if pool.raw() < self.params.jackpot_min_pool {
            return None;
        }
        let award = settlement::jackpot_award(pool, self.params.jackpot_payout_bps);
        if award.payout.is_zero() || self.meta.drain_jackpot(award.payout).is_err() {
            return None;
        }
        self.stats.incr("jackpots_won");
        tracing::info!(%player, amount = %award.payout, carryover = %award.carryover, "jackpot triggered");

        match self.disburser.disburse(player, award.payout).await {
            Ok(tx) => {
                tracing::info!(%player, tx = %tx, "jackpot disbursed");
                self.notify(Outbound::JackpotWon {
                    player,
                    amount: award.payout,
                    channel: self.announce_channel.clone(),
                })
                .await;
            }
            Err(e) => {
                tracing::error!(%player, "jackpot disbursement failed: {e}");
                self.stats.incr("disbursement_failures");
                self.notify(Outbound::DisbursementFailed {
                    player,
                    amount: award.payout,
                    context: "jackpot payout".to_string(),
                    channel: self.announce_channel.clone(),
                })
                .await;
            }
        }
        Some(award.payout)
    }

    /// Disburse a refund and surface the outcome. Returns whether the
    /// transfer was confirmed.
    async fn refund(
        &self,
        player: PlayerId,
        amount: UsdcAmount,
        reason: RefundReason,
        channel: ChannelId,
        context: &str,
    ) -> bool {
        match self.disburser.disburse(player, amount).await {
            Ok(tx) => {
                tracing::info!(%player, %amount, tx = %tx, context, "refund disbursed");
                self.notify(Outbound::Refund {
                    player,
                    amount,
                    reason,
                    channel,
                })
                .await;
                true
            }
            Err(e) => {
                tracing::error!(%player, %amount, context, "refund disbursement failed: {e}");
                self.stats.incr("disbursement_failures");
                self.notify(Outbound::DisbursementFailed {
                    player,
                    amount,
                    context: context.to_string(),
                    channel,
                })
                .await;
                false
            }
        }
    }

    // ── Polls & reads ────────────────────────────────────────────────────

    /// Status of a payment leg, or `None` if unknown (never created, or
    /// already purged past its grace window).
    pub fn payment_status(&self, payment_id: &PaymentId) -> Option<PaymentStatus> {
        self.ledger.get(payment_id).map(|e| e.status)
    }

    /// The live challenge a player is party to, shaped for the client poll.
    pub fn challenge_status(&self, player: PlayerId) -> ChallengeStatusView {
        match self.book.find_for_player(player) {
            Some(c) => {
                let (is_paid, has_played) = match c.side_of(player) {
                    Some(Side::Challenger) => (c.challenger_paid, c.challenger_score.is_some()),
                    _ => (c.target_paid, c.target_score.is_some()),
                };
                let opponent_name = c
                    .opponent_of(player)
                    .map(|(_, name)| name.to_string());
                ChallengeStatusView {
                    has_challenge: true,
                    challenge_id: Some(c.id),
                    is_paid: Some(is_paid),
                    has_played: Some(has_played),
                    opponent_name,
                    wager: Some(c.wager),
                }
            }
            None => ChallengeStatusView {
                has_challenge: false,
                challenge_id: None,
                is_paid: None,
                has_played: None,
                opponent_name: None,
                wager: None,
            },
        }
    }

    pub fn player(&self, id: PlayerId) -> Result<PlayerRecord, EngineError> {
        Ok(self.players.get(id)?)
    }

    pub fn leaderboard(&self, limit: usize) -> Vec<PlayerRecord> {
        self.players.top_by_best(limit)
    }

    pub fn telemetry(&self) -> Telemetry {
        Telemetry {
            games_played: self.meta.games_played(),
            players: self.players.player_count(),
            live_challenges: self.book.len(),
            ledger_entries: self.ledger.len(),
            pending_payments: self.ledger.pending_count(),
            jackpot_pool: self.meta.jackpot_pool(),
            all_time_best: self.meta.all_time_best(),
            counters: self.stats.snapshot(),
        }
    }

    // ── Background sweep ─────────────────────────────────────────────────

    /// One sweep pass: purge expired ledger entries and abandon stale
    /// challenges, refunding their confirmed legs.
    pub async fn sweep_once(&self, now: Timestamp) {
        self.ledger.purge_expired(&self.params, now);

        for challenge_id in self.book.stale_ids(&self.params, now) {
            let _guard = self.challenge_locks.acquire(&challenge_id).await;
            let Some(challenge) = self.book.remove_if_stale(&challenge_id, &self.params, now)
            else {
                continue;
            };
            self.stats.incr("challenges_abandoned");
            tracing::info!(
                challenge = %challenge_id,
                phase = %challenge.phase,
                age_secs = challenge.created_at.elapsed_since(now),
                "abandoning stale challenge"
            );
            for (player, _tx, amount) in challenge.confirmed_legs() {
                self.refund(
                    player,
                    amount,
                    RefundReason::Abandoned,
                    challenge.channel.clone(),
                    "challenge abandoned",
                )
                .await;
            }
            self.challenge_locks.discard(&challenge_id);
        }
    }

    /// Spawn the periodic sweep task. Runs until shutdown is signalled.
    pub fn spawn_sweeper(
        self: &Arc<Self>,
        interval_secs: u64,
        shutdown: &ShutdownController,
    ) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        let mut shutdown_rx = shutdown.subscribe();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.recv() => {
                        tracing::info!("sweep task shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        engine.sweep_once(Timestamp::now()).await;
                    }
                }
            }
        })
    }
}
