//! Integration tests exercising the full wager pipeline:
//! command → payment confirmation → response → scores → settlement/refund.
//!
//! These tests wire the engine against nullable infrastructure, verifying
//! the money paths end-to-end — not just in isolation.

use quickdraw_engine::{
    ConfirmPolicy, EngineConfig, GameEngine, ResponseChoice, ResponseOutcome, ScoreSubmission,
};
use quickdraw_messages::Outbound;
use quickdraw_nullables::{
    chain::ScriptedOutcome, NullClock, NullDirectory, NullNotifier, NullTransfer, NullVerifier,
};
use quickdraw_store::{MemoryStore, MetaStore, PlayerStore};
use quickdraw_types::{
    ChallengeId, ChannelId, PaymentId, PaymentStatus, PlayerId, Timestamp, TxHash, UsdcAmount,
};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const ALICE: PlayerId = PlayerId::new(1);
const BOB: PlayerId = PlayerId::new(2);

struct Harness {
    engine: Arc<GameEngine>,
    verifier: Arc<NullVerifier>,
    directory: Arc<NullDirectory>,
    transfer: Arc<NullTransfer>,
    notifier: Arc<NullNotifier>,
    store: Arc<MemoryStore>,
}

fn harness() -> Harness {
    harness_with(EngineConfig::default())
}

fn harness_with(config: EngineConfig) -> Harness {
    let verifier = Arc::new(NullVerifier::new());
    let directory = Arc::new(NullDirectory::new());
    let transfer = Arc::new(NullTransfer::new());
    let notifier = Arc::new(NullNotifier::new());
    let store = Arc::new(MemoryStore::new());
    directory.register_synthetic(ALICE);
    directory.register_synthetic(BOB);

    let engine = Arc::new(GameEngine::new(
        &config,
        verifier.clone(),
        directory.clone(),
        transfer.clone(),
        notifier.clone(),
        store.clone(),
        store.clone(),
    ));
    Harness {
        engine,
        verifier,
        directory,
        transfer,
        notifier,
        store,
    }
}

fn tx(byte: u8) -> TxHash {
    TxHash::new([byte; 32])
}

fn channel() -> ChannelId {
    ChannelId::new("ch-duel")
}

fn submission(player: PlayerId, score: i64, challenge: Option<&ChallengeId>) -> ScoreSubmission {
    ScoreSubmission {
        identity: player,
        score,
        timestamp: Timestamp::now().as_secs() as i64,
        display_name: if player == ALICE { "alice" } else { "bob" }.to_string(),
        challenge_id: challenge.cloned(),
    }
}

/// Drive a fresh challenge to `Ready`: create, confirm the initiator leg,
/// accept, confirm the acceptor leg.
async fn ready_challenge(h: &Harness) -> ChallengeId {
    let created = h
        .engine
        .create_challenge(ALICE, "alice", BOB, "bob", Some(200_000), channel())
        .await
        .unwrap();
    h.engine
        .handle_payment_callback(&created.payment_id, Some(tx(0xA1)))
        .await
        .unwrap();
    let outcome = h
        .engine
        .handle_challenge_response(&created.challenge_id, BOB, ResponseChoice::Accept)
        .await
        .unwrap();
    let ResponseOutcome::Accepted { payment_id, .. } = outcome else {
        panic!("expected acceptance");
    };
    h.engine
        .handle_payment_callback(&payment_id, Some(tx(0xB2)))
        .await
        .unwrap();
    created.challenge_id
}

// ---------------------------------------------------------------------------
// 1. Solo payment legs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn confirmed_solo_payment_authorizes_exactly_one_session() {
    let h = harness();
    let started = h.engine.start_solo(ALICE, channel()).await.unwrap();

    let status = h
        .engine
        .handle_payment_callback(&started.payment_id, Some(tx(0x01)))
        .await
        .unwrap();
    assert_eq!(status, PaymentStatus::Confirmed);
    assert_eq!(
        h.engine.payment_status(&started.payment_id),
        Some(PaymentStatus::Confirmed)
    );

    let authorized = h
        .notifier
        .matching(|m| matches!(m, Outbound::GameAuthorized { .. }));
    assert_eq!(authorized.len(), 1);
}

#[tokio::test]
async fn duplicate_payment_callbacks_have_no_duplicate_side_effects() {
    let h = harness();
    let started = h.engine.start_solo(ALICE, channel()).await.unwrap();

    h.engine
        .handle_payment_callback(&started.payment_id, Some(tx(0x01)))
        .await
        .unwrap();
    let second = h
        .engine
        .handle_payment_callback(&started.payment_id, Some(tx(0x01)))
        .await
        .unwrap();

    assert_eq!(second, PaymentStatus::Confirmed);
    // The second callback short-circuits before re-verifying.
    assert_eq!(h.verifier.call_count(), 1);
    let authorized = h
        .notifier
        .matching(|m| matches!(m, Outbound::GameAuthorized { .. }));
    assert_eq!(authorized.len(), 1);
}

#[tokio::test]
async fn absent_hash_fails_the_leg_and_authorizes_nothing() {
    let h = harness();
    let started = h.engine.start_solo(ALICE, channel()).await.unwrap();

    let status = h
        .engine
        .handle_payment_callback(&started.payment_id, None)
        .await
        .unwrap();
    assert_eq!(status, PaymentStatus::Failed);
    assert_eq!(
        h.engine.payment_status(&started.payment_id),
        Some(PaymentStatus::Failed)
    );
    assert_eq!(h.verifier.call_count(), 0);
    assert!(h
        .notifier
        .matching(|m| matches!(m, Outbound::GameAuthorized { .. }))
        .is_empty());
    assert_eq!(
        h.notifier
            .matching(|m| matches!(m, Outbound::PaymentFailed { .. }))
            .len(),
        1
    );
}

#[tokio::test]
async fn reverted_transaction_fails_the_leg() {
    let h = harness();
    let started = h.engine.start_solo(ALICE, channel()).await.unwrap();
    h.verifier.script(tx(0x66), ScriptedOutcome::Reverted);

    let status = h
        .engine
        .handle_payment_callback(&started.payment_id, Some(tx(0x66)))
        .await
        .unwrap();
    assert_eq!(status, PaymentStatus::Failed);
}

#[tokio::test]
async fn confirmation_timeout_fails_under_default_policy() {
    let h = harness();
    let started = h.engine.start_solo(ALICE, channel()).await.unwrap();
    h.verifier.script(tx(0x77), ScriptedOutcome::Timeout);

    let status = h
        .engine
        .handle_payment_callback(&started.payment_id, Some(tx(0x77)))
        .await
        .unwrap();
    assert_eq!(status, PaymentStatus::Failed);
}

#[tokio::test]
async fn confirmation_timeout_confirms_under_presume_success_policy() {
    let config = EngineConfig {
        confirm_policy: ConfirmPolicy::PresumeSuccess,
        ..EngineConfig::default()
    };
    let h = harness_with(config);
    let started = h.engine.start_solo(ALICE, channel()).await.unwrap();
    h.verifier.script(tx(0x77), ScriptedOutcome::Timeout);

    let status = h
        .engine
        .handle_payment_callback(&started.payment_id, Some(tx(0x77)))
        .await
        .unwrap();
    assert_eq!(status, PaymentStatus::Confirmed);
}

#[tokio::test]
async fn unknown_payment_poll_reports_not_found() {
    let h = harness();
    assert_eq!(h.engine.payment_status(&PaymentId::new("ghost")), None);
}

// ---------------------------------------------------------------------------
// 2. The full challenge happy path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_challenge_flow_settles_and_pays_the_winner() {
    let h = harness();
    let challenge_id = ready_challenge(&h).await;

    // Both players were prompted: initiator payment, challenge prompt,
    // acceptor payment, match-ready.
    assert_eq!(
        h.notifier
            .matching(|m| matches!(m, Outbound::ChallengePrompt { .. }))
            .len(),
        1
    );
    assert_eq!(
        h.notifier
            .matching(|m| matches!(m, Outbound::MatchReady { .. }))
            .len(),
        1
    );

    let first = h
        .engine
        .handle_score(submission(ALICE, 800, Some(&challenge_id)))
        .await
        .unwrap();
    assert!(!first.challenge_complete);
    assert_eq!(first.opponent, Some(BOB));

    let second = h
        .engine
        .handle_score(submission(BOB, 650, Some(&challenge_id)))
        .await
        .unwrap();
    assert!(second.challenge_complete);
    assert_eq!(second.is_winner, Some(false));

    // wager 200_000 -> pool 400_000, fee 4_000, payout 396_000.
    let sent = h.transfer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].amount, UsdcAmount::new(396_000));

    let alice = h.store.get(ALICE).unwrap();
    assert_eq!(alice.challenge_wins, 1);
    assert_eq!(alice.challenge_losses, 0);
    assert_eq!(alice.total_earnings, UsdcAmount::new(396_000));
    assert_eq!(alice.games_played, 1);

    let bob = h.store.get(BOB).unwrap();
    assert_eq!(bob.challenge_losses, 1);
    assert_eq!(bob.challenge_wins, 0);
    assert_eq!(bob.total_earnings, UsdcAmount::ZERO);

    // The challenge is gone from the live set.
    assert!(!h.engine.challenge_status(ALICE).has_challenge);
    assert_eq!(
        h.notifier
            .matching(|m| matches!(m, Outbound::MatchResult { .. }))
            .len(),
        1
    );
}

#[tokio::test]
async fn challenge_status_poll_tracks_the_flow() {
    let h = harness();
    assert!(!h.engine.challenge_status(ALICE).has_challenge);

    let created = h
        .engine
        .create_challenge(ALICE, "alice", BOB, "bob", None, channel())
        .await
        .unwrap();

    let view = h.engine.challenge_status(ALICE);
    assert!(view.has_challenge);
    assert_eq!(view.challenge_id, Some(created.challenge_id.clone()));
    assert_eq!(view.is_paid, Some(false));
    assert_eq!(view.opponent_name.as_deref(), Some("bob"));

    h.engine
        .handle_payment_callback(&created.payment_id, Some(tx(0xA1)))
        .await
        .unwrap();
    assert_eq!(h.engine.challenge_status(ALICE).is_paid, Some(true));
    // The target's own leg is still unpaid.
    assert_eq!(h.engine.challenge_status(BOB).is_paid, Some(false));
}

// ---------------------------------------------------------------------------
// 3. Decline and refunds
// ---------------------------------------------------------------------------

#[tokio::test]
async fn decline_refunds_the_challenger_exactly_once() {
    let h = harness();
    let created = h
        .engine
        .create_challenge(ALICE, "alice", BOB, "bob", Some(200_000), channel())
        .await
        .unwrap();
    h.engine
        .handle_payment_callback(&created.payment_id, Some(tx(0xA1)))
        .await
        .unwrap();

    let outcome = h
        .engine
        .handle_challenge_response(&created.challenge_id, BOB, ResponseChoice::Decline)
        .await
        .unwrap();
    assert!(matches!(outcome, ResponseOutcome::Declined { refunded: true }));

    let sent = h.transfer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].amount, UsdcAmount::new(200_000));

    // Challenge removed; records untouched.
    assert!(!h.engine.challenge_status(ALICE).has_challenge);
    let alice = h.store.get(ALICE).unwrap();
    assert_eq!(alice.challenge_wins + alice.challenge_losses, 0);

    // A late duplicate decline finds nothing.
    assert!(h
        .engine
        .handle_challenge_response(&created.challenge_id, BOB, ResponseChoice::Decline)
        .await
        .is_err());
}

#[tokio::test]
async fn failed_refund_still_retires_the_challenge_and_is_surfaced() {
    let h = harness();
    let created = h
        .engine
        .create_challenge(ALICE, "alice", BOB, "bob", None, channel())
        .await
        .unwrap();
    h.engine
        .handle_payment_callback(&created.payment_id, Some(tx(0xA1)))
        .await
        .unwrap();

    h.transfer.fail_next(1);
    let outcome = h
        .engine
        .handle_challenge_response(&created.challenge_id, BOB, ResponseChoice::Decline)
        .await
        .unwrap();
    assert!(matches!(outcome, ResponseOutcome::Declined { refunded: false }));

    // Retired regardless of the refund outcome; failure surfaced.
    assert!(!h.engine.challenge_status(ALICE).has_challenge);
    assert_eq!(
        h.notifier
            .matching(|m| matches!(m, Outbound::DisbursementFailed { .. }))
            .len(),
        1
    );
}

#[tokio::test]
async fn only_the_target_can_answer_the_prompt() {
    let h = harness();
    let created = h
        .engine
        .create_challenge(ALICE, "alice", BOB, "bob", None, channel())
        .await
        .unwrap();
    h.engine
        .handle_payment_callback(&created.payment_id, Some(tx(0xA1)))
        .await
        .unwrap();

    assert!(h
        .engine
        .handle_challenge_response(&created.challenge_id, ALICE, ResponseChoice::Decline)
        .await
        .is_err());
    assert!(h.engine.challenge_status(ALICE).has_challenge);
}

#[tokio::test]
async fn failed_initiator_leg_tears_the_challenge_down() {
    let h = harness();
    let created = h
        .engine
        .create_challenge(ALICE, "alice", BOB, "bob", None, channel())
        .await
        .unwrap();

    // Challenger cancels the payment: nothing was paid, nothing to refund,
    // and both players are free to start fresh.
    h.engine
        .handle_payment_callback(&created.payment_id, None)
        .await
        .unwrap();
    assert!(!h.engine.challenge_status(ALICE).has_challenge);
    assert_eq!(h.transfer.sent_count(), 0);

    assert!(h
        .engine
        .create_challenge(ALICE, "alice", BOB, "bob", None, channel())
        .await
        .is_ok());
}

#[tokio::test]
async fn failed_acceptor_leg_tears_down_and_refunds_the_challenger() {
    let h = harness();
    let created = h
        .engine
        .create_challenge(ALICE, "alice", BOB, "bob", None, channel())
        .await
        .unwrap();
    h.engine
        .handle_payment_callback(&created.payment_id, Some(tx(0xA1)))
        .await
        .unwrap();
    let outcome = h
        .engine
        .handle_challenge_response(&created.challenge_id, BOB, ResponseChoice::Accept)
        .await
        .unwrap();
    let ResponseOutcome::Accepted { payment_id, .. } = outcome else {
        panic!("expected acceptance");
    };

    // Acceptor's transaction reverts: the challenger's confirmed wager
    // comes back and the challenge is retired.
    h.verifier.script(tx(0xB2), ScriptedOutcome::Reverted);
    h.engine
        .handle_payment_callback(&payment_id, Some(tx(0xB2)))
        .await
        .unwrap();

    assert!(!h.engine.challenge_status(ALICE).has_challenge);
    let sent = h.transfer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].amount, UsdcAmount::new(200_000));
}

// ---------------------------------------------------------------------------
// 4. Ties
// ---------------------------------------------------------------------------

#[tokio::test]
async fn tied_scores_refund_both_wagers_without_records_mutation() {
    let h = harness();
    let challenge_id = ready_challenge(&h).await;

    h.engine
        .handle_score(submission(ALICE, 700, Some(&challenge_id)))
        .await
        .unwrap();
    let report = h
        .engine
        .handle_score(submission(BOB, 700, Some(&challenge_id)))
        .await
        .unwrap();
    assert!(report.challenge_complete);
    assert_eq!(report.is_winner, None);
    assert_eq!(report.prize, None);

    let sent = h.transfer.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent
        .iter()
        .all(|t| t.amount == UsdcAmount::new(200_000)));

    let alice = h.store.get(ALICE).unwrap();
    let bob = h.store.get(BOB).unwrap();
    assert_eq!(alice.challenge_wins + alice.challenge_losses, 0);
    assert_eq!(bob.challenge_wins + bob.challenge_losses, 0);
    assert!(!h.engine.challenge_status(ALICE).has_challenge);
    assert_eq!(
        h.notifier
            .matching(|m| matches!(m, Outbound::MatchPush { .. }))
            .len(),
        1
    );
}

// ---------------------------------------------------------------------------
// 5. Score intake guards
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_submissions_are_rejected_without_any_mutation() {
    let h = harness();

    for bad in [
        submission(ALICE, 100_001, None),
        submission(ALICE, -1, None),
        ScoreSubmission {
            timestamp: Timestamp::now().as_secs() as i64 + 3600,
            ..submission(ALICE, 500, None)
        },
    ] {
        assert!(h.engine.handle_score(bad).await.is_err());
    }

    // No player record was ever created.
    assert!(h.store.get(ALICE).is_err());
    assert_eq!(h.store.games_played(), 0);
}

#[tokio::test]
async fn resubmitted_score_is_rejected_not_overwritten() {
    let h = harness();
    let challenge_id = ready_challenge(&h).await;

    h.engine
        .handle_score(submission(ALICE, 800, Some(&challenge_id)))
        .await
        .unwrap();
    assert!(h
        .engine
        .handle_score(submission(ALICE, 999, Some(&challenge_id)))
        .await
        .is_err());

    // One game on record, original score intact.
    assert_eq!(h.store.get(ALICE).unwrap().games_played, 1);
    assert_eq!(h.store.get(ALICE).unwrap().best_score, 800);
}

#[tokio::test]
async fn score_before_both_legs_paid_is_rejected() {
    let h = harness();
    let created = h
        .engine
        .create_challenge(ALICE, "alice", BOB, "bob", None, channel())
        .await
        .unwrap();
    h.engine
        .handle_payment_callback(&created.payment_id, Some(tx(0xA1)))
        .await
        .unwrap();

    assert!(h
        .engine
        .handle_score(submission(ALICE, 500, Some(&created.challenge_id)))
        .await
        .is_err());
    assert_eq!(h.store.get(ALICE).unwrap().games_played, 0);
}

#[tokio::test]
async fn non_party_submission_with_challenge_id_counts_as_solo() {
    let h = harness();
    let challenge_id = ready_challenge(&h).await;
    let mallory = PlayerId::new(99);
    h.directory.register_synthetic(mallory);

    let report = h
        .engine
        .handle_score(ScoreSubmission {
            identity: mallory,
            score: 950,
            timestamp: Timestamp::now().as_secs() as i64,
            display_name: "mallory".into(),
            challenge_id: Some(challenge_id.clone()),
        })
        .await
        .unwrap();

    assert!(!report.challenge_complete);
    assert_eq!(report.opponent, None);
    // The challenge itself is untouched.
    let view = h.engine.challenge_status(ALICE);
    assert_eq!(view.has_played, Some(false));
}

// ---------------------------------------------------------------------------
// 6. Abandonment sweep
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stale_challenge_is_abandoned_and_confirmed_legs_refunded() {
    let h = harness();
    let created = h
        .engine
        .create_challenge(ALICE, "alice", BOB, "bob", None, channel())
        .await
        .unwrap();
    h.engine
        .handle_payment_callback(&created.payment_id, Some(tx(0xA1)))
        .await
        .unwrap();

    let clock = NullClock::new(Timestamp::now().as_secs());
    clock.advance(EngineConfig::default().params.challenge_ttl_secs);
    h.engine.sweep_once(clock.now()).await;

    assert!(!h.engine.challenge_status(ALICE).has_challenge);
    let sent = h.transfer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].amount, UsdcAmount::new(200_000));
    assert_eq!(
        h.notifier
            .matching(|m| matches!(m, Outbound::Refund { .. }))
            .len(),
        1
    );
}

#[tokio::test]
async fn ready_challenge_is_never_swept() {
    let h = harness();
    let challenge_id = ready_challenge(&h).await;

    let clock = NullClock::new(Timestamp::now().as_secs());
    clock.advance(2 * EngineConfig::default().params.challenge_ttl_secs);
    h.engine.sweep_once(clock.now()).await;

    assert!(h.engine.challenge_status(ALICE).has_challenge);
    assert_eq!(
        h.engine.challenge_status(ALICE).challenge_id,
        Some(challenge_id)
    );
}

#[tokio::test]
async fn confirmation_landing_after_the_sweep_is_refunded() {
    let h = harness();
    let created = h
        .engine
        .create_challenge(ALICE, "alice", BOB, "bob", None, channel())
        .await
        .unwrap();

    // The challenge goes stale before the initiator leg confirms.
    let clock = NullClock::new(Timestamp::now().as_secs());
    clock.advance(EngineConfig::default().params.challenge_ttl_secs);
    h.engine.sweep_once(clock.now()).await;
    assert_eq!(h.transfer.sent_count(), 0); // nothing was paid yet

    // The payment confirms anyway — money in, challenge gone: refund.
    let status = h
        .engine
        .handle_payment_callback(&created.payment_id, Some(tx(0xA1)))
        .await
        .unwrap();
    assert_eq!(status, PaymentStatus::Confirmed);
    let sent = h.transfer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].amount, UsdcAmount::new(200_000));
}

// ---------------------------------------------------------------------------
// 7. Solo play and the jackpot
// ---------------------------------------------------------------------------

#[tokio::test]
async fn solo_games_accrue_the_jackpot_pool() {
    let h = harness();
    // 10% of the 0.10 USDC entry fee per solo game.
    h.engine
        .handle_score(submission(ALICE, 100, None))
        .await
        .unwrap();
    h.engine
        .handle_score(submission(ALICE, 90, None))
        .await
        .unwrap();
    assert_eq!(h.store.jackpot_pool(), UsdcAmount::new(20_000));
    assert_eq!(h.store.games_played(), 2);
}

#[tokio::test]
async fn new_all_time_best_triggers_the_jackpot_once_the_pool_is_deep_enough() {
    let mut config = EngineConfig::default();
    config.params.jackpot_min_pool = 15_000;
    let h = harness_with(config);

    // First game: new best, but the pool (10_000) is still below minimum.
    let first = h
        .engine
        .handle_score(submission(ALICE, 100, None))
        .await
        .unwrap();
    assert_eq!(first.jackpot, None);

    // Second game beats the record with the pool at 20_000: 90% pays out.
    let second = h
        .engine
        .handle_score(submission(ALICE, 200, None))
        .await
        .unwrap();
    assert_eq!(second.jackpot, Some(UsdcAmount::new(18_000)));
    assert_eq!(h.store.jackpot_pool(), UsdcAmount::new(2_000));

    let sent = h.transfer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].amount, UsdcAmount::new(18_000));
    assert_eq!(
        h.notifier
            .matching(|m| matches!(m, Outbound::JackpotWon { .. }))
            .len(),
        1
    );

    // Matching the record does not re-trigger.
    let third = h
        .engine
        .handle_score(submission(ALICE, 200, None))
        .await
        .unwrap();
    assert_eq!(third.jackpot, None);
}

// ---------------------------------------------------------------------------
// 8. Telemetry
// ---------------------------------------------------------------------------

#[tokio::test]
async fn telemetry_reflects_the_session() {
    let h = harness();
    let challenge_id = ready_challenge(&h).await;
    h.engine
        .handle_score(submission(ALICE, 800, Some(&challenge_id)))
        .await
        .unwrap();
    h.engine
        .handle_score(submission(BOB, 650, Some(&challenge_id)))
        .await
        .unwrap();
    h.engine
        .handle_score(submission(ALICE, 40, None))
        .await
        .unwrap();

    let t = h.engine.telemetry();
    assert_eq!(t.games_played, 3);
    assert_eq!(t.players, 2);
    assert_eq!(t.live_challenges, 0);
    assert_eq!(t.counters["challenges_settled"], 1);
    assert_eq!(t.counters["challenge_games"], 2);
    assert_eq!(t.counters["solo_games"], 1);
    assert_eq!(t.counters["payments_confirmed"], 2);
}
