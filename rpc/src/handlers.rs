//! Request handlers and their wire types.

use crate::RpcError;
use axum::extract::{Path, Query, State};
use axum::Json;
use quickdraw_engine::{
    ChallengeCreated, ChallengeStatusView, GameEngine, ResponseChoice, ResponseOutcome,
    ScoreReport, ScoreSubmission, SoloStarted, Telemetry,
};
use quickdraw_store::PlayerRecord;
use quickdraw_types::{ChallengeId, ChannelId, PaymentId, PaymentStatus, PlayerId, TxHash};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub type AppState = Arc<GameEngine>;

// ── Commands ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ChallengeCommand {
    pub challenger: PlayerId,
    pub challenger_name: String,
    pub target: PlayerId,
    pub target_name: String,
    #[serde(default)]
    pub wager: Option<u64>,
    pub channel: String,
}

pub async fn create_challenge(
    State(engine): State<AppState>,
    Json(cmd): Json<ChallengeCommand>,
) -> Result<Json<ChallengeCreated>, RpcError> {
    let created = engine
        .create_challenge(
            cmd.challenger,
            &cmd.challenger_name,
            cmd.target,
            &cmd.target_name,
            cmd.wager,
            ChannelId::new(cmd.channel),
        )
        .await?;
    Ok(Json(created))
}

#[derive(Deserialize)]
pub struct PlayCommand {
    pub player: PlayerId,
    pub channel: String,
}

pub async fn start_solo(
    State(engine): State<AppState>,
    Json(cmd): Json<PlayCommand>,
) -> Result<Json<SoloStarted>, RpcError> {
    let started = engine
        .start_solo(cmd.player, ChannelId::new(cmd.channel))
        .await?;
    Ok(Json(started))
}

// ── Callbacks ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct PaymentCallback {
    pub payment_id: PaymentId,
    /// Absent means the payer cancelled.
    #[serde(default)]
    pub tx_hash: Option<TxHash>,
}

#[derive(Serialize)]
pub struct PaymentCallbackResponse {
    pub status: PaymentStatus,
}

pub async fn payment_callback(
    State(engine): State<AppState>,
    Json(cb): Json<PaymentCallback>,
) -> Result<Json<PaymentCallbackResponse>, RpcError> {
    let status = engine
        .handle_payment_callback(&cb.payment_id, cb.tx_hash)
        .await?;
    Ok(Json(PaymentCallbackResponse { status }))
}

#[derive(Deserialize)]
pub struct ResponseCallback {
    pub challenge_id: ChallengeId,
    pub responder: PlayerId,
    pub choice: ResponseChoice,
}

pub async fn response_callback(
    State(engine): State<AppState>,
    Json(cb): Json<ResponseCallback>,
) -> Result<Json<ResponseOutcome>, RpcError> {
    let outcome = engine
        .handle_challenge_response(&cb.challenge_id, cb.responder, cb.choice)
        .await?;
    Ok(Json(outcome))
}

// ── Score intake ─────────────────────────────────────────────────────────

pub async fn submit_score(
    State(engine): State<AppState>,
    Json(submission): Json<ScoreSubmission>,
) -> Result<Json<ScoreReport>, RpcError> {
    let report = engine.handle_score(submission).await?;
    Ok(Json(report))
}

// ── Polls ────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct PaymentStatusResponse {
    /// pending | confirmed | failed | not_found
    pub status: String,
}

pub async fn payment_status(
    State(engine): State<AppState>,
    Path(payment_id): Path<String>,
) -> Json<PaymentStatusResponse> {
    let status = match engine.payment_status(&PaymentId::new(payment_id)) {
        Some(status) => status.to_string(),
        None => "not_found".to_string(),
    };
    Json(PaymentStatusResponse { status })
}

pub async fn challenge_status(
    State(engine): State<AppState>,
    Path(identity): Path<u64>,
) -> Json<ChallengeStatusView> {
    Json(engine.challenge_status(PlayerId::new(identity)))
}

// ── Reads ────────────────────────────────────────────────────────────────

pub async fn player(
    State(engine): State<AppState>,
    Path(identity): Path<u64>,
) -> Result<Json<PlayerRecord>, RpcError> {
    Ok(Json(engine.player(PlayerId::new(identity))?))
}

#[derive(Deserialize)]
pub struct LeaderboardQuery {
    #[serde(default = "default_leaderboard_limit")]
    pub limit: usize,
}

fn default_leaderboard_limit() -> usize {
    10
}

#[derive(Serialize)]
pub struct LeaderboardResponse {
    pub players: Vec<PlayerRecord>,
}

pub async fn leaderboard(
    State(engine): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Json<LeaderboardResponse> {
    Json(LeaderboardResponse {
        players: engine.leaderboard(query.limit.min(100)),
    })
}

pub async fn telemetry(State(engine): State<AppState>) -> Json<Telemetry> {
    Json(engine.telemetry())
}
