//! RPC error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use quickdraw_engine::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("server error: {0}")]
    Server(String),
}

impl RpcError {
    fn status(&self) -> StatusCode {
        use quickdraw_challenge::ChallengeError as C;
        use quickdraw_ledger::LedgerError as L;
        use quickdraw_store::StoreError as S;

        match self {
            RpcError::Engine(EngineError::Intake(_)) => StatusCode::BAD_REQUEST,
            RpcError::Engine(EngineError::Challenge(e)) => match e {
                C::NotFound(_) => StatusCode::NOT_FOUND,
                C::SelfChallenge | C::WagerOutOfRange(_) => StatusCode::BAD_REQUEST,
                C::NotTarget(_) | C::NotParty { .. } => StatusCode::FORBIDDEN,
                C::WrongPhase { .. } | C::AlreadyScored(_) | C::AlreadyActive(_) => {
                    StatusCode::CONFLICT
                }
            },
            RpcError::Engine(EngineError::Ledger(e)) => match e {
                L::NotFound(_) => StatusCode::NOT_FOUND,
                L::DuplicatePayment(_) => StatusCode::CONFLICT,
            },
            RpcError::Engine(EngineError::Store(e)) => match e {
                S::PlayerNotFound(_) => StatusCode::NOT_FOUND,
                S::JackpotUnderflow { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            RpcError::Engine(EngineError::Config(_)) | RpcError::Server(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {self}");
        }
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
