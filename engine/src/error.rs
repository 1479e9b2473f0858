use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("ledger error: {0}")]
    Ledger(#[from] quickdraw_ledger::LedgerError),

    #[error("challenge error: {0}")]
    Challenge(#[from] quickdraw_challenge::ChallengeError),

    #[error("store error: {0}")]
    Store(#[from] quickdraw_store::StoreError),

    #[error("score rejected: {0}")]
    Intake(#[from] crate::intake::IntakeError),

    #[error("config error: {0}")]
    Config(String),
}
