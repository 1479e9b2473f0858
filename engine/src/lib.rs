//! The quickdraw game engine.
//!
//! Each inbound event — payment callback, accept/decline response, score
//! submission — is one unit of work that may suspend on a chain
//! confirmation before touching shared state. The engine serializes those
//! units per challenge id with keyed async locks, feeds the challenge book
//! and payment ledger, and drives settlement and disbursement.

pub mod config;
pub mod engine;
pub mod error;
pub mod intake;
pub mod locks;
pub mod shutdown;

pub use config::{ConfirmPolicy, EngineConfig};
pub use engine::{
    ChallengeCreated, ChallengeStatusView, GameEngine, ResponseChoice, ResponseOutcome,
    ScoreReport, SoloStarted, Telemetry,
};
pub use error::EngineError;
pub use intake::{IntakeError, ScoreSubmission};
pub use shutdown::ShutdownController;
