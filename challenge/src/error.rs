//! Challenge error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChallengeError {
    #[error("challenge not found: {0}")]
    NotFound(String),

    #[error("player {player} is not a party to challenge {challenge}")]
    NotParty { player: String, challenge: String },

    #[error("only the challenged player may respond to challenge {0}")]
    NotTarget(String),

    #[error("challenge {challenge} is in phase {phase}, cannot {action}")]
    WrongPhase {
        challenge: String,
        phase: String,
        action: &'static str,
    },

    #[error("player {0} already submitted a score for this challenge")]
    AlreadyScored(String),

    #[error("a player cannot challenge themselves")]
    SelfChallenge,

    #[error("player {0} already has a live challenge")]
    AlreadyActive(String),

    #[error("wager {0} is outside the allowed range")]
    WagerOutOfRange(u64),
}
