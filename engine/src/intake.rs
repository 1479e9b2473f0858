//! Score intake validation.
//!
//! The game client is untrusted: scores and timestamps arrive as signed
//! integers and are validated before anything else looks at them. A
//! violation rejects the submission with no state mutation of any kind.

use quickdraw_types::{ChallengeId, GameParams, PlayerId, Timestamp};
use serde::Deserialize;
use thiserror::Error;

/// A raw score submission from the game client.
#[derive(Clone, Debug, Deserialize)]
pub struct ScoreSubmission {
    pub identity: PlayerId,
    /// Signed on purpose: negative scores must be rejected by validation,
    /// not mangled by deserialization.
    pub score: i64,
    /// Client-reported Unix seconds. Signed for the same reason.
    pub timestamp: i64,
    pub display_name: String,
    #[serde(default)]
    pub challenge_id: Option<ChallengeId>,
}

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("score {0} is outside [0, {1}]")]
    ScoreOutOfRange(i64, u32),

    #[error("timestamp {0} is invalid or too far ahead of server time")]
    BadTimestamp(i64),
}

/// Validate a submission against the game parameters.
///
/// Returns the score as an unsigned value once it is known to be in range.
pub fn validate(
    submission: &ScoreSubmission,
    params: &GameParams,
    now: Timestamp,
) -> Result<u32, IntakeError> {
    if submission.score < 0 || submission.score > params.score_max as i64 {
        return Err(IntakeError::ScoreOutOfRange(
            submission.score,
            params.score_max,
        ));
    }
    if submission.timestamp < 0 {
        return Err(IntakeError::BadTimestamp(submission.timestamp));
    }
    let claimed = Timestamp::new(submission.timestamp as u64);
    if claimed.ahead_of(now) > params.clock_skew_secs {
        return Err(IntakeError::BadTimestamp(submission.timestamp));
    }
    Ok(submission.score as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(score: i64, timestamp: i64) -> ScoreSubmission {
        ScoreSubmission {
            identity: PlayerId::new(1),
            score,
            timestamp,
            display_name: "alice".into(),
            challenge_id: None,
        }
    }

    fn params() -> GameParams {
        GameParams::default() // score_max 100_000, skew 60s
    }

    #[test]
    fn accepts_in_range_scores() {
        let now = Timestamp::new(10_000);
        assert_eq!(validate(&submission(0, 10_000), &params(), now).unwrap(), 0);
        assert_eq!(
            validate(&submission(100_000, 10_000), &params(), now).unwrap(),
            100_000
        );
    }

    #[test]
    fn rejects_out_of_range_scores() {
        let now = Timestamp::new(10_000);
        assert!(matches!(
            validate(&submission(100_001, 10_000), &params(), now).unwrap_err(),
            IntakeError::ScoreOutOfRange(100_001, _)
        ));
        assert!(matches!(
            validate(&submission(-1, 10_000), &params(), now).unwrap_err(),
            IntakeError::ScoreOutOfRange(-1, _)
        ));
    }

    #[test]
    fn rejects_bad_timestamps() {
        let now = Timestamp::new(10_000);
        // Far in the future.
        assert!(matches!(
            validate(&submission(500, 10_061), &params(), now).unwrap_err(),
            IntakeError::BadTimestamp(_)
        ));
        // Negative.
        assert!(matches!(
            validate(&submission(500, -5), &params(), now).unwrap_err(),
            IntakeError::BadTimestamp(-5)
        ));
    }

    #[test]
    fn tolerates_skew_within_the_window() {
        let now = Timestamp::new(10_000);
        assert!(validate(&submission(500, 10_060), &params(), now).is_ok());
        // Old timestamps are fine; only forward skew is bounded.
        assert!(validate(&submission(500, 1), &params(), now).is_ok());
    }
}
