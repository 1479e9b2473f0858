//! Challenge state machine.
//!
//! A [`state::Challenge`] tracks one two-player wagered match from creation
//! through payout or refund. Transition guards live on the entity itself so
//! they are unit-testable; the [`book::ChallengeBook`] owns the live set and
//! serializes map access. Terminal outcomes (settled, refunded, abandoned)
//! are removals from the book, not stored phases — a challenge is destroyed
//! exactly once.

pub mod book;
pub mod error;
pub mod state;

pub use book::ChallengeBook;
pub use error::ChallengeError;
pub use state::{Challenge, ChallengePhase, ScoreProgress, Side};
