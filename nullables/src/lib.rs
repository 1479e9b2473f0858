//! Nullable infrastructure — deterministic stand-ins for the real world.
//!
//! Each nullable implements a production port with scripted, observable
//! behavior: the clock only advances when told, the chain confirms what the
//! test says it confirms, and the notifier records instead of delivering.

pub mod chain;
pub mod clock;
pub mod notify;

pub use chain::{NullDirectory, NullTransfer, NullVerifier};
pub use clock::NullClock;
pub use notify::NullNotifier;
