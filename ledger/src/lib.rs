//! Payment ledger — tracks outstanding payment legs.
//!
//! Every payment prompt issued to a player gets an entry here, keyed by the
//! payment id the interaction layer correlates its callback with. Status is
//! monotonic (pending → confirmed | failed, never back), and terminal
//! entries are retained for a grace window so polling clients can observe
//! the outcome before the sweeper purges them.

pub mod error;
pub mod ledger;

pub use error::LedgerError;
pub use ledger::{MarkOutcome, PaymentLedger, PaymentRequest};
