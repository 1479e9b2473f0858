//! Entity stores for the quickdraw service.
//!
//! Player records and process-wide aggregates live behind narrow traits;
//! each implementation serializes updates internally so callers never see
//! raw map access. The service is memory-resident, so the production
//! implementation is the in-memory [`MemoryStore`].

pub mod error;
pub mod memory;
pub mod meta;
pub mod player;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use meta::MetaStore;
pub use player::{GameTally, PlayerRecord, PlayerStore};
