//! HTTP API for the quickdraw service.
//!
//! Two audiences share this surface: the untrusted game client (score
//! submission and status polls) and the chat interaction layer (commands
//! and asynchronous callbacks). Both speak JSON over axum.

pub mod error;
pub mod handlers;
pub mod server;

pub use error::RpcError;
pub use server::RpcServer;
