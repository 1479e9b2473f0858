//! Engine configuration with TOML file support.

use quickdraw_types::GameParams;
use serde::{Deserialize, Serialize};

use crate::EngineError;

/// What to do when a chain confirmation wait times out.
///
/// The original deployment presumed success on RPC timeouts to keep
/// gameplay moving. That trades correctness for availability, so it is an
/// explicit, named choice here rather than an implicit fallback — and every
/// time it is exercised the engine logs a warning.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfirmPolicy {
    /// A timeout fails the payment leg; the payer retries with a fresh
    /// payment.
    #[default]
    Fail,
    /// A timeout is treated as a provisional success.
    PresumeSuccess,
}

/// Configuration for the quickdraw engine and its chain boundary.
///
/// Can be loaded from a TOML file via [`EngineConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Timeout policy for inbound payment confirmations.
    #[serde(default)]
    pub confirm_policy: ConfirmPolicy,

    /// EVM JSON-RPC endpoint used to confirm transactions.
    #[serde(default = "default_chain_rpc_url")]
    pub chain_rpc_url: String,

    /// Custodial treasury service that submits outbound USDC transfers.
    #[serde(default = "default_treasury_url")]
    pub treasury_url: String,

    /// Platform wallet API that resolves players to payout addresses.
    #[serde(default = "default_wallet_directory_url")]
    pub wallet_directory_url: String,

    /// Webhook the chat transport listens on for outbound notifications.
    #[serde(default = "default_webhook_url")]
    pub webhook_url: String,

    /// How long to wait for a transaction receipt before timing out.
    #[serde(default = "default_confirm_timeout_secs")]
    pub confirm_timeout_secs: u64,

    /// Receipt poll interval, milliseconds.
    #[serde(default = "default_confirm_poll_ms")]
    pub confirm_poll_ms: u64,

    /// Port for the HTTP API.
    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    /// Interval between ledger-purge / abandonment sweeps, seconds.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Channel for announcements that have no originating channel context
    /// (jackpot wins and their failure surfacing).
    #[serde(default = "default_announce_channel")]
    pub announce_channel: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Economic rules and lifecycle windows. Declared last so the TOML
    /// rendering keeps scalar settings above the `[params]` table.
    #[serde(default)]
    pub params: GameParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_chain_rpc_url() -> String {
    "http://localhost:8545".to_string()
}

fn default_treasury_url() -> String {
    "http://localhost:9200".to_string()
}

fn default_wallet_directory_url() -> String {
    "http://localhost:9300".to_string()
}

fn default_webhook_url() -> String {
    "http://localhost:9400/events".to_string()
}

fn default_confirm_timeout_secs() -> u64 {
    120
}

fn default_confirm_poll_ms() -> u64 {
    1500
}

fn default_rpc_port() -> u16 {
    8787
}

fn default_sweep_interval_secs() -> u64 {
    30
}

fn default_announce_channel() -> String {
    "lobby".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "human".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, EngineError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| EngineError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, EngineError> {
        toml::from_str(s).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("EngineConfig is always serializable to TOML")
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            confirm_policy: ConfirmPolicy::default(),
            chain_rpc_url: default_chain_rpc_url(),
            treasury_url: default_treasury_url(),
            wallet_directory_url: default_wallet_directory_url(),
            webhook_url: default_webhook_url(),
            confirm_timeout_secs: default_confirm_timeout_secs(),
            confirm_poll_ms: default_confirm_poll_ms(),
            rpc_port: default_rpc_port(),
            sweep_interval_secs: default_sweep_interval_secs(),
            announce_channel: default_announce_channel(),
            log_level: default_log_level(),
            log_format: default_log_format(),
            params: GameParams::default(),
        }
    }
}
