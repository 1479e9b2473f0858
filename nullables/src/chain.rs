//! Nullable chain — scripted verification, resolution, and transfers.

use async_trait::async_trait;
use quickdraw_chain::{ChainError, TransferClient, TxOutcome, TxVerifier, WalletDirectory};
use quickdraw_types::{OnchainAddress, PlayerId, TxHash, UsdcAmount};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// What the scripted verifier should report for a hash.
#[derive(Clone, Copy, Debug)]
pub enum ScriptedOutcome {
    Success,
    Reverted,
    Timeout,
}

/// A [`TxVerifier`] that answers from a script instead of a chain.
///
/// Unscripted hashes confirm successfully, so happy-path tests need no
/// setup; failure tests script the hashes they care about.
pub struct NullVerifier {
    script: Mutex<HashMap<TxHash, ScriptedOutcome>>,
    calls: AtomicU64,
}

impl NullVerifier {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(HashMap::new()),
            calls: AtomicU64::new(0),
        }
    }

    pub fn script(&self, hash: TxHash, outcome: ScriptedOutcome) {
        self.script.lock().unwrap().insert(hash, outcome);
    }

    /// How many confirmations have been awaited.
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for NullVerifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TxVerifier for NullVerifier {
    async fn await_confirmation(&self, hash: &TxHash) -> Result<TxOutcome, ChainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.script.lock().unwrap().get(hash).copied();
        match scripted {
            None | Some(ScriptedOutcome::Success) => Ok(TxOutcome::Success),
            Some(ScriptedOutcome::Reverted) => Ok(TxOutcome::Reverted),
            Some(ScriptedOutcome::Timeout) => Err(ChainError::Timeout(0)),
        }
    }
}

/// A [`WalletDirectory`] backed by a map. Unregistered players fail to
/// resolve, which is exactly the no-partial-state path tests need.
pub struct NullDirectory {
    addresses: Mutex<HashMap<PlayerId, OnchainAddress>>,
}

impl NullDirectory {
    pub fn new() -> Self {
        Self {
            addresses: Mutex::new(HashMap::new()),
        }
    }

    pub fn register(&self, player: PlayerId, address: OnchainAddress) {
        self.addresses.lock().unwrap().insert(player, address);
    }

    /// Register a distinct synthetic address for a player.
    pub fn register_synthetic(&self, player: PlayerId) {
        let mut bytes = [0u8; 20];
        bytes[..8].copy_from_slice(&player.raw().to_be_bytes());
        self.register(player, OnchainAddress::new(bytes));
    }
}

impl Default for NullDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletDirectory for NullDirectory {
    async fn address_for(&self, player: PlayerId) -> Result<OnchainAddress, ChainError> {
        self.addresses
            .lock()
            .unwrap()
            .get(&player)
            .copied()
            .ok_or_else(|| ChainError::Resolution(player.to_string()))
    }
}

/// One recorded outbound transfer.
#[derive(Clone, Copy, Debug)]
pub struct SentTransfer {
    pub to: OnchainAddress,
    pub amount: UsdcAmount,
    pub tx_hash: TxHash,
}

/// A [`TransferClient`] that records transfers and mints synthetic hashes.
pub struct NullTransfer {
    sent: Mutex<Vec<SentTransfer>>,
    next_nonce: AtomicU64,
    fail_next: AtomicU64,
}

impl NullTransfer {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            next_nonce: AtomicU64::new(1),
            fail_next: AtomicU64::new(0),
        }
    }

    /// Make the next `n` transfer submissions fail.
    pub fn fail_next(&self, n: u64) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentTransfer> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Default for NullTransfer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransferClient for NullTransfer {
    async fn send_usdc(
        &self,
        to: &OnchainAddress,
        amount: UsdcAmount,
    ) -> Result<TxHash, ChainError> {
        if self.fail_next.load(Ordering::SeqCst) > 0 {
            self.fail_next.fetch_sub(1, Ordering::SeqCst);
            return Err(ChainError::TransferRejected("scripted failure".into()));
        }
        let nonce = self.next_nonce.fetch_add(1, Ordering::SeqCst);
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&nonce.to_be_bytes());
        let tx_hash = TxHash::new(bytes);
        self.sent.lock().unwrap().push(SentTransfer {
            to: *to,
            amount,
            tx_hash,
        });
        Ok(tx_hash)
    }
}
