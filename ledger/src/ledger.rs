//! The payment ledger proper.

use crate::LedgerError;
use quickdraw_types::{
    ChallengeId, ChannelId, GameParams, PaymentId, PaymentPurpose, PaymentStatus, PlayerId,
    Timestamp, TxHash, UsdcAmount,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

/// One outstanding (or recently terminal) payment leg.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub id: PaymentId,
    pub owner: PlayerId,
    pub purpose: PaymentPurpose,
    /// What the payer owes: the wager for challenge legs, the entry fee
    /// for solo play. Kept on the entry so late-confirmation refunds know
    /// how much to return.
    pub amount: UsdcAmount,
    /// Owning challenge, present for challenge legs.
    pub challenge: Option<ChallengeId>,
    pub channel: ChannelId,
    pub status: PaymentStatus,
    /// Transaction hash, recorded on confirmation for audit.
    pub tx_hash: Option<TxHash>,
    pub created_at: Timestamp,
    /// When the entry turned terminal; drives grace-window expiry.
    pub terminal_at: Option<Timestamp>,
}

/// Result of a mark-confirmed / mark-failed call.
#[derive(Clone, Debug)]
pub enum MarkOutcome {
    /// This call performed the transition. Side effects belong to this caller.
    Transitioned(PaymentRequest),
    /// The entry was already terminal; no side effects may be repeated.
    AlreadyTerminal(PaymentStatus),
}

impl MarkOutcome {
    pub fn transitioned(&self) -> bool {
        matches!(self, MarkOutcome::Transitioned(_))
    }
}

/// Ledger of payment legs, keyed by payment id.
///
/// All operations serialize on an internal lock held only for the map
/// mutation itself, never across I/O.
pub struct PaymentLedger {
    entries: Mutex<HashMap<PaymentId, PaymentRequest>>,
}

impl PaymentLedger {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Create a pending entry. Fails if the payment id already exists.
    pub fn open(
        &self,
        id: PaymentId,
        owner: PlayerId,
        purpose: PaymentPurpose,
        amount: UsdcAmount,
        channel: ChannelId,
        challenge: Option<ChallengeId>,
        now: Timestamp,
    ) -> Result<PaymentRequest, LedgerError> {
        let mut entries = self.entries.lock().unwrap();
        if entries.contains_key(&id) {
            return Err(LedgerError::DuplicatePayment(id.to_string()));
        }
        let entry = PaymentRequest {
            id: id.clone(),
            owner,
            purpose,
            amount,
            challenge,
            channel,
            status: PaymentStatus::Pending,
            tx_hash: None,
            created_at: now,
            terminal_at: None,
        };
        entries.insert(id, entry.clone());
        Ok(entry)
    }

    /// Transition to confirmed. Idempotent: a second call on a terminal
    /// entry reports `AlreadyTerminal` and changes nothing.
    pub fn mark_confirmed(
        &self,
        id: &PaymentId,
        tx_hash: TxHash,
        now: Timestamp,
    ) -> Result<MarkOutcome, LedgerError> {
        self.mark(id, PaymentStatus::Confirmed, Some(tx_hash), now)
    }

    /// Transition to failed. Same idempotence contract as `mark_confirmed`.
    pub fn mark_failed(&self, id: &PaymentId, now: Timestamp) -> Result<MarkOutcome, LedgerError> {
        self.mark(id, PaymentStatus::Failed, None, now)
    }

    fn mark(
        &self,
        id: &PaymentId,
        status: PaymentStatus,
        tx_hash: Option<TxHash>,
        now: Timestamp,
    ) -> Result<MarkOutcome, LedgerError> {
        let mut entries = self.entries.lock().unwrap();
        let entry = entries
            .get_mut(id)
            .ok_or_else(|| LedgerError::NotFound(id.to_string()))?;
        if entry.status.is_terminal() {
            return Ok(MarkOutcome::AlreadyTerminal(entry.status));
        }
        entry.status = status;
        entry.tx_hash = tx_hash;
        entry.terminal_at = Some(now);
        Ok(MarkOutcome::Transitioned(entry.clone()))
    }

    pub fn get(&self, id: &PaymentId) -> Option<PaymentRequest> {
        self.entries.lock().unwrap().get(id).cloned()
    }

    /// Drop the entry immediately, bypassing the grace window. Used on
    /// verification error paths where no client will poll the outcome.
    pub fn remove(&self, id: &PaymentId) -> Option<PaymentRequest> {
        self.entries.lock().unwrap().remove(id)
    }

    /// Purge terminal entries past their grace window. Best-effort; returns
    /// how many entries were removed.
    pub fn purge_expired(&self, params: &GameParams, now: Timestamp) -> usize {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|_, entry| match (entry.status, entry.terminal_at) {
            (PaymentStatus::Confirmed, Some(at)) => {
                !at.has_expired(params.confirmed_grace_secs, now)
            }
            (PaymentStatus::Failed, Some(at)) => !at.has_expired(params.failed_grace_secs, now),
            _ => true,
        });
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!(removed, "purged expired payment entries");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.entries
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.status == PaymentStatus::Pending)
            .count()
    }
}

impl Default for PaymentLedger {
    fn default() -> Self {
        Self::new()
    }
}
