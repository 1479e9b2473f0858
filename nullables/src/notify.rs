//! Nullable notifier — records outbound messages instead of delivering them.

use async_trait::async_trait;
use quickdraw_messages::{Notifier, NotifyError, Outbound};
use std::sync::Mutex;

/// A [`Notifier`] that appends every message to an in-memory log.
pub struct NullNotifier {
    delivered: Mutex<Vec<Outbound>>,
}

impl NullNotifier {
    pub fn new() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
        }
    }

    pub fn delivered(&self) -> Vec<Outbound> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn delivered_count(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }

    /// Messages matching a predicate, for targeted assertions.
    pub fn matching(&self, predicate: impl Fn(&Outbound) -> bool) -> Vec<Outbound> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .filter(|m| predicate(m))
            .cloned()
            .collect()
    }
}

impl Default for NullNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for NullNotifier {
    async fn deliver(&self, message: &Outbound) -> Result<(), NotifyError> {
        self.delivered.lock().unwrap().push(message.clone());
        Ok(())
    }
}
