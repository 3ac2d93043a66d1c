use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::common::DisplayMessage;

/// Process-lifetime, append-only message log shared by the HTTP bridge and
/// the inbound loop.
///
/// One mutex guards the vector. `append` holds it for a push and `snapshot`
/// for a clone, never across an `.await`.
#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    messages: Arc<Mutex<Vec<DisplayMessage>>>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, message: DisplayMessage) {
        self.lock().push(message);
    }

    /// Copy of the log at a single point in time, oldest first.
    pub fn snapshot(&self) -> Vec<DisplayMessage> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A push either completed or never started, so a poisoned log is still whole.
    fn lock(&self) -> MutexGuard<'_, Vec<DisplayMessage>> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
