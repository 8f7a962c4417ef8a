use crate::domain::callback::CallbackResult;
use crate::domain::payment::ReferenceId;
use crate::error::{GatewayError, Result};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;

struct PendingEntry {
    /// Taken by the first delivery; `None` afterwards.
    sender: Option<oneshot::Sender<CallbackResult>>,
    created_at: Instant,
}

/// Table of in-flight payment attempts keyed by reference identifier.
///
/// Backed by a sharded `DashMap`, so operations on different identifiers do
/// not contend on a single lock. Every operation holds a shard lock only for
/// the map access itself; waiting for a result never touches the map.
///
/// Cloning is cheap and shares the same table.
#[derive(Clone, Default)]
pub struct PendingRegistry {
    entries: Arc<DashMap<ReferenceId, PendingEntry>>,
}

impl PendingRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a single-use delivery channel for `id`.
    ///
    /// Fails with `DuplicateIdentifier` if `id` already has an open entry; the
    /// existing waiter is left untouched.
    pub fn register(&self, id: ReferenceId) -> Result<PendingHandle> {
        let (sender, receiver) = oneshot::channel();

        match self.entries.entry(id.clone()) {
            Entry::Occupied(_) => return Err(GatewayError::DuplicateIdentifier(id.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(PendingEntry {
                    sender: Some(sender),
                    created_at: Instant::now(),
                });
            }
        }

        Ok(PendingHandle {
            id,
            receiver,
            registry: self.clone(),
        })
    }

    /// Hands `result` to the waiter registered under `id`.
    ///
    /// Returns false when there is no entry, when the entry was already
    /// delivered to, or when its waiter has given up.
    pub fn deliver(&self, id: &ReferenceId, result: CallbackResult) -> bool {
        let sender = self
            .entries
            .get_mut(id)
            .and_then(|mut entry| entry.sender.take());

        match sender {
            Some(sender) => sender.send(result).is_ok(),
            None => false,
        }
    }

    /// Deletes the entry for `id`. Removing a missing id is a no-op.
    pub fn remove(&self, id: &ReferenceId) {
        self.entries.remove(id);
    }

    pub fn contains(&self, id: &ReferenceId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Age of the longest-waiting entry, if any.
    pub fn oldest_age(&self) -> Option<Duration> {
        self.entries
            .iter()
            .map(|entry| entry.created_at)
            .min()
            .map(|created_at| created_at.elapsed())
    }
}

/// The waiting side of a registered entry.
///
/// Dropping the handle removes the entry, so a waiter that is cancelled (for
/// example because the inbound HTTP connection closed) never leaks it.
pub struct PendingHandle {
    id: ReferenceId,
    receiver: oneshot::Receiver<CallbackResult>,
    registry: PendingRegistry,
}

impl PendingHandle {
    /// Waits for the delivered result or until `timeout` elapses.
    ///
    /// The entry is gone from the registry by the time this returns, whatever
    /// the outcome.
    pub async fn wait(mut self, timeout: Duration) -> Result<CallbackResult> {
        match tokio::time::timeout(timeout, &mut self.receiver).await {
            Ok(Ok(result)) => {
                self.registry.remove(&self.id);
                Ok(result)
            }
            Ok(Err(_)) => {
                self.registry.remove(&self.id);
                Err(GatewayError::Abandoned(self.id.to_string()))
            }
            Err(_) => {
                // Remove before draining: once the entry is gone no deliver can
                // succeed, so anything that did is already in the channel.
                self.registry.remove(&self.id);
                self.receiver.close();
                self.receiver
                    .try_recv()
                    .map_err(|_| GatewayError::Timeout(timeout))
            }
        }
    }
}

impl Drop for PendingHandle {
    fn drop(&mut self) {
        self.registry.remove(&self.id);
    }
}
