use super::registry::PendingRegistry;
use crate::domain::callback::CallbackResult;
use crate::error::Result;

/// What happened to an accepted callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAck {
    /// Handed to the waiting payment request.
    Delivered,
    /// No waiter: timed out, already resolved, or never issued here.
    Orphaned,
}

impl CallbackAck {
    pub fn matched(self) -> bool {
        self == Self::Delivered
    }
}

/// Routes terminal callbacks to the payment requests waiting on them.
pub struct CallbackReceiver {
    registry: PendingRegistry,
}

impl CallbackReceiver {
    pub fn new(registry: PendingRegistry) -> Self {
        Self { registry }
    }

    /// Parses `raw` and delivers it to the matching waiter.
    ///
    /// Orphans are logged and still acknowledged, so the device does not keep
    /// retrying a callback nobody will consume.
    pub fn on_callback(&self, raw: &[u8]) -> Result<CallbackAck> {
        let result = CallbackResult::from_slice(raw).inspect_err(|e| {
            tracing::warn!(error = %e, "rejecting malformed callback");
        })?;

        let reference_id = result.reference_id.clone();
        let status = result.status.clone();

        if self.registry.deliver(&reference_id, result) {
            tracing::info!(%reference_id, %status, "callback delivered");
            Ok(CallbackAck::Delivered)
        } else {
            tracing::warn!(%reference_id, %status, "orphan callback, no pending payment");
            Ok(CallbackAck::Orphaned)
        }
    }
}
