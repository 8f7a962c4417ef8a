use super::credentials::CredentialCache;
use super::registry::PendingRegistry;
use crate::domain::amount::Amount;
use crate::domain::callback::CallbackResult;
use crate::domain::payment::{PaymentCommand, PaymentDefaults, ReferenceId};
use crate::domain::ports::MessageSenderRef;
use crate::error::{GatewayError, Result};
use std::sync::Arc;
use std::time::Duration;

/// Dispatches payment commands and waits for the terminal's callback.
pub struct PaymentCorrelator {
    registry: PendingRegistry,
    sender: MessageSenderRef,
    credentials: Arc<CredentialCache>,
    defaults: PaymentDefaults,
}

impl PaymentCorrelator {
    pub fn new(
        registry: PendingRegistry,
        sender: MessageSenderRef,
        credentials: Arc<CredentialCache>,
        defaults: PaymentDefaults,
    ) -> Self {
        Self {
            registry,
            sender,
            credentials,
            defaults,
        }
    }

    /// Sends a sale for `amount` to the terminal and blocks until its callback
    /// arrives or `timeout` elapses.
    ///
    /// The amount is validated before anything touches the network. The
    /// pending entry is registered before dispatch, so a callback that beats
    /// the dispatch response still finds its waiter.
    pub async fn execute(&self, amount: &str, timeout: Duration) -> Result<CallbackResult> {
        let amount = Amount::parse(amount)?;
        let reference_id = ReferenceId::generate();
        let handle = self.registry.register(reference_id.clone())?;
        let command = PaymentCommand::sale(amount, reference_id.clone(), &self.defaults);

        if let Err(e) = self.dispatch(&command).await {
            self.registry.remove(&reference_id);
            tracing::error!(%reference_id, error = %e, "payment dispatch failed");
            return Err(e);
        }
        tracing::info!(%reference_id, %amount, "payment dispatched, awaiting callback");

        let outcome = handle.wait(timeout).await;
        match &outcome {
            Ok(result) => {
                tracing::info!(%reference_id, status = %result.status, "payment resolved")
            }
            Err(e) => tracing::warn!(%reference_id, error = %e, "payment unresolved"),
        }
        outcome
    }

    /// Sends `command`, refreshing credentials and retrying exactly once when
    /// the remote rejects the access token. Any other failure is final.
    async fn dispatch(&self, command: &PaymentCommand) -> Result<()> {
        let credentials = self.credentials.current().await.map_err(dispatch_failed)?;

        match self.sender.send(&credentials, command).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_credential_expired() => {
                tracing::warn!(
                    reference_id = %command.reference_id,
                    "access token rejected, refreshing and retrying once"
                );
                let refreshed = self
                    .credentials
                    .refresh(&credentials)
                    .await
                    .map_err(dispatch_failed)?;
                self.sender
                    .send(&refreshed, command)
                    .await
                    .map_err(dispatch_failed)
            }
            Err(e) => Err(dispatch_failed(e)),
        }
    }
}

fn dispatch_failed(error: GatewayError) -> GatewayError {
    match error {
        GatewayError::DispatchFailed(message) => GatewayError::DispatchFailed(message),
        other => GatewayError::DispatchFailed(other.to_string()),
    }
}
