use super::callback::{CallbackAck, CallbackReceiver};
use super::correlator::PaymentCorrelator;
use super::credentials::CredentialCache;
use super::registry::PendingRegistry;
use crate::domain::callback::CallbackResult;
use crate::domain::payment::PaymentDefaults;
use crate::domain::ports::MessageSenderRef;
use crate::error::Result;
use std::sync::Arc;
use std::time::Duration;

/// The main entry point for taking payments on the terminal.
///
/// `PaymentGateway` owns the pending-request registry and shares it between
/// the dispatching side (`pay`) and the callback side (`callback`). One
/// instance lives for the whole process and is shared across request tasks.
pub struct PaymentGateway {
    registry: PendingRegistry,
    correlator: PaymentCorrelator,
    callbacks: CallbackReceiver,
    credentials: Arc<CredentialCache>,
    timeout: Duration,
}

impl PaymentGateway {
    /// Creates a new `PaymentGateway` instance.
    ///
    /// # Arguments
    ///
    /// * `sender` - Delivers commands to the terminal.
    /// * `credentials` - Access credentials used by `sender`.
    /// * `defaults` - Currency, callback URL and order settings for each sale.
    /// * `timeout` - How long `pay` waits for the terminal's callback.
    pub fn new(
        sender: MessageSenderRef,
        credentials: Arc<CredentialCache>,
        defaults: PaymentDefaults,
        timeout: Duration,
    ) -> Self {
        let registry = PendingRegistry::new();
        Self {
            correlator: PaymentCorrelator::new(
                registry.clone(),
                sender,
                credentials.clone(),
                defaults,
            ),
            callbacks: CallbackReceiver::new(registry.clone()),
            registry,
            credentials,
            timeout,
        }
    }

    /// Obtains the initial access token.
    pub async fn authenticate(&self) -> Result<()> {
        self.credentials.initialize().await
    }

    /// Takes a payment of `amount`, waiting up to the configured timeout.
    pub async fn pay(&self, amount: &str) -> Result<CallbackResult> {
        self.correlator.execute(amount, self.timeout).await
    }

    /// Routes a raw callback body to its waiting payment.
    pub fn callback(&self, raw: &[u8]) -> Result<CallbackAck> {
        self.callbacks.on_callback(raw)
    }

    /// Number of payments dispatched and still awaiting a callback.
    pub fn pending(&self) -> usize {
        self.registry.len()
    }

    /// How long the longest-waiting payment has been pending.
    pub fn oldest_pending(&self) -> Option<Duration> {
        self.registry.oldest_age()
    }

    pub fn registry(&self) -> &PendingRegistry {
        &self.registry
    }
}
