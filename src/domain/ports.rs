use super::credentials::Credentials;
use super::payment::PaymentCommand;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Delivers a payment command to the terminal through the remote cloud.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Returns `GatewayError::CredentialExpired` when the remote rejects the
    /// access token, so the caller can refresh and retry.
    async fn send(&self, credentials: &Credentials, command: &PaymentCommand) -> Result<()>;
}

/// Obtains and renews access credentials for the remote cloud.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn acquire(&self) -> Result<Credentials>;
    async fn refresh(&self, current: &Credentials) -> Result<Credentials>;
}

pub type MessageSenderRef = Arc<dyn MessageSender>;
pub type CredentialProviderRef = Arc<dyn CredentialProvider>;
