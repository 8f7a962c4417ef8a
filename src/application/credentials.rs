use crate::domain::credentials::Credentials;
use crate::domain::ports::CredentialProviderRef;
use crate::error::{GatewayError, Result};
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};

/// Shared access credentials with serialized renewal.
///
/// Reads are concurrent. Renewals take `refresh_lock`, and a task that waited
/// on it re-checks whether someone else already replaced the credentials it
/// saw, so simultaneous rejections cost a single round trip to the auth
/// service.
pub struct CredentialCache {
    provider: CredentialProviderRef,
    current: RwLock<Option<Credentials>>,
    refresh_lock: Mutex<()>,
}

impl CredentialCache {
    pub fn new(provider: CredentialProviderRef) -> Self {
        Self {
            provider,
            current: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn with_credentials(provider: CredentialProviderRef, credentials: Credentials) -> Self {
        Self {
            provider,
            current: RwLock::new(Some(credentials)),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Performs the initial grant.
    pub async fn initialize(&self) -> Result<()> {
        self.renew(None).await.map(|_| ())
    }

    /// Returns usable credentials, renewing them first when missing or expired.
    pub async fn current(&self) -> Result<Credentials> {
        let snapshot = self.current.read().await.clone();
        match snapshot {
            Some(credentials) if !credentials.is_expired(Utc::now()) => Ok(credentials),
            stale => self.renew(stale.as_ref()).await,
        }
    }

    /// Replaces `stale` after the remote rejected it.
    pub async fn refresh(&self, stale: &Credentials) -> Result<Credentials> {
        self.renew(Some(stale)).await
    }

    async fn renew(&self, stale: Option<&Credentials>) -> Result<Credentials> {
        let _guard = self.refresh_lock.lock().await;

        if let Some(latest) = self.current.read().await.clone() {
            let replaced = stale.is_none_or(|s| s.access_token != latest.access_token);
            if replaced && !latest.is_expired(Utc::now()) {
                return Ok(latest);
            }
        }

        let fresh = match stale {
            Some(stale) if stale.refresh_token.is_some() => {
                match self.provider.refresh(stale).await {
                    Ok(fresh) => fresh,
                    Err(e) => {
                        tracing::warn!(error = %e, "token refresh rejected, requesting a new grant");
                        self.provider.acquire().await.map_err(refresh_failed)?
                    }
                }
            }
            _ => self.provider.acquire().await.map_err(refresh_failed)?,
        };

        tracing::info!(expires_at = %fresh.expires_at, "access token renewed");
        *self.current.write().await = Some(fresh.clone());
        Ok(fresh)
    }
}

fn refresh_failed(error: GatewayError) -> GatewayError {
    match error {
        GatewayError::RefreshFailed(message) => GatewayError::RefreshFailed(message),
        other => GatewayError::RefreshFailed(other.to_string()),
    }
}
