#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use poynt_pay::application::credentials::CredentialCache;
use poynt_pay::application::gateway::PaymentGateway;
use poynt_pay::domain::credentials::Credentials;
use poynt_pay::domain::payment::{PaymentCommand, PaymentDefaults, ReferenceId};
use poynt_pay::domain::ports::{CredentialProvider, MessageSender};
use poynt_pay::error::{GatewayError, Result};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy)]
pub enum SendOutcome {
    Accept,
    Unauthorized,
    Fail,
}

type SendHook = Box<dyn Fn(&PaymentCommand) + Send + Sync>;

/// A `MessageSender` that plays back scripted outcomes (accepting once the
/// script runs out) and forwards accepted commands to the test.
pub struct FakeSender {
    script: Mutex<VecDeque<SendOutcome>>,
    sent: Mutex<Vec<(String, PaymentCommand)>>,
    commands: mpsc::UnboundedSender<PaymentCommand>,
    on_send: Option<SendHook>,
}

impl FakeSender {
    pub fn scripted(
        outcomes: impl IntoIterator<Item = SendOutcome>,
    ) -> (Self, mpsc::UnboundedReceiver<PaymentCommand>) {
        let (commands, rx) = mpsc::unbounded_channel();
        let sender = Self {
            script: Mutex::new(outcomes.into_iter().collect()),
            sent: Mutex::new(Vec::new()),
            commands,
            on_send: None,
        };
        (sender, rx)
    }

    pub fn new() -> (Self, mpsc::UnboundedReceiver<PaymentCommand>) {
        Self::scripted([])
    }

    /// Runs `hook` inside `send`, before it returns.
    pub fn with_hook(mut self, hook: impl Fn(&PaymentCommand) + Send + Sync + 'static) -> Self {
        self.on_send = Some(Box::new(hook));
        self
    }

    pub fn attempts(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn tokens_used(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(token, _)| token.clone())
            .collect()
    }
}

#[async_trait]
impl MessageSender for FakeSender {
    async fn send(&self, credentials: &Credentials, command: &PaymentCommand) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((credentials.access_token.clone(), command.clone()));

        let outcome = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(SendOutcome::Accept);

        match outcome {
            SendOutcome::Accept => {
                if let Some(hook) = &self.on_send {
                    hook(command);
                }
                let _ = self.commands.send(command.clone());
                Ok(())
            }
            SendOutcome::Unauthorized => Err(GatewayError::CredentialExpired),
            SendOutcome::Fail => Err(GatewayError::Remote {
                status: 500,
                body: "terminal offline".to_string(),
            }),
        }
    }
}

/// Issues `token-N` on grants and `refreshed-N` on refreshes.
#[derive(Default)]
pub struct FakeProvider {
    pub acquired: AtomicUsize,
    pub refreshed: AtomicUsize,
}

impl FakeProvider {
    pub fn refreshes(&self) -> usize {
        self.refreshed.load(Ordering::SeqCst)
    }
}

fn credentials(token: String) -> Credentials {
    Credentials {
        access_token: token,
        token_type: "BEARER".to_string(),
        refresh_token: Some("refresh".to_string()),
        scope: None,
        expires_at: Utc::now() + chrono::Duration::hours(1),
    }
}

#[async_trait]
impl CredentialProvider for FakeProvider {
    async fn acquire(&self) -> Result<Credentials> {
        let n = self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(credentials(format!("token-{n}")))
    }

    async fn refresh(&self, _current: &Credentials) -> Result<Credentials> {
        let n = self.refreshed.fetch_add(1, Ordering::SeqCst);
        Ok(credentials(format!("refreshed-{n}")))
    }
}

pub fn defaults() -> PaymentDefaults {
    PaymentDefaults {
        currency: "NZD".to_string(),
        callback_url: "http://127.0.0.1:8000/callback".to_string(),
        order_id: "test-order".to_string(),
        is_debit: true,
    }
}

pub fn build_gateway(
    sender: Arc<FakeSender>,
    provider: Arc<FakeProvider>,
    timeout: Duration,
) -> Arc<PaymentGateway> {
    Arc::new(PaymentGateway::new(
        sender,
        Arc::new(CredentialCache::new(provider)),
        defaults(),
        timeout,
    ))
}

pub fn callback_body(reference_id: &ReferenceId, status: &str) -> Vec<u8> {
    serde_json::json!({ "referenceId": reference_id, "status": status })
        .to_string()
        .into_bytes()
}
