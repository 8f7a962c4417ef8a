use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Dispatch failed: {0}")]
    DispatchFailed(String),
    #[error("No callback received within {0:?}")]
    Timeout(Duration),
    #[error("Malformed callback: {0}")]
    MalformedCallback(String),
    #[error("Duplicate reference identifier: {0}")]
    DuplicateIdentifier(String),
    #[error("Access token expired or rejected")]
    CredentialExpired,
    #[error("Credential refresh failed: {0}")]
    RefreshFailed(String),
    #[error("Remote returned HTTP {status}: {body}")]
    Remote { status: u16, body: String },
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Token signing error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Pending request abandoned: {0}")]
    Abandoned(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl GatewayError {
    /// True when the remote rejected the request because of the access token,
    /// which is the only failure the dispatcher retries after a refresh.
    pub fn is_credential_expired(&self) -> bool {
        matches!(self, Self::CredentialExpired)
    }

    /// Stable snake_case kind used in HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "invalid_amount",
            Self::DispatchFailed(_) => "dispatch_failed",
            Self::Timeout(_) => "timeout",
            Self::MalformedCallback(_) => "malformed_callback",
            Self::DuplicateIdentifier(_) => "duplicate_identifier",
            Self::CredentialExpired => "credential_expired",
            Self::RefreshFailed(_) => "refresh_failed",
            Self::Remote { .. } => "remote_error",
            Self::Http(_) => "http_error",
            Self::Json(_) => "json_error",
            Self::Jwt(_) => "token_signing_error",
            Self::Config(_) => "config_error",
            Self::Abandoned(_) => "abandoned",
            Self::IoError(_) => "io_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
