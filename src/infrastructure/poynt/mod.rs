//! HTTP clients for the Poynt cloud: cloud messages to the terminal and the
//! token endpoint.

pub mod cloud_message;
pub mod token;

use crate::config::PoyntConfig;
use crate::error::{GatewayError, Result};
use reqwest::Url;
use serde::Deserialize;
use uuid::Uuid;

/// Per-HTTP-request identifier header. Unrelated to the payment reference id.
pub const REQUEST_ID_HEADER: &str = "Poynt-Request-Id";
pub const API_VERSION_HEADER: &str = "api-version";
pub const USER_AGENT: &str = concat!("poynt-pay/", env!("CARGO_PKG_VERSION"));

/// Application code the cloud returns for an expired or revoked token.
pub const INVALID_ACCESS_TOKEN: &str = "INVALID_ACCESS_TOKEN";

/// Error body returned by the cloud.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiErrorBody {
    pub code: Option<String>,
    pub http_status: Option<u16>,
    pub message: Option<String>,
    pub developer_message: Option<String>,
    pub request_id: Option<String>,
}

pub fn new_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Page where a merchant approves the application.
pub fn authorization_url(config: &PoyntConfig, callback_url: &str) -> Result<String> {
    let base = format!(
        "{}/applications/authorize",
        config.poynt_auth_host_url.trim_end_matches('/')
    );
    let url = Url::parse_with_params(
        &base,
        [
            ("callback", callback_url),
            ("applicationId", config.application_id.as_str()),
        ],
    )
    .map_err(|e| GatewayError::Config(format!("{base}: {e}")))?;
    Ok(url.into())
}
