use crate::error::{GatewayError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_HOST: &str = "https://services.poynt.net";
pub const DEFAULT_AUTH_HOST: &str = "https://poynt.net";

/// Remote cloud settings, read from a JSON file.
///
/// Field names follow the snake_case keys of the configuration file, e.g.
/// `{"business_id": "...", "application_id": "urn:aid:...", ...}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PoyntConfig {
    pub poynt_api_host_url: String,
    pub poynt_api_version: f64,
    pub poynt_auth_host_url: String,
    pub business_id: String,
    pub application_id: String,
    pub private_key_file: PathBuf,
    /// Lifetime of a cloud message in seconds.
    pub message_ttl_secs: u64,
}

impl Default for PoyntConfig {
    fn default() -> Self {
        Self {
            poynt_api_host_url: DEFAULT_API_HOST.to_string(),
            poynt_api_version: 1.2,
            poynt_auth_host_url: DEFAULT_AUTH_HOST.to_string(),
            business_id: String::new(),
            application_id: String::new(),
            private_key_file: PathBuf::from("keys/poynt_pay_key"),
            message_ttl_secs: 30,
        }
    }
}

impl PoyntConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| GatewayError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| GatewayError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("business_id", &self.business_id),
            ("application_id", &self.application_id),
            ("poynt_api_host_url", &self.poynt_api_host_url),
        ] {
            if value.trim().is_empty() {
                return Err(GatewayError::Config(format!("`{name}` must be set")));
            }
        }
        Ok(())
    }

    /// Value of the `api-version` header, e.g. `"1.2"`.
    pub fn api_version(&self) -> String {
        format!("{:.1}", self.poynt_api_version)
    }

    /// Base URL without a trailing slash.
    pub fn api_host(&self) -> &str {
        self.poynt_api_host_url.trim_end_matches('/')
    }
}
