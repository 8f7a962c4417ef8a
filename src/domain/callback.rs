use super::payment::ReferenceId;
use crate::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};

/// Outcome reported by the terminal for a previously dispatched command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackResult {
    pub reference_id: ReferenceId,
    pub status: String,
}

/// Inbound body before the required fields are checked.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCallback {
    reference_id: Option<String>,
    status: Option<String>,
}

impl CallbackResult {
    pub fn new(reference_id: ReferenceId, status: impl Into<String>) -> Self {
        Self {
            reference_id,
            status: status.into(),
        }
    }

    /// Parses a callback body. Unknown fields are ignored; `referenceId` and
    /// `status` must be present and non-empty.
    pub fn from_slice(raw: &[u8]) -> Result<Self> {
        let parsed: RawCallback = serde_json::from_slice(raw)
            .map_err(|e| GatewayError::MalformedCallback(e.to_string()))?;

        let reference_id = required(parsed.reference_id, "referenceId")?;
        let status = required(parsed.status, "status")?;

        Ok(Self::new(reference_id.into(), status))
    }
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(GatewayError::MalformedCallback(format!(
            "missing field `{field}`"
        ))),
    }
}
