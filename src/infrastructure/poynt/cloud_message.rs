use super::{
    API_VERSION_HEADER, ApiErrorBody, INVALID_ACCESS_TOKEN, REQUEST_ID_HEADER, USER_AGENT,
    authorization_url, new_request_id,
};
use crate::config::PoyntConfig;
use crate::domain::credentials::Credentials;
use crate::domain::payment::PaymentCommand;
use crate::domain::ports::MessageSender;
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use std::time::Duration;

/// Envelope posted to `/cloudMessages`; `data` carries the JSON-encoded
/// payment command for the terminal application.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CloudMessage<'a> {
    business_id: &'a str,
    #[serde(rename = "ttl")]
    ttl_secs: u64,
    data: String,
}

/// Sends payment commands to the terminal through the cloud message API.
pub struct CloudMessageSender {
    client: reqwest::Client,
    url: String,
    api_version: String,
    config: PoyntConfig,
}

impl CloudMessageSender {
    pub fn new(config: &PoyntConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            url: format!("{}/cloudMessages", config.api_host()),
            api_version: config.api_version(),
            config: config.clone(),
        })
    }
}

#[async_trait]
impl MessageSender for CloudMessageSender {
    async fn send(&self, credentials: &Credentials, command: &PaymentCommand) -> Result<()> {
        let message = CloudMessage {
            business_id: &self.config.business_id,
            ttl_secs: self.config.message_ttl_secs,
            data: serde_json::to_string(command)?,
        };
        let request_id = new_request_id();

        tracing::debug!(
            reference_id = %command.reference_id,
            %request_id,
            url = %self.url,
            "sending cloud message"
        );

        let response = self
            .client
            .post(&self.url)
            .header(AUTHORIZATION, credentials.authorization_header())
            .header(REQUEST_ID_HEADER, &request_id)
            .header(API_VERSION_HEADER, &self.api_version)
            .json(&message)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let error = classify_failure(status, &body);
        // A 401 without the expiry code usually means the merchant never
        // approved the application.
        if error.is_credential_expired()
            && error_code(&body).as_deref() != Some(INVALID_ACCESS_TOKEN)
            && let Ok(url) = authorization_url(&self.config, &command.callback_url)
        {
            tracing::warn!(%url, "cloud rejected credentials, the application may need approval");
        }
        Err(error)
    }
}

/// Maps a non-success cloud response onto the error taxonomy. Only token
/// rejections become `CredentialExpired`.
pub fn classify_failure(status: StatusCode, body: &str) -> GatewayError {
    if status == StatusCode::UNAUTHORIZED || error_code(body).as_deref() == Some(INVALID_ACCESS_TOKEN)
    {
        GatewayError::CredentialExpired
    } else {
        GatewayError::Remote {
            status: status.as_u16(),
            body: body.to_string(),
        }
    }
}

fn error_code(body: &str) -> Option<String> {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_is_credential_expiry() {
        assert!(matches!(
            classify_failure(StatusCode::UNAUTHORIZED, ""),
            GatewayError::CredentialExpired
        ));
        assert!(matches!(
            classify_failure(
                StatusCode::UNAUTHORIZED,
                r#"{"code":"INVALID_ACCESS_TOKEN","httpStatus":401}"#
            ),
            GatewayError::CredentialExpired
        ));
    }

    #[test]
    fn test_invalid_token_code_on_other_status() {
        assert!(matches!(
            classify_failure(StatusCode::FORBIDDEN, r#"{"code":"INVALID_ACCESS_TOKEN"}"#),
            GatewayError::CredentialExpired
        ));
    }

    #[test]
    fn test_other_failures_are_remote_errors() {
        match classify_failure(StatusCode::BAD_GATEWAY, "upstream down") {
            GatewayError::Remote { status, body } => {
                assert_eq!(status, 502);
                assert_eq!(body, "upstream down");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_envelope_embeds_command_as_string() {
        let message = CloudMessage {
            business_id: "biz",
            ttl_secs: 30,
            data: r#"{"action":"sale"}"#.to_string(),
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["businessId"], "biz");
        assert_eq!(json["ttl"], 30);
        assert_eq!(json["data"], r#"{"action":"sale"}"#);
    }
}
