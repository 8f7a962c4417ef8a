use super::{API_VERSION_HEADER, REQUEST_ID_HEADER, USER_AGENT, new_request_id};
use crate::config::PoyntConfig;
use crate::domain::credentials::{Credentials, TokenResponse};
use crate::domain::ports::CredentialProvider;
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::Serialize;
use std::path::PathBuf;

pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
pub const REFRESH_TOKEN_GRANT: &str = "REFRESH_TOKEN";

/// Lifetime of the self-signed assertion exchanged for an access token.
const ASSERTION_TTL_MINUTES: i64 = 5;

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
    jti: String,
}

/// Obtains access tokens from the cloud's `/token` endpoint.
///
/// The initial grant exchanges an RS256 assertion signed with the
/// application's private key; later renewals use the refresh token.
pub struct TokenClient {
    client: reqwest::Client,
    token_url: String,
    api_version: String,
    audience: String,
    application_id: String,
    private_key_file: PathBuf,
}

impl TokenClient {
    pub fn new(config: &PoyntConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            token_url: format!("{}/token", config.api_host()),
            api_version: config.api_version(),
            audience: config.api_host().to_string(),
            application_id: config.application_id.clone(),
            private_key_file: config.private_key_file.clone(),
        })
    }

    async fn sign_assertion(&self) -> Result<String> {
        let pem = tokio::fs::read(&self.private_key_file).await.map_err(|e| {
            GatewayError::Config(format!("{}: {e}", self.private_key_file.display()))
        })?;
        let key = EncodingKey::from_rsa_pem(&pem)?;

        let now = Utc::now();
        let claims = AssertionClaims {
            iss: &self.application_id,
            sub: &self.application_id,
            aud: &self.audience,
            iat: now.timestamp(),
            exp: (now + Duration::minutes(ASSERTION_TTL_MINUTES)).timestamp(),
            jti: new_request_id(),
        };

        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &key,
        )?)
    }

    async fn grant(&self, params: &[(&str, &str)]) -> Result<Credentials> {
        let response = self
            .client
            .post(&self.token_url)
            .header(API_VERSION_HEADER, &self.api_version)
            .header(REQUEST_ID_HEADER, new_request_id())
            .form(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::RefreshFailed(format!("HTTP {status}: {body}")));
        }

        let issued_at = Utc::now();
        let token: TokenResponse = response.json().await?;
        Ok(Credentials::from_response(token, issued_at))
    }
}

#[async_trait]
impl CredentialProvider for TokenClient {
    async fn acquire(&self) -> Result<Credentials> {
        let assertion = self.sign_assertion().await?;
        tracing::info!(url = %self.token_url, "requesting access token");
        self.grant(&[("grantType", JWT_BEARER_GRANT), ("assertion", &assertion)])
            .await
    }

    async fn refresh(&self, current: &Credentials) -> Result<Credentials> {
        let refresh_token = current
            .refresh_token
            .as_deref()
            .ok_or_else(|| GatewayError::RefreshFailed("no refresh token".to_string()))?;
        tracing::info!(url = %self.token_url, "refreshing access token");
        self.grant(&[
            ("grantType", REFRESH_TOKEN_GRANT),
            ("refreshToken", refresh_token),
        ])
        .await
    }
}
