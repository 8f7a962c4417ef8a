use super::AppState;
use super::error::ApiError;
use crate::domain::callback::CallbackResult;
use crate::error::GatewayError;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{RawQuery, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse};
use serde::Deserialize;
use serde_json::{Value, json};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Fields sent by the register's payment page.
#[derive(Debug, Default, Deserialize)]
pub struct PayParams {
    pub amount: Option<String>,
    pub origin: Option<String>,
}

impl PayParams {
    /// Collects parameters from the query string and, for form posts, the
    /// body. Body fields win over query fields of the same name.
    pub fn from_request(
        query: Option<&str>,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Result<Self, GatewayError> {
        let mut params: Self = match query {
            Some(query) => serde_urlencoded::from_str(query).map_err(invalid_params)?,
            None => Self::default(),
        };

        if is_form(headers) && !body.is_empty() {
            let form: Self = serde_urlencoded::from_bytes(body).map_err(invalid_params)?;
            params.amount = form.amount.or(params.amount);
            params.origin = form.origin.or(params.origin);
        }
        Ok(params)
    }
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with(FORM_CONTENT_TYPE))
}

fn invalid_params(error: serde_urlencoded::de::Error) -> GatewayError {
    GatewayError::InvalidAmount(format!("unreadable parameters: {error}"))
}

pub async fn landing() -> Html<&'static str> {
    Html(include_str!("gateway.html"))
}

/// The register-side script driving the Vend payments dialog.
pub async fn gateway_script() -> impl IntoResponse {
    (
        [
            (CONTENT_TYPE, "text/javascript; charset=utf-8"),
            (CACHE_CONTROL, "no-cache"),
        ],
        include_str!("assets/gateway.js"),
    )
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "pending": state.gateway.pending(),
        "oldest_pending_ms": state
            .gateway
            .oldest_pending()
            .map(|age| age.as_millis() as u64),
    }))
}

/// Takes a payment and answers once the terminal reports back. Accepts the
/// amount in the query string or a form body, with either GET or POST.
pub async fn pay(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<CallbackResult>, ApiError> {
    let params = PayParams::from_request(query.as_deref(), &headers, &body)?;
    let amount = params
        .amount
        .ok_or_else(|| GatewayError::InvalidAmount("missing `amount`".to_string()))?;
    tracing::info!(%amount, origin = params.origin.as_deref().unwrap_or("-"), "payment requested");

    let result = state.gateway.pay(&amount).await?;
    Ok(Json(result))
}

/// Receives the terminal's result. Always 200 unless the body is unusable.
pub async fn callback(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>, ApiError> {
    let ack = state.gateway.callback(&body)?;
    Ok(Json(json!({
        "acknowledged": true,
        "matched": ack.matched(),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn form_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        headers
    }

    #[test]
    fn test_query_only() {
        let params =
            PayParams::from_request(Some("amount=5.00&origin=https%3A%2F%2Fshop"), &HeaderMap::new(), b"")
                .unwrap();
        assert_eq!(params.amount.as_deref(), Some("5.00"));
        assert_eq!(params.origin.as_deref(), Some("https://shop"));
    }

    #[test]
    fn test_form_body_overrides_query() {
        let params =
            PayParams::from_request(Some("amount=1&origin=q"), &form_headers(), b"amount=2").unwrap();
        assert_eq!(params.amount.as_deref(), Some("2"));
        assert_eq!(params.origin.as_deref(), Some("q"));
    }

    #[test]
    fn test_non_form_body_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let params =
            PayParams::from_request(Some("amount=3"), &headers, br#"{"amount":"9"}"#).unwrap();
        assert_eq!(params.amount.as_deref(), Some("3"));
    }

    #[test]
    fn test_undecodable_query_is_invalid_amount() {
        assert!(matches!(
            PayParams::from_request(Some("amount=1&amount=2"), &HeaderMap::new(), b""),
            Err(GatewayError::InvalidAmount(_))
        ));
    }
}
