use std::collections::BTreeMap;

use serde::Serialize;

use crate::errors::OcsError;

/// Call parameters sent to the token-generation service.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    #[serde(rename = "use")]
    pub use_case: String,
    pub called_number: String,
    pub calling_number: String,
    pub display_name: String,
    pub expiration: String,
}

/// Successful token-service answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenResponse {
    /// Top-level JSON object, every value coerced to a string.
    Fields(BTreeMap<String, String>),
    /// Body that was not a JSON object, passed through verbatim.
    Raw(String),
}

impl TokenResponse {
    fn from_body(body: String) -> Self {
        match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(&body) {
            Ok(object) => Self::Fields(
                object
                    .into_iter()
                    .map(|(key, value)| {
                        let value = match value {
                            serde_json::Value::String(s) => s,
                            other => other.to_string(),
                        };
                        (key, value)
                    })
                    .collect(),
            ),
            Err(_) => Self::Raw(body),
        }
    }
}

/// Requests authorization tokens over HTTPS.
#[derive(Clone)]
pub struct TokenClient {
    http: reqwest::Client,
    endpoint: String,
}

impl TokenClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST the call parameters and read the full response body.
    ///
    /// Only HTTP 200 counts as success; any other status is a `Token` error
    /// carrying the code and body.
    pub async fn request_token(&self, request: &TokenRequest) -> Result<TokenResponse, OcsError> {
        tracing::info!("requesting token from {}", self.endpoint);
        tracing::debug!("token request body: {request:?}");

        let resp = self
            .http
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| OcsError::Token(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| OcsError::Token(format!("reading response body: {e}")))?;

        tracing::info!("token server responded with {}", status.as_u16());
        tracing::debug!("token server response body: {body}");

        if status != reqwest::StatusCode::OK {
            return Err(OcsError::Token(format!(
                "Token request failed. Code: {}, Body: {}",
                status.as_u16(),
                body
            )));
        }

        Ok(TokenResponse::from_body(body))
    }
}
