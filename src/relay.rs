use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::errors::SetupError;
use crate::manifest::SessionPayload;
use crate::retry::RetryPolicy;

/// Correlation session issued by the relay when a manifest is registered.
/// Exactly one exists per run; the key is the handle for later polling and
/// the URL is handed to the operator to complete app creation in a browser.
#[derive(Debug, Clone)]
pub struct RelaySession {
    pub key: String,
    pub operator_url: String,
}

/// Single-use token returned by GitHub once the operator confirms the
/// manifest. Consumed by value when exchanged for credentials.
#[derive(Debug)]
pub struct ExchangeCode(String);

impl ExchangeCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Deserialize)]
struct StartResponse {
    key: String,
    url: String,
}

#[derive(Debug, Deserialize)]
struct CodeResponse {
    #[serde(default)]
    code: String,
}

/// Client for the manifest relay service.
pub struct RelayClient {
    http: reqwest::Client,
    base_url: String,
    policy: RetryPolicy,
}

impl RelayClient {
    pub fn new(base_url: impl Into<String>, policy: RetryPolicy) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            policy,
        }
    }

    /// Registers the manifest with the relay and opens a correlation session.
    /// Any failure here is terminal: without a session there is nothing to
    /// poll for.
    pub async fn open_session(&self, payload: &SessionPayload) -> Result<RelaySession, SetupError> {
        let url = format!("{}/start", self.base_url);

        let response = self
            .http
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| SetupError::RelayUnavailable(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SetupError::RelayUnavailable(format!(
                "{url} returned {status}"
            )));
        }

        let body: StartResponse = response.json().await.map_err(|e| {
            SetupError::MalformedResponse {
                service: "relay",
                detail: e.to_string(),
            }
        })?;
        if body.key.is_empty() || body.url.is_empty() {
            return Err(SetupError::MalformedResponse {
                service: "relay",
                detail: "start response is missing key or url".to_string(),
            });
        }

        info!("relay session opened");
        Ok(RelaySession {
            key: body.key,
            operator_url: body.url,
        })
    }

    /// Polls the relay for the one-time exchange code under the bounded retry
    /// policy. The human browser step has unbounded duration, so empty codes,
    /// non-2xx statuses, transport errors, and undecodable bodies are all
    /// treated as "not ready yet" until the attempt ceiling is reached.
    pub async fn poll_for_code(&self, session: &RelaySession) -> Result<ExchangeCode, SetupError> {
        let url = format!("{}/code/{}", self.base_url, session.key);

        for attempt in 0..self.policy.max_attempts {
            self.policy.sleep_before(attempt).await;

            match self.http.post(&url).send().await {
                Ok(response) if response.status().is_success() => {
                    match response.json::<CodeResponse>().await {
                        Ok(body) if !body.code.is_empty() => {
                            info!(attempt, "exchange code received");
                            return Ok(ExchangeCode(body.code));
                        }
                        Ok(_) => debug!(attempt, "exchange code not ready yet"),
                        Err(e) => debug!(attempt, error = %e, "poll body not decodable yet"),
                    }
                }
                Ok(response) => {
                    debug!(attempt, status = %response.status(), "relay poll returned non-success")
                }
                Err(e) => warn!(attempt, error = %e, "relay poll request failed"),
            }
        }

        Err(SetupError::ExchangeTimeout {
            attempts: self.policy.max_attempts,
        })
    }
}
