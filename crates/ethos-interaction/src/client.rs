//! Shared JSON-over-HTTP transport.

use ethos_core::config::PracticeConfig;
use ethos_core::{EthosError, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Thin wrapper around `reqwest::Client` bound to one base URL.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpClient {
    /// Creates a client for `base_url` with the given request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| EthosError::config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token: None,
        })
    }

    /// Client for the scenario service described by `config`.
    pub fn for_service(config: &PracticeConfig) -> Result<Self> {
        Ok(Self::new(&config.service_base_url, config.request_timeout())?
            .with_auth_token(config.auth_token.clone()))
    }

    /// Client for the persistence endpoint described by `config`.
    pub fn for_persistence(config: &PracticeConfig) -> Result<Self> {
        Ok(Self::new(config.persistence_url(), config.request_timeout())?
            .with_auth_token(config.auth_token.clone()))
    }

    /// Adds a bearer token sent with every request.
    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// POSTs `body` as JSON and decodes a JSON response.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.authorize(self.client.post(self.url(path)).json(body));
        Self::send(request, path).await
    }

    /// POSTs `body` as JSON and ignores the response body.
    pub async fn post_json_ack<B>(&self, path: &str, body: &B) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let request = self.authorize(self.client.post(self.url(path)).json(body));
        let response = request.send().await.map_err(|err| map_transport_error(path, err))?;
        check_status(response, path).await.map(|_| ())
    }

    /// GETs `path` and decodes a JSON response.
    pub async fn get_json<T>(&self, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let request = self.authorize(self.client.get(self.url(path)));
        Self::send(request, path).await
    }

    async fn send<T>(request: RequestBuilder, path: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = request.send().await.map_err(|err| map_transport_error(path, err))?;
        let response = check_status(response, path).await?;

        response.json::<T>().await.map_err(|err| EthosError::Serialization {
            format: "JSON".to_string(),
            message: format!("Failed to parse response from {path}: {err}"),
        })
    }
}

async fn check_status(response: reqwest::Response, path: &str) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error body".to_string());
    tracing::warn!(target: "ethos::service", %status, path, "request failed");
    Err(map_http_error(status, body))
}

fn map_transport_error(path: &str, err: reqwest::Error) -> EthosError {
    EthosError::service(
        None,
        format!("Request to {path} failed: {err}"),
        err.is_connect() || err.is_timeout() || err.is_request(),
    )
}

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(alias = "error", alias = "detail")]
    message: String,
}

fn map_http_error(status: StatusCode, body: String) -> EthosError {
    let message = serde_json::from_str::<ErrorResponse>(&body)
        .map(|wrapper| wrapper.message)
        .unwrap_or(body);

    let retryable = matches!(
        status,
        StatusCode::REQUEST_TIMEOUT
            | StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    EthosError::service(Some(status.as_u16()), message, retryable)
}
