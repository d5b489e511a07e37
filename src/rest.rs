//! REST implementation of the codespaces API client.

use reqwest::header::ACCEPT;
use serde::Deserialize;
use thiserror::Error;

use crate::client::{ClientFuture, CodespaceClient, TransportHandle};
use crate::codespace::Codespace;
use crate::config::{ConfigError, ConnectConfig};

/// Errors raised by the REST client.
#[derive(Debug, Error)]
pub enum RestError {
    /// Raised when the high-level configuration is incomplete.
    #[error("configuration error: {0}")]
    Config(String),
    /// Raised when the HTTP transport fails before a response arrives.
    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Raised when the API answers with a non-success status.
    #[error("api returned status {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },
}

impl From<ConfigError> for RestError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value.to_string())
    }
}

/// Body shape of API error responses.
#[derive(Debug, Deserialize)]
struct ApiMessage {
    message: String,
}

/// Codespaces API client backed by `reqwest`.
#[derive(Clone, Debug)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl RestClient {
    /// Constructs a client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RestError::Config`] when validation fails and
    /// [`RestError::Transport`] when the HTTP client cannot be built.
    pub fn new(config: &ConnectConfig) -> Result<Self, RestError> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("gangway/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_owned(),
            token: config.token.clone(),
        })
    }

    async fn get_codespace(
        &self,
        name: &str,
        include_connection: bool,
    ) -> Result<Codespace, RestError> {
        let url = format!("{}/user/codespaces/{name}", self.base_url);
        let mut request = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/json");
        if include_connection {
            request = request.query(&[("include_connection", "true")]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(response.json().await?)
    }

    async fn post_start(&self, name: &str) -> Result<(), RestError> {
        let url = format!("{}/user/codespaces/{name}/start", self.base_url);
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/json")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }
        Ok(())
    }

    async fn api_error(response: reqwest::Response) -> RestError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiMessage>(&body)
            .map(|parsed| parsed.message)
            .unwrap_or(body);
        RestError::Api { status, message }
    }
}

impl CodespaceClient for RestClient {
    type Error = RestError;

    fn fetch_codespace<'a>(
        &'a self,
        name: &'a str,
        include_connection: bool,
    ) -> ClientFuture<'a, Codespace, RestError> {
        Box::pin(async move { self.get_codespace(name, include_connection).await })
    }

    fn start_codespace<'a>(&'a self, name: &'a str) -> ClientFuture<'a, (), RestError> {
        Box::pin(async move { self.post_start(name).await })
    }

    fn transport_handle(&self) -> Result<TransportHandle, RestError> {
        Ok(TransportHandle::new(self.http.clone()))
    }
}
