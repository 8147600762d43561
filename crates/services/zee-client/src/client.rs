use reqwest::Method;
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    config::{Config, ZeeConfig},
    error::ZeeError,
};

/// Zee backend client
///
/// The client is generic over a [`Config`] implementation that provides the
/// base URL, headers and timeouts. Cloning is cheap; clones share one
/// connection pool.
#[derive(Debug, Clone)]
pub struct Client<C: Config> {
    http: reqwest::Client,
    config: C,
}

impl Client<ZeeConfig> {
    /// Creates a new client with default configuration
    ///
    /// Reads environment variables:
    /// - `ZEE_API_URL` for the backend base URL
    /// - `ZEE_API_KEY` for the optional `X-API-Key` header
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ZeeConfig::new())
    }
}

impl<C: Config + Default> Default for Client<C> {
    fn default() -> Self {
        Self::with_config(C::default())
    }
}

impl<C: Config> Client<C> {
    /// Creates a new client with the given configuration.
    ///
    /// Only a connect timeout is set on the underlying HTTP client; chat
    /// streams run until the backend closes them or the caller cancels.
    #[must_use]
    pub fn with_config(config: C) -> Self {
        let http = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "falling back to default HTTP client");
                reqwest::Client::new()
            });
        Self { http, config }
    }

    /// Replaces the HTTP client with a custom one
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Returns a reference to the client's configuration
    #[must_use]
    pub const fn config(&self) -> &C {
        &self.config
    }

    /// Builds a request with the configured URL and headers, without a timeout.
    pub(crate) fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder, ZeeError> {
        self.config.validate()?;
        let url = self.config.url(path);
        tracing::debug!(%method, %url, "zee request");
        Ok(self
            .http
            .request(method, url)
            .headers(self.config.headers()?))
    }

    pub(crate) async fn get<O>(&self, path: &str, fallback: &str) -> Result<O, ZeeError>
    where
        O: DeserializeOwned,
    {
        let req = self.request(Method::GET, path)?;
        self.execute(req, fallback).await
    }

    pub(crate) async fn post<I, O>(&self, path: &str, body: &I, fallback: &str) -> Result<O, ZeeError>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        let req = self.request(Method::POST, path)?.json(body);
        self.execute(req, fallback).await
    }

    pub(crate) async fn patch_empty<I>(&self, path: &str, body: &I, fallback: &str) -> Result<(), ZeeError>
    where
        I: Serialize + ?Sized,
    {
        let req = self.request(Method::PATCH, path)?.json(body);
        self.execute_raw(req, fallback).await.map(drop)
    }

    pub(crate) async fn delete_empty(&self, path: &str, fallback: &str) -> Result<(), ZeeError> {
        let req = self.request(Method::DELETE, path)?;
        self.execute_raw(req, fallback).await.map(drop)
    }

    /// Sends a request and returns the response for streaming consumption.
    ///
    /// Non-success statuses are turned into [`ZeeError::Api`] before the body
    /// is handed back.
    pub(crate) async fn send_streaming(
        &self,
        req: reqwest::RequestBuilder,
        fallback: &str,
    ) -> Result<reqwest::Response, ZeeError> {
        let response = req.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let bytes = response.bytes().await?;
        Err(crate::error::deserialize_api_error(status, &bytes, fallback))
    }

    async fn execute<O>(&self, req: reqwest::RequestBuilder, fallback: &str) -> Result<O, ZeeError>
    where
        O: DeserializeOwned,
    {
        let bytes = self.execute_raw(req, fallback).await?;
        serde_json::from_slice(&bytes).map_err(|e| crate::error::map_deser(&e, &bytes))
    }

    async fn execute_raw(
        &self,
        req: reqwest::RequestBuilder,
        fallback: &str,
    ) -> Result<bytes::Bytes, ZeeError> {
        let response = req.timeout(self.config.request_timeout()).send().await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if status.is_success() {
            return Ok(bytes);
        }

        tracing::debug!(status = status.as_u16(), "zee request failed");
        Err(crate::error::deserialize_api_error(status, &bytes, fallback))
    }
}
