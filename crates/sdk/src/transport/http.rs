//! HTTP transport layer for the kintone SDK.
//!
//! Every request is a physical `POST` to `{base}/k/v1/{resource}.json`.
//! The logical method travels in `X-HTTP-Method-Override` and the
//! parameters always go in the JSON body, including for logical `GET`s.

use crate::config::ClientConfig;
use crate::error::{KintoneError, KintoneResult};
use reqwest::header::{self, HeaderValue};
use reqwest::{multipart, Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

pub const METHOD_OVERRIDE_HEADER: &str = "X-HTTP-Method-Override";

/// HTTP transport for making API requests.
///
/// Cloning is cheap and clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: Arc<ClientConfig>,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given configuration.
    pub fn new(config: Arc<ClientConfig>) -> KintoneResult<Self> {
        let headers = config.auth.headers()?;

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build the URL for a resource such as `records` or `record/comments`.
    fn build_url(&self, resource: &str) -> KintoneResult<url::Url> {
        let path = format!("k/v1/{}.json", resource.trim_matches('/'));
        self.config
            .base_url
            .join(&path)
            .map_err(|e| KintoneError::Config(format!("Invalid URL for {}: {}", resource, e)))
    }

    /// Physical POST carrying `method` as the logical method.
    fn request(&self, method: &Method, resource: &str) -> KintoneResult<RequestBuilder> {
        let url = self.build_url(resource)?;
        debug!(url = %url, method = %method, "kintone request");

        let mut builder = self.client.post(url);
        if *method != Method::POST {
            builder = builder.header(
                METHOD_OVERRIDE_HEADER,
                HeaderValue::from_str(method.as_str())
                    .map_err(|_| KintoneError::Config(format!("Invalid method: {}", method)))?,
            );
        }
        Ok(builder)
    }

    /// Send and normalize the outcome. Never retries.
    async fn execute(
        &self,
        method: &Method,
        resource: &str,
        request: RequestBuilder,
    ) -> KintoneResult<Response> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    resource = resource,
                    method = %method,
                    timeout = e.is_timeout(),
                    error = %e,
                    "kintone request failed before a response arrived"
                );
                return Err(KintoneError::Network(e));
            }
        };

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after_secs = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let body = response.text().await.unwrap_or_default();
        let error = KintoneError::from_response(status.as_u16(), &body, retry_after_secs);

        warn!(
            resource = resource,
            method = %method,
            status = status.as_u16(),
            code = error.code().unwrap_or("-"),
            "kintone API returned an error"
        );
        Err(error)
    }

    /// Send `body` as JSON and decode the JSON response.
    pub async fn send<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        resource: &str,
        body: &B,
    ) -> KintoneResult<T> {
        let request = self.request(&method, resource)?.json(body);
        let response = self.execute(&method, resource, request).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Send `body` as JSON and return the raw response bytes.
    pub async fn send_raw<B: Serialize + ?Sized>(
        &self,
        method: Method,
        resource: &str,
        body: &B,
    ) -> KintoneResult<Vec<u8>> {
        let request = self.request(&method, resource)?.json(body);
        let response = self.execute(&method, resource, request).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Upload multipart form data. Always a plain POST with no override.
    pub async fn send_multipart<T: DeserializeOwned>(
        &self,
        resource: &str,
        form: multipart::Form,
    ) -> KintoneResult<T> {
        let method = Method::POST;
        let request = self.request(&method, resource)?.multipart(form);
        let response = self.execute(&method, resource, request).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
