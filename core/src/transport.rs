//! Executes `HttpRequest`s against the network.
//!
//! A `Transport` turns a request into a response and nothing more: non-2xx
//! statuses come back as data and only failures before a response exists are
//! reported as `Err`. Status interpretation stays with `MicroUrlClient`.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Method};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request).await
    }
}

/// `reqwest`-backed transport. Keeps a cookie store so the session cookie
/// set at login is sent on later calls; pooling is reqwest's.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: Client,
}

impl ReqwestTransport {
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self, ApiError> {
        let inner = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| ApiError::transport(e.to_string()))?;
        Ok(Self { inner })
    }

    pub fn from_client(inner: Client) -> Self {
        Self { inner }
    }
}

fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut req = self.inner.request(method(request.method), &request.url);
        if !request.query.is_empty() {
            req = req.query(&request.query);
        }
        for (name, value) in &request.headers {
            req = req.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            req = req.body(body);
        }

        let resp = req.send().await.map_err(|e| ApiError::transport(e.to_string()))?;
        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = resp
            .bytes()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))?
            .to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
