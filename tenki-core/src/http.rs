//! The "fetch JSON over HTTP" capability the adapters depend on.
//!
//! Adapters only see [`HttpFetch`]; the bundled [`ReqwestFetcher`] is the
//! production transport. Dropping the future returned by [`HttpFetch::get`]
//! abandons the in-flight request.

use std::{fmt::Debug, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Url};
use thiserror::Error;

/// Raw upstream answer: status code and body bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Body as text, cut down for error messages.
    pub fn body_snippet(&self) -> String {
        const MAX: usize = 200;
        let text = String::from_utf8_lossy(&self.body);
        if text.chars().count() > MAX {
            format!("{}...", text.chars().take(MAX).collect::<String>())
        } else {
            text.into_owned()
        }
    }
}

/// Transport-level failure: connection refused, timeout, unreadable body.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct HttpError {
    message: String,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
pub trait HttpFetch: Send + Sync + Debug {
    async fn get(&self, url: &Url) -> Result<HttpResponse, HttpError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    http: Client,
}

impl ReqwestFetcher {
    pub fn new(timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tenki/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { http }
    }
}

impl Default for ReqwestFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetcher {
    async fn get(&self, url: &Url) -> Result<HttpResponse, HttpError> {
        let res = self.http.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::new(format!("request timed out: {e}"))
            } else if e.is_connect() {
                HttpError::new(format!("connection failed: {e}"))
            } else {
                HttpError::new(format!("request failed: {e}"))
            }
        })?;

        let status = res.status().as_u16();
        let body = res
            .bytes()
            .await
            .map_err(|e| HttpError::new(format!("failed to read response body: {e}")))?;

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}
