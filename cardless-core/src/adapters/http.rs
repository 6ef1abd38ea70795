//! Blocking reqwest transport
//!
//! Implements the [`Transport`] port on top of `reqwest::blocking`.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::domain::result::{Error, Result};
use crate::ports::{HttpRequest, HttpResponse, Method, Transport};

/// Default transport timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// HTTP transport backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::transport_caused_by("Failed to create HTTP client", None, e))?;

        Ok(Self { client, timeout })
    }

    /// Map request errors to readable messages, keeping the cause
    fn map_request_error(&self, error: reqwest::Error) -> Error {
        let message = if error.is_timeout() {
            format!("Connection timed out after {} seconds", self.timeout.as_secs())
        } else if error.is_connect() {
            "Unable to connect to the bank account data API".to_string()
        } else {
            "HTTP request failed".to_string()
        };
        let status = error.status().map(|s| s.as_u16());
        Error::transport_caused_by(message, status, error)
    }
}

impl Transport for ReqwestTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = match request.method {
            Method::Get => self.client.get(request.url),
            Method::Post => self.client.post(request.url),
            Method::Delete => self.client.delete(request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().map_err(|e| self.map_request_error(e))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| Error::transport_caused_by("Failed to read response body", Some(status), e))?;

        Ok(HttpResponse { status, body })
    }
}
