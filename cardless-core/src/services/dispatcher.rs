//! Authenticated request dispatcher
//!
//! Turns a logical API call (method, path, optional JSON body) into an HTTP
//! exchange and classifies the outcome:
//! - success status: the body is parsed as JSON (unparsable JSON is a transport error)
//! - any other status: the body must be an API error object, otherwise the
//!   failure is reported as a transport error carrying the status

use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::result::{ApiError, Error, Result};
use crate::domain::{AccessGrant, Credential};
use crate::ports::{HttpRequest, Method, Transport};
use crate::services::credentials::CredentialStore;
use crate::services::decoder;

const TOKEN_NEW_PATH: &str = "token/new/";
const TOKEN_REFRESH_PATH: &str = "token/refresh/";

/// How a request is authenticated
#[derive(Clone, Copy)]
pub enum Auth<'a> {
    /// Token endpoints: they produce the credential
    None,
    /// Bearer token from the store, refreshed first if it is about to expire
    Bearer(&'a CredentialStore),
}

/// Classified success response
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    /// Parsed body; `None` when the API sent no body
    pub body: Option<JsonValue>,
}

impl ApiResponse {
    /// The JSON body, which a data endpoint is required to send
    pub fn into_json(self) -> Result<JsonValue> {
        self.body.ok_or_else(|| Error::Transport {
            message: "Empty response body".to_string(),
            status: Some(self.status),
            source: None,
        })
    }
}

/// Sends requests against one API base URL
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    base_url: String,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>, base_url: &str) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path with URL-encoded query parameters
    pub fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url> {
        let raw = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let url = if query.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, query)
        };
        url.map_err(|e| Error::Config(format!("Invalid API URL '{}': {}", raw, e)))
    }

    /// URL of one path segment under `prefix`, e.g. `accounts/{id}/`
    pub fn resource_url(&self, prefix: &str, id: &str, suffix: &str) -> Result<Url> {
        if id.trim().is_empty() {
            return Err(Error::validation(format!("Empty id for {}", prefix)));
        }
        let mut url = self.url(prefix, &[])?;
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("API base URL cannot have a path: {}", self.base_url)))?
            .pop_if_empty()
            .push(id)
            .extend(suffix.split('/').filter(|s| !s.is_empty()))
            .push("");
        Ok(url)
    }

    /// Validate an opaque page token: it must be a URL on the API host
    pub fn page_url(&self, token: &str) -> Result<Url> {
        let url = Url::parse(token)
            .map_err(|e| Error::validation(format!("Invalid page token '{}': {}", token, e)))?;
        let base = self.url("", &[])?;
        if url.origin() != base.origin() {
            return Err(Error::validation(format!(
                "Page token points outside the API host: {}",
                url.origin().ascii_serialization()
            )));
        }
        Ok(url)
    }

    /// Send one request and classify the response
    pub fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&JsonValue>,
        auth: Auth<'_>,
    ) -> Result<ApiResponse> {
        let mut request = HttpRequest::new(method, url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json");

        if let Auth::Bearer(store) = auth {
            let credential = self.authorize(store)?;
            request = request.header(
                "Authorization",
                format!("Bearer {}", credential.access_token()),
            );
        }
        if let Some(body) = body {
            request = request.body(body.to_string());
        }

        debug!(method = %method, url = %request.url, "Sending request");
        let response = self.transport.execute(request)?;
        debug!(method = %method, status = response.status, "Received response");

        classify(method, response.status, &response.body)
    }

    /// GET and return the JSON body
    pub fn get_json(&self, url: Url, auth: Auth<'_>) -> Result<JsonValue> {
        self.send(Method::Get, url, None, auth)?.into_json()
    }

    /// POST a JSON body and return the JSON response body
    pub fn post_json(&self, url: Url, body: &JsonValue, auth: Auth<'_>) -> Result<JsonValue> {
        self.send(Method::Post, url, Some(body), auth)?.into_json()
    }

    /// Ensure the store holds a usable credential, refreshing it if needed
    pub fn authorize(&self, store: &CredentialStore) -> Result<Arc<Credential>> {
        store.refresh_if_needed(|refresh_token| self.refresh_access(refresh_token))
    }

    /// Exchange the secret pair for a new access/refresh credential
    pub fn exchange_secret(&self, secret_id: &str, secret_key: &str) -> Result<Credential> {
        let body = json!({
            "secret_id": secret_id,
            "secret_key": secret_key,
        });
        let issued_at = Utc::now();
        let response = self.post_json(self.url(TOKEN_NEW_PATH, &[])?, &body, Auth::None)?;
        let credential = decoder::credential(&response, issued_at)?;
        info!(
            access_expires_secs = credential.access_expires().num_seconds(),
            refresh_expires_secs = credential.refresh_expires().num_seconds(),
            "Obtained access token"
        );
        Ok(credential)
    }

    /// Mint a new access token from the refresh token
    pub fn refresh_access(&self, refresh_token: &str) -> Result<AccessGrant> {
        let body = json!({ "refresh": refresh_token });
        let response = self.post_json(self.url(TOKEN_REFRESH_PATH, &[])?, &body, Auth::None)?;
        let grant = decoder::access_grant(&response)?;
        info!(
            access_expires_secs = grant.access_expires.num_seconds(),
            "Refreshed access token"
        );
        Ok(grant)
    }
}

/// Success statuses: 200 for every method, additionally 201 for POST
fn is_success(method: Method, status: u16) -> bool {
    match method {
        Method::Post => status == 200 || status == 201,
        Method::Get | Method::Delete => status == 200,
    }
}

/// Classify a raw response into a parsed body or an error
pub fn classify(method: Method, status: u16, body: &str) -> Result<ApiResponse> {
    if !is_success(method, status) {
        return Err(error_from_body(status, body));
    }

    if body.trim().is_empty() {
        return Ok(ApiResponse { status, body: None });
    }

    let json = serde_json::from_str::<JsonValue>(body).map_err(|e| {
        warn!(status, "Success response is not valid JSON");
        Error::transport_caused_by("Error parsing JSON response", Some(status), e)
    })?;

    Ok(ApiResponse {
        status,
        body: Some(json),
    })
}

fn error_from_body(status: u16, body: &str) -> Error {
    match serde_json::from_str::<ApiError>(body) {
        Ok(api_error) => {
            debug!(status, summary = %api_error.summary, "API rejected request");
            Error::Api(api_error)
        }
        Err(e) => {
            warn!(status, "Error response has no parsable error body");
            Error::transport_caused_by(format!("Error in HTTP call (HTTP {})", status), Some(status), e)
        }
    }
}
